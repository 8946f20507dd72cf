pub mod engine;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod harness;

pub use engine::{ExecutorError, Judge0Client, Judge0Config, PollPolicy, RemoteExecutor};
pub use error::JudgeError;
pub use executor::Judge;
pub use harness::{HarnessError, HarnessGenerator};
