use crate::engine::ExecutorError;
use crate::harness::HarnessError;
use leetbuddy_common::catalog::CatalogError;
use thiserror::Error;

/// Everything that prevents a verdict from being produced.
///
/// Failed executions are not errors; they are reported inside the verdict.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("{0}")]
    Validation(String),
    #[error("unsupported language id {0}")]
    UnsupportedLanguage(u32),
    #[error("problem '{0}' not found")]
    NotFound(String),
    #[error("no test cases found for problem '{0}'")]
    NoTestCases(String),
    #[error(transparent)]
    Harness(#[from] HarnessError),
    #[error(transparent)]
    Executor(#[from] ExecutorError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
