use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Languages the judge knows how to wrap in a harness.
///
/// The discriminant is the Judge0 CE language id the submission is sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
}

impl Language {
    /// Judge0 CE language id (Python 3.8.1 and Node.js 12.14.0)
    pub fn judge0_id(&self) -> u32 {
        match self {
            Language::Python => 71,
            Language::JavaScript => 63,
        }
    }

    pub fn from_judge0_id(id: u32) -> Option<Self> {
        match id {
            71 => Some(Language::Python),
            63 => Some(Language::JavaScript),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "python" => Some(Language::Python),
            "javascript" => Some(Language::JavaScript),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Python => write!(f, "python"),
            Language::JavaScript => write!(f, "javascript"),
        }
    }
}

/// The function a harness locates and calls in user code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub name: String,
    /// Payload fields passed positionally, in this order
    pub params: Vec<String>,
}

impl Default for EntryPoint {
    fn default() -> Self {
        Self {
            name: "two_sum".to_string(),
            params: vec!["nums".to_string(), "target".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemSummary {
    pub id: u32,
    pub slug: String,
    pub title: String,
    pub difficulty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub input: String,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Problem metadata as served to clients. Test cases are stored separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub id: u32,
    pub slug: String,
    pub title: String,
    pub difficulty: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub function_signature: String,
    #[serde(default)]
    pub examples: Vec<Example>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub entry_point: EntryPoint,
}

impl Problem {
    pub fn summary(&self) -> ProblemSummary {
        ProblemSummary {
            id: self.id,
            slug: self.slug.clone(),
            title: self.title.clone(),
            difficulty: self.difficulty.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// 1-based position within the problem
    pub position: u32,
    pub input: Map<String, Value>,
    pub expected_output: Value,
    #[serde(default)]
    pub hidden: bool,
}

/// One free-run request; lives only for the duration of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub language_id: u32,
    pub source_code: String,
    #[serde(default)]
    pub stdin: Option<String>,
}

/// Judge0 status ids
pub mod status {
    pub const IN_QUEUE: u32 = 1;
    pub const PROCESSING: u32 = 2;
    pub const ACCEPTED: u32 = 3;
    pub const WRONG_ANSWER: u32 = 4;
    pub const TIME_LIMIT_EXCEEDED: u32 = 5;
    pub const COMPILATION_ERROR: u32 = 6;
    pub const RUNTIME_ERROR_NZEC: u32 = 11;
    pub const INTERNAL_ERROR: u32 = 13;

    /// First id at which an execution is considered finished
    pub const FINISHED_THRESHOLD: u32 = ACCEPTED;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStatus {
    pub id: u32,
    pub description: String,
}

impl ExecutionStatus {
    pub fn is_finished(&self) -> bool {
        self.id >= status::FINISHED_THRESHOLD
    }

    pub fn is_accepted(&self) -> bool {
        self.id == status::ACCEPTED
    }
}

/// Result of one remote execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub status: ExecutionStatus,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    pub message: Option<String>,
    /// Wall time in seconds
    pub time: Option<f64>,
    /// Peak memory in KB
    pub memory: Option<u64>,
}

impl ExecutionOutcome {
    /// First non-empty of stderr, compile output and message, or a label built
    /// from the status.
    pub fn diagnostic(&self) -> String {
        [&self.stderr, &self.compile_output, &self.message]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!(
                    "Execution failed with status: {} ({})",
                    self.status.description, self.status.id
                )
            })
    }
}

/// Overall verdict status. Serialized as its display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum VerdictStatus {
    Accepted,
    WrongAnswer,
    /// Any other finished status, carrying the executor's description
    Rejected(String),
}

impl VerdictStatus {
    pub fn is_accepted(&self) -> bool {
        matches!(self, VerdictStatus::Accepted)
    }
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerdictStatus::Accepted => write!(f, "Accepted"),
            VerdictStatus::WrongAnswer => write!(f, "Wrong Answer"),
            VerdictStatus::Rejected(description) => write!(f, "{}", description),
        }
    }
}

impl From<VerdictStatus> for String {
    fn from(status: VerdictStatus) -> Self {
        status.to_string()
    }
}

impl From<String> for VerdictStatus {
    fn from(text: String) -> Self {
        match text.as_str() {
            "Accepted" => VerdictStatus::Accepted,
            "Wrong Answer" => VerdictStatus::WrongAnswer,
            _ => VerdictStatus::Rejected(text),
        }
    }
}

/// Diagnostics for the first failing test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureDetail {
    pub test_case: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub got: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub got_raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub status: VerdictStatus,
    pub time: Option<f64>,
    pub memory: Option<u64>,
    pub passed_tests: u32,
    pub total_tests: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<FailureDetail>,
}
