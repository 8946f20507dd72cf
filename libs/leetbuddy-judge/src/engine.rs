/// Execution Engine - Remote Executor Client
///
/// **Core Responsibility:**
/// Submit one generated program to the Judge0 service and poll until it has
/// finished, returning the raw outcome.
///
/// **Critical Architectural Boundary:**
/// - Engine knows HOW to execute (Judge0 over HTTP)
/// - Engine does NOT know scoring rules
/// - Engine does NOT evaluate correctness
/// - Engine returns raw outcomes for the Evaluator to judge
///
/// **Polling Contract:**
/// Fixed interval, fixed attempt budget, no retries. A single failed status
/// query aborts the poll.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use leetbuddy_common::config::Settings;
use leetbuddy_common::types::{ExecutionOutcome, ExecutionStatus};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

const STATUS_FIELDS: &str = "status,stdout,stderr,compile_output,time,memory,message";

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("failed to dispatch submission: {0}")]
    Dispatch(String),
    #[error("failed to poll submission {token}: {reason}")]
    PollTransport { token: String, reason: String },
    #[error("polling timed out for submission {token} after {attempts} attempts")]
    PollTimeout { token: String, attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1500),
            max_attempts: 15,
        }
    }
}

/// A service that runs one program and reports how it went
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Queue a program for execution and return its token
    async fn submit(
        &self,
        language_id: u32,
        source: &str,
        stdin: Option<&str>,
    ) -> Result<String, ExecutorError>;

    /// Query the current state of a submission once
    async fn query_status(&self, token: &str) -> Result<ExecutionOutcome, ExecutorError>;

    fn poll_policy(&self) -> PollPolicy;

    /// Query until the submission has finished or the attempt budget is spent
    async fn poll(&self, token: &str) -> Result<ExecutionOutcome, ExecutorError> {
        let policy = self.poll_policy();

        for attempt in 1..=policy.max_attempts {
            let outcome = self.query_status(token).await?;

            if outcome.status.is_finished() {
                info!(
                    token = %token,
                    status = %outcome.status.description,
                    attempt,
                    "Submission finished"
                );
                return Ok(outcome);
            }

            debug!(
                token = %token,
                status = %outcome.status.description,
                attempt,
                "Submission pending"
            );

            if attempt < policy.max_attempts {
                tokio::time::sleep(policy.interval).await;
            }
        }

        warn!(token = %token, attempts = policy.max_attempts, "Polling timed out");
        Err(ExecutorError::PollTimeout {
            token: token.to_string(),
            attempts: policy.max_attempts,
        })
    }

    /// Submit then poll
    async fn execute(
        &self,
        language_id: u32,
        source: &str,
        stdin: Option<&str>,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        let token = self.submit(language_id, source, stdin).await?;
        self.poll(&token).await
    }
}

#[derive(Debug, Clone)]
pub struct Judge0Config {
    pub base_url: String,
    pub api_key: Option<String>,
    pub api_host: Option<String>,
    pub base64: bool,
    pub poll: PollPolicy,
    pub request_timeout: Duration,
}

impl Judge0Config {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            api_host: None,
            base64: false,
            poll: PollPolicy::default(),
            request_timeout: Duration::from_secs(10),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            base_url: settings.judge0_base_url(),
            api_key: settings.rapidapi_judge0_key.clone(),
            api_host: settings.rapidapi_judge0_host.clone(),
            base64: settings.judge0_base64,
            poll: PollPolicy {
                interval: settings.poll_interval(),
                max_attempts: settings.poll_max_attempts,
            },
            request_timeout: settings.request_timeout(),
        }
    }
}

#[derive(Serialize)]
struct SubmissionRequest {
    source_code: String,
    language_id: u32,
    stdin: Option<String>,
}

#[derive(Deserialize)]
struct SubmissionCreated {
    token: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Seconds {
    Number(f64),
    Text(String),
}

impl Seconds {
    fn as_secs(&self) -> Option<f64> {
        match self {
            Seconds::Number(n) => Some(*n),
            Seconds::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Deserialize)]
struct SubmissionState {
    status: Option<ExecutionStatus>,
    stdout: Option<String>,
    stderr: Option<String>,
    compile_output: Option<String>,
    message: Option<String>,
    time: Option<Seconds>,
    memory: Option<u64>,
}

/// Judge0 REST client, optionally behind RapidAPI
pub struct Judge0Client {
    http: reqwest::Client,
    config: Judge0Config,
}

impl Judge0Client {
    pub fn new(config: Judge0Config) -> Result<Self, ExecutorError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ExecutorError::Dispatch(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &Judge0Config {
        &self.config
    }

    fn with_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = match &self.config.api_key {
            Some(key) => request.header("X-RapidAPI-Key", key),
            None => request,
        };
        match &self.config.api_host {
            Some(host) => request.header("X-RapidAPI-Host", host),
            None => request,
        }
    }

    fn encode(&self, text: &str) -> String {
        if self.config.base64 {
            general_purpose::STANDARD.encode(text)
        } else {
            text.to_string()
        }
    }

    fn decode(&self, text: Option<String>) -> Option<String> {
        let text = text?;
        if !self.config.base64 {
            return Some(text);
        }

        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        match general_purpose::STANDARD.decode(compact) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                warn!(error = %e, "Judge0 returned invalid base64, keeping raw text");
                Some(text)
            }
        }
    }
}

#[async_trait]
impl RemoteExecutor for Judge0Client {
    async fn submit(
        &self,
        language_id: u32,
        source: &str,
        stdin: Option<&str>,
    ) -> Result<String, ExecutorError> {
        let url = format!(
            "{}/submissions?base64_encoded={}&wait=false",
            self.config.base_url, self.config.base64
        );
        let body = SubmissionRequest {
            source_code: self.encode(source),
            language_id,
            stdin: stdin.map(|s| self.encode(s)),
        };

        let response = self
            .with_headers(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ExecutorError::Dispatch(e.to_string()))?;

        let created: SubmissionCreated = response
            .json()
            .await
            .map_err(|e| ExecutorError::Dispatch(format!("invalid submission response: {}", e)))?;

        match created.token {
            Some(token) if !token.is_empty() => {
                info!(token = %token, language_id, "Judge0 submission created");
                Ok(token)
            }
            _ => Err(ExecutorError::Dispatch(
                "Judge0 did not return a submission token".to_string(),
            )),
        }
    }

    async fn query_status(&self, token: &str) -> Result<ExecutionOutcome, ExecutorError> {
        let url = format!(
            "{}/submissions/{}?base64_encoded={}&fields={}",
            self.config.base_url, token, self.config.base64, STATUS_FIELDS
        );
        let transport = |reason: String| ExecutorError::PollTransport {
            token: token.to_string(),
            reason,
        };

        let state: SubmissionState = self
            .with_headers(self.http.get(&url))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| transport(format!("invalid status response: {}", e)))?;

        // A response without status is treated as still queued
        let status = state.status.unwrap_or(ExecutionStatus {
            id: leetbuddy_common::types::status::IN_QUEUE,
            description: "Polling...".to_string(),
        });

        Ok(ExecutionOutcome {
            token: Some(token.to_string()),
            status,
            stdout: self.decode(state.stdout),
            stderr: self.decode(state.stderr),
            compile_output: self.decode(state.compile_output),
            message: self.decode(state.message),
            time: state.time.as_ref().and_then(Seconds::as_secs),
            memory: state.memory,
        })
    }

    fn poll_policy(&self) -> PollPolicy {
        self.config.poll
    }
}
