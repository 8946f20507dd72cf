// HTTP route handlers for the LeetBuddy API

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use leetbuddy_common::types::{ExecutionOutcome, Problem, ProblemSummary, Submission, Verdict};
use leetbuddy_judge::JudgeError;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::error::ApiError;
use crate::metrics;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RunTestsRequest {
    pub problem_slug: String,
    pub language_id: u32,
    pub user_code: String,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))
}

/// POST /api/submit - Run code once against raw stdin
pub async fn submit(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Submission>, JsonRejection>,
) -> Result<Json<ExecutionOutcome>, ApiError> {
    let submission = body(payload)?;
    metrics::SUBMISSIONS_TOTAL.with_label_values(&["free_run"]).inc();

    let outcome = state.judge.run_free(&submission).await?;

    info!(
        language_id = submission.language_id,
        status = %outcome.status.description,
        "Free run completed"
    );
    Ok(Json(outcome))
}

/// POST /api/run-tests - Judge code against every test case of a problem
pub async fn run_tests(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RunTestsRequest>, JsonRejection>,
) -> Result<Json<Verdict>, ApiError> {
    let request = body(payload)?;
    metrics::SUBMISSIONS_TOTAL.with_label_values(&["tests"]).inc();

    let started = Instant::now();
    let verdict = state
        .judge
        .run_tests(&request.problem_slug, request.language_id, &request.user_code)
        .await?;
    metrics::VERDICT_DURATION_SECONDS.observe(started.elapsed().as_secs_f64());
    let status = verdict.status.to_string();
    metrics::VERDICTS_TOTAL.with_label_values(&[status.as_str()]).inc();

    info!(
        problem = %request.problem_slug,
        status = %status,
        passed = verdict.passed_tests,
        total = verdict.total_tests,
        "Verdict produced"
    );
    Ok(Json(verdict))
}

/// GET /api/problems - List problem summaries
pub async fn list_problems(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProblemSummary>>, ApiError> {
    let problems = state
        .judge
        .catalog()
        .list_problems()
        .await
        .map_err(JudgeError::from)?;
    Ok(Json(problems))
}

/// GET /api/problems/{slug} - Problem details, without test cases
pub async fn problem_details(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Problem>, ApiError> {
    let problem = state
        .judge
        .catalog()
        .problem(&slug)
        .await
        .map_err(JudgeError::from)?
        .ok_or(JudgeError::NotFound(slug))?;
    Ok(Json(problem))
}

/// GET /status - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /metrics - Prometheus exposition
pub async fn metrics_endpoint() -> Response {
    match metrics::render() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{routes, AppState};
    use async_trait::async_trait;
    use leetbuddy_common::catalog::InMemoryCatalog;
    use leetbuddy_common::language_config::LanguageRegistry;
    use leetbuddy_common::types::{status, ExecutionOutcome, ExecutionStatus};
    use leetbuddy_judge::{ExecutorError, Judge, PollPolicy, RemoteExecutor};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpListener;

    /// Executor that answers every submission with the same stdout, or fails
    struct FixedExecutor {
        stdout: Option<String>,
    }

    #[async_trait]
    impl RemoteExecutor for FixedExecutor {
        async fn submit(
            &self,
            _language_id: u32,
            _source: &str,
            _stdin: Option<&str>,
        ) -> Result<String, ExecutorError> {
            match self.stdout {
                Some(_) => Ok("tok".to_string()),
                None => Err(ExecutorError::Dispatch("connection refused".to_string())),
            }
        }

        async fn query_status(&self, token: &str) -> Result<ExecutionOutcome, ExecutorError> {
            Ok(ExecutionOutcome {
                token: Some(token.to_string()),
                status: ExecutionStatus {
                    id: status::ACCEPTED,
                    description: "Accepted".to_string(),
                },
                stdout: self.stdout.clone(),
                stderr: None,
                compile_output: None,
                message: None,
                time: Some(0.01),
                memory: Some(2048),
            })
        }

        fn poll_policy(&self) -> PollPolicy {
            PollPolicy {
                interval: Duration::from_millis(1),
                max_attempts: 3,
            }
        }
    }

    async fn spawn_app(stdout: Option<&str>) -> String {
        let catalog = InMemoryCatalog::load(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../config/problems.json"
        ))
        .unwrap();
        let executor = FixedExecutor {
            stdout: stdout.map(String::from),
        };
        let judge = Judge::new(Arc::new(executor), Arc::new(catalog), LanguageRegistry::all())
            .unwrap()
            .with_inter_test_delay(Duration::ZERO);

        let app = routes::routes().with_state(Arc::new(AppState { judge }));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_health_check() {
        let base = spawn_app(Some("[0, 1]")).await;
        let text = reqwest::get(format!("{}/status", base))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(text, "OK");
    }

    #[tokio::test]
    async fn test_problem_endpoints() {
        let base = spawn_app(Some("[0, 1]")).await;

        let list: Value = reqwest::get(format!("{}/api/problems", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(list[0]["slug"], "two-sum");
        assert!(list[0].get("description").is_none());

        let details = reqwest::get(format!("{}/api/problems/two-sum", base))
            .await
            .unwrap();
        assert_eq!(details.status(), 200);
        let details: Value = details.json().await.unwrap();
        assert_eq!(details["title"], "Two Sum");
        assert!(details.get("test_cases").is_none());

        let missing = reqwest::get(format!("{}/api/problems/nope", base))
            .await
            .unwrap();
        assert_eq!(missing.status(), 404);
    }

    #[tokio::test]
    async fn test_run_tests_wrong_answer_is_ok_response() {
        let base = spawn_app(Some("[0, 1]")).await;
        let response = reqwest::Client::new()
            .post(format!("{}/api/run-tests", base))
            .json(&json!({
                "problem_slug": "two-sum",
                "language_id": 71,
                "user_code": "def two_sum(nums, target):\n    return [0, 1]\n"
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let verdict: Value = response.json().await.unwrap();
        assert_eq!(verdict["status"], "Wrong Answer");
        assert_eq!(verdict["passedTests"], 1);
        assert_eq!(verdict["totalTests"], 5);
        assert_eq!(verdict["details"]["testCase"], 2);
        assert_eq!(verdict["error"], "Failed on Test Case 2: Wrong Answer");
    }

    #[tokio::test]
    async fn test_run_tests_validation_errors() {
        let base = spawn_app(Some("[0, 1]")).await;
        let client = reqwest::Client::new();

        let missing_field = client
            .post(format!("{}/api/run-tests", base))
            .json(&json!({ "problem_slug": "two-sum", "language_id": 71 }))
            .send()
            .await
            .unwrap();
        assert_eq!(missing_field.status(), 400);

        let bad_language = client
            .post(format!("{}/api/run-tests", base))
            .json(&json!({ "problem_slug": "two-sum", "language_id": 54, "user_code": "x" }))
            .send()
            .await
            .unwrap();
        assert_eq!(bad_language.status(), 400);

        let unknown_problem = client
            .post(format!("{}/api/run-tests", base))
            .json(&json!({ "problem_slug": "nope", "language_id": 71, "user_code": "x" }))
            .send()
            .await
            .unwrap();
        assert_eq!(unknown_problem.status(), 404);
    }

    #[tokio::test]
    async fn test_executor_failure_is_system_error() {
        let base = spawn_app(None).await;
        let response = reqwest::Client::new()
            .post(format!("{}/api/run-tests", base))
            .json(&json!({
                "problem_slug": "two-sum",
                "language_id": 71,
                "user_code": "def two_sum(nums, target): pass"
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 500);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["status"], "System Error");
        assert!(body["details"].as_str().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_submit_returns_outcome() {
        let base = spawn_app(Some("[0, 1]")).await;
        let response = reqwest::Client::new()
            .post(format!("{}/api/submit", base))
            .json(&json!({
                "source_code": "def two_sum(nums, target):\n    return [0, 1]\n",
                "language_id": 71,
                "stdin": "[2, 7, 11, 15]\n9"
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let outcome: Value = response.json().await.unwrap();
        assert_eq!(outcome["status"]["id"], 3);
        assert_eq!(outcome["stdout"], "[0, 1]");
        assert_eq!(outcome["token"], "tok");
    }
}
