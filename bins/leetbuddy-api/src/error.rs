// Maps judge failures to HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use leetbuddy_judge::JudgeError;
use serde_json::json;
use tracing::error;

use crate::metrics;

#[derive(Debug)]
pub enum ApiError {
    /// Request body missing or malformed
    InvalidBody(String),
    Judge(JudgeError),
}

impl From<JudgeError> for ApiError {
    fn from(err: JudgeError) -> Self {
        ApiError::Judge(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            ApiError::InvalidBody(message) => {
                return (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response();
            }
            ApiError::Judge(err) => err,
        };

        let status = match &err {
            JudgeError::Validation(_) | JudgeError::UnsupportedLanguage(_) => StatusCode::BAD_REQUEST,
            JudgeError::NotFound(_) => StatusCode::NOT_FOUND,
            JudgeError::NoTestCases(_) => StatusCode::UNPROCESSABLE_ENTITY,
            JudgeError::Executor(_) | JudgeError::Harness(_) | JudgeError::Catalog(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status != StatusCode::INTERNAL_SERVER_ERROR {
            return (status, Json(json!({ "error": err.to_string() }))).into_response();
        }

        if matches!(err, JudgeError::Executor(_)) {
            metrics::EXECUTOR_FAILURES_TOTAL.inc();
        }
        error!(error = %err, "Run aborted");

        (
            status,
            Json(json!({
                "status": "System Error",
                "error": "An unexpected error occurred",
                "details": err.to_string()
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leetbuddy_judge::ExecutorError;

    #[test]
    fn test_status_codes() {
        let cases = [
            (JudgeError::UnsupportedLanguage(54), StatusCode::BAD_REQUEST),
            (JudgeError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (JudgeError::NoTestCases("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (
                JudgeError::Executor(ExecutorError::PollTimeout {
                    token: "t".into(),
                    attempts: 15,
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), expected);
        }
        assert_eq!(
            ApiError::InvalidBody("missing field".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
