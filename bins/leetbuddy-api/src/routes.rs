use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/submit", post(handlers::submit))
        .route("/api/run-tests", post(handlers::run_tests))
        .route("/api/problems", get(handlers::list_problems))
        .route("/api/problems/:slug", get(handlers::problem_details))
        .route("/status", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
}
