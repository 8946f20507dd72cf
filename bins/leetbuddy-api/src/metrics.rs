// Prometheus metrics for the judging endpoints

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram,
    IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    /// Submissions received, by mode (`free_run` or `tests`)
    pub static ref SUBMISSIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "leetbuddy_submissions_total",
        "Submissions received by mode",
        &["mode"]
    )
    .expect("metric names are static");

    /// Verdicts produced, by overall status
    pub static ref VERDICTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "leetbuddy_verdicts_total",
        "Verdicts produced by status",
        &["status"]
    )
    .expect("metric names are static");

    pub static ref EXECUTOR_FAILURES_TOTAL: IntCounter = register_int_counter!(
        "leetbuddy_executor_failures_total",
        "Runs aborted by a dispatch, poll or timeout failure"
    )
    .expect("metric names are static");

    pub static ref VERDICT_DURATION_SECONDS: Histogram = register_histogram!(
        "leetbuddy_verdict_duration_seconds",
        "Wall time to judge one submission against all its test cases",
        vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 40.0, 80.0]
    )
    .expect("metric names are static");
}

/// Register every collector so that `/metrics` lists them before first use
pub fn init() {
    lazy_static::initialize(&SUBMISSIONS_TOTAL);
    lazy_static::initialize(&VERDICTS_TOTAL);
    lazy_static::initialize(&EXECUTOR_FAILURES_TOTAL);
    lazy_static::initialize(&VERDICT_DURATION_SECONDS);
}

/// Prometheus text exposition of the default registry
pub fn render() -> anyhow::Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_counters() {
        init();
        SUBMISSIONS_TOTAL.with_label_values(&["tests"]).inc();

        let text = render().unwrap();
        assert!(text.contains("leetbuddy_submissions_total{mode=\"tests\"}"));
        assert!(text.contains("leetbuddy_verdict_duration_seconds_bucket"));
    }
}
