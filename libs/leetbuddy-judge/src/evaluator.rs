/// Test Evaluator - Language-Agnostic Verdict Logic
///
/// **Core Responsibility:**
/// Judge one raw execution outcome against one test case, and fold the
/// per-test results into a single verdict.
///
/// **Critical Properties:**
/// - Knows nothing about Judge0 or HTTP
/// - Knows nothing about language runtimes
/// - Knows nothing about the catalog backend
/// - Pure functions: (outcome, test case) → case verdict
///
/// **Judging Order (per test case):**
/// 1. Any finished status other than Accepted is the verdict status
/// 2. stdout that is not JSON is a Wrong Answer with the raw text
/// 3. Normalized values that differ are a Wrong Answer
///
/// **Normalization Rules:**
/// - Surrounding whitespace of stdout is ignored
/// - Integral floats compare equal to integers (`1.0 == 1`)
/// - Top-level arrays are sorted before comparison
/// - Nested arrays keep their order
///
/// **Aggregation:**
/// Time and memory are the maximum over the test cases that reported them.

use leetbuddy_common::types::{
    ExecutionOutcome, FailureDetail, TestCase, Verdict, VerdictStatus,
};
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// 2^63, the first magnitude an `i64` cannot hold
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Result of judging a single test case
#[derive(Debug, Clone, PartialEq)]
pub enum CaseVerdict {
    Passed,
    Failed {
        status: VerdictStatus,
        detail: FailureDetail,
    },
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Integers compare exactly; floats only when either side is one
fn compare_numbers(x: &Number, y: &Number) -> Ordering {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a.cmp(&b);
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a.cmp(&b);
    }
    let a = x.as_f64().unwrap_or(0.0);
    let b = y.as_f64().unwrap_or(0.0);
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Total order over JSON values, used only to sort sequences
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (left, right) in x.iter().zip(y.iter()) {
                let ord = compare_values(left, right);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(_), Value::Object(_)) => a.to_string().cmp(&b.to_string()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Rewrite integral floats as integers, at any depth
fn canonical_numbers(value: &Value) -> Value {
    match value {
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < I64_BOUND => Value::from(f as i64),
            _ => value.clone(),
        },
        Value::Array(items) => Value::Array(items.iter().map(canonical_numbers).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), canonical_numbers(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Canonicalize numbers, then sort a top-level array
pub fn normalize(value: &Value) -> Value {
    match canonical_numbers(value) {
        Value::Array(mut items) => {
            items.sort_by(compare_values);
            Value::Array(items)
        }
        other => other,
    }
}

pub fn outputs_match(actual: &Value, expected: &Value) -> bool {
    normalize(actual) == normalize(expected)
}

fn base_detail(position: u32, case: &TestCase) -> FailureDetail {
    FailureDetail {
        test_case: position,
        input: (!case.hidden).then(|| Value::Object(case.input.clone())),
        expected: None,
        got: None,
        got_raw: None,
        error: None,
    }
}

/// Judge one finished outcome. `position` is the 1-based index of the case
/// in the order it was executed.
pub fn evaluate_case(position: u32, case: &TestCase, outcome: &ExecutionOutcome) -> CaseVerdict {
    if !outcome.status.is_accepted() {
        let mut detail = base_detail(position, case);
        detail.error = Some(outcome.diagnostic());
        return CaseVerdict::Failed {
            status: VerdictStatus::from(outcome.status.description.clone()),
            detail,
        };
    }

    let raw = outcome.stdout.as_deref().unwrap_or("").trim();
    let actual: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            let mut detail = base_detail(position, case);
            if !case.hidden {
                detail.expected = Some(case.expected_output.clone());
                detail.got_raw = Some(raw.to_string());
            }
            detail.error = Some(format!("Output is not valid JSON: {}", e));
            return CaseVerdict::Failed {
                status: VerdictStatus::WrongAnswer,
                detail,
            };
        }
    };

    if outputs_match(&actual, &case.expected_output) {
        return CaseVerdict::Passed;
    }

    let mut detail = base_detail(position, case);
    if !case.hidden {
        detail.expected = Some(case.expected_output.clone());
        detail.got = Some(actual);
    }
    CaseVerdict::Failed {
        status: VerdictStatus::WrongAnswer,
        detail,
    }
}

/// Accumulator owned by one verdict computation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tally {
    pub passed: u32,
    pub time: Option<f64>,
    pub memory: Option<u64>,
}

impl Tally {
    pub fn record_resources(&mut self, outcome: &ExecutionOutcome) {
        if let Some(time) = outcome.time {
            self.time = Some(self.time.map_or(time, |t| t.max(time)));
        }
        if let Some(memory) = outcome.memory {
            self.memory = Some(self.memory.map_or(memory, |m| m.max(memory)));
        }
    }

    pub fn record_pass(&mut self) {
        self.passed += 1;
    }

    pub fn accepted(self, total: u32) -> Verdict {
        Verdict {
            status: VerdictStatus::Accepted,
            time: self.time,
            memory: self.memory,
            passed_tests: self.passed,
            total_tests: total,
            output: Some(format!("Accepted: Passed {}/{} test cases.", self.passed, total)),
            error: None,
            details: None,
        }
    }

    pub fn rejected(self, total: u32, status: VerdictStatus, detail: FailureDetail) -> Verdict {
        Verdict {
            error: Some(format!("Failed on Test Case {}: {}", detail.test_case, status)),
            status,
            time: self.time,
            memory: self.memory,
            passed_tests: self.passed,
            total_tests: total,
            output: None,
            details: Some(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leetbuddy_common::types::{status, ExecutionStatus};
    use serde_json::json;

    fn case(hidden: bool) -> TestCase {
        TestCase {
            position: 1,
            input: json!({"nums": [2, 7, 11, 15], "target": 9})
                .as_object()
                .cloned()
                .unwrap(),
            expected_output: json!([0, 1]),
            hidden,
        }
    }

    fn outcome(id: u32, description: &str, stdout: Option<&str>) -> ExecutionOutcome {
        ExecutionOutcome {
            token: None,
            status: ExecutionStatus {
                id,
                description: description.to_string(),
            },
            stdout: stdout.map(String::from),
            stderr: None,
            compile_output: None,
            message: None,
            time: Some(0.01),
            memory: Some(1024),
        }
    }

    #[test]
    fn test_order_insensitive_match() {
        assert!(outputs_match(&json!([1, 0]), &json!([0, 1])));
        assert!(outputs_match(&json!(["b", "a", 3]), &json!([3, "a", "b"])));
        assert!(!outputs_match(&json!([0, 1, 1]), &json!([0, 1])));
        assert!(outputs_match(&json!(true), &json!(true)));
    }

    #[test]
    fn test_large_integers_sort_exactly() {
        assert!(outputs_match(
            &json!([9007199254740993u64, 9007199254740992u64]),
            &json!([9007199254740992u64, 9007199254740993u64])
        ));
        assert!(outputs_match(
            &json!([u64::MAX, -1, 9223372036854775807i64]),
            &json!([-1, 9223372036854775807i64, u64::MAX])
        ));
        assert!(!outputs_match(&json!([9007199254740993u64]), &json!([9007199254740992u64])));
    }

    #[test]
    fn test_integral_floats_equal_integers() {
        assert!(outputs_match(&json!([0.0, 1.0]), &json!([0, 1])));
        assert!(outputs_match(&json!([1.0, 0]), &json!([0, 1])));
        assert!(outputs_match(&json!({"k": [2.0]}), &json!({"k": [2]})));
        assert!(outputs_match(&json!(-3.0), &json!(-3)));
        assert!(!outputs_match(&json!([0.5, 1]), &json!([0, 1])));
    }

    #[test]
    fn test_nested_arrays_keep_order() {
        assert_eq!(normalize(&json!([[2, 1], [0]])), json!([[0], [2, 1]]));
        assert!(!outputs_match(&json!([[1, 0]]), &json!([[0, 1]])));
    }

    #[test]
    fn test_accepted_output_passes() {
        let verdict = evaluate_case(1, &case(false), &outcome(3, "Accepted", Some("[1, 0]\n")));
        assert_eq!(verdict, CaseVerdict::Passed);
    }

    #[test]
    fn test_wrong_answer_detail() {
        let verdict = evaluate_case(3, &case(false), &outcome(3, "Accepted", Some("[1, 2]")));
        match verdict {
            CaseVerdict::Failed { status, detail } => {
                assert_eq!(status, VerdictStatus::WrongAnswer);
                assert_eq!(detail.test_case, 3);
                assert_eq!(detail.got, Some(json!([1, 2])));
                assert_eq!(detail.expected, Some(json!([0, 1])));
                assert!(detail.input.is_some());
                assert!(detail.got_raw.is_none());
            }
            CaseVerdict::Passed => panic!("expected failure"),
        }
    }

    #[test]
    fn test_unparseable_stdout() {
        let verdict = evaluate_case(1, &case(false), &outcome(3, "Accepted", Some("None\n")));
        match verdict {
            CaseVerdict::Failed { status, detail } => {
                assert_eq!(status, VerdictStatus::WrongAnswer);
                assert_eq!(detail.got_raw.as_deref(), Some("None"));
                assert!(detail.got.is_none());
                assert!(detail.error.unwrap().starts_with("Output is not valid JSON"));
            }
            CaseVerdict::Passed => panic!("expected failure"),
        }
    }

    #[test]
    fn test_empty_stdout_is_wrong_answer() {
        let verdict = evaluate_case(1, &case(false), &outcome(3, "Accepted", None));
        assert!(matches!(
            verdict,
            CaseVerdict::Failed { status: VerdictStatus::WrongAnswer, .. }
        ));
    }

    #[test]
    fn test_non_accepted_status_wins() {
        let mut compile_error = outcome(status::COMPILATION_ERROR, "Compilation Error", None);
        compile_error.compile_output = Some("SyntaxError: invalid syntax\n".to_string());

        match evaluate_case(1, &case(false), &compile_error) {
            CaseVerdict::Failed { status, detail } => {
                assert_eq!(status.to_string(), "Compilation Error");
                assert_eq!(detail.error.as_deref(), Some("SyntaxError: invalid syntax"));
                assert!(detail.expected.is_none());
            }
            CaseVerdict::Passed => panic!("expected failure"),
        }
    }

    #[test]
    fn test_hidden_case_is_redacted() {
        let verdict = evaluate_case(5, &case(true), &outcome(3, "Accepted", Some("[9, 9]")));
        match verdict {
            CaseVerdict::Failed { detail, .. } => {
                assert_eq!(detail.test_case, 5);
                assert!(detail.input.is_none());
                assert!(detail.expected.is_none());
                assert!(detail.got.is_none());
            }
            CaseVerdict::Passed => panic!("expected failure"),
        }
    }

    #[test]
    fn test_tally_takes_maximum() {
        let mut tally = Tally::default();
        let mut first = outcome(3, "Accepted", None);
        first.time = Some(0.2);
        first.memory = Some(900);
        let mut second = outcome(3, "Accepted", None);
        second.time = Some(0.05);
        second.memory = Some(4000);
        let mut third = outcome(3, "Accepted", None);
        third.time = None;
        third.memory = None;

        for o in [&first, &second, &third] {
            tally.record_resources(o);
            tally.record_pass();
        }

        let verdict = tally.accepted(3);
        assert_eq!(verdict.time, Some(0.2));
        assert_eq!(verdict.memory, Some(4000));
        assert_eq!(verdict.output.as_deref(), Some("Accepted: Passed 3/3 test cases."));
        assert!(verdict.details.is_none());
    }

    #[test]
    fn test_rejected_summary_line() {
        let mut tally = Tally::default();
        tally.record_pass();
        let detail = FailureDetail {
            test_case: 2,
            input: None,
            expected: None,
            got: None,
            got_raw: None,
            error: None,
        };

        let verdict = tally.rejected(4, VerdictStatus::Rejected("Time Limit Exceeded".into()), detail);
        assert_eq!(verdict.error.as_deref(), Some("Failed on Test Case 2: Time Limit Exceeded"));
        assert_eq!(verdict.passed_tests, 1);
        assert_eq!(verdict.time, None);
        assert!(verdict.output.is_none());
    }
}
