/// Harness Generator - Executable Source Construction
///
/// **Core Responsibility:**
/// Wrap user code in a fixed I/O harness so that one remote execution
/// produces exactly one line of JSON on stdout.
///
/// **Modes:**
/// - Free-run: the harness reads two stdin lines (JSON list, integer) and
///   calls the entry point. Malformed input exits 2, a missing entry point
///   exits 3, any other exception exits 1.
/// - Test case: the payload is embedded as literal values, no stdin parsing.
///   Any exception writes one `Error during execution:` line and exits 1.
///
/// **Guarantees:**
/// - Templates are fixed; only typed values are substituted into them
/// - Entry-point and parameter names must be plain identifiers
/// - Output is byte-identical for identical inputs
/// - Sequence results are sorted before printing

use handlebars::Handlebars;
use leetbuddy_common::types::{EntryPoint, Language, TestCase};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

const PYTHON_FREE_RUN: &str = include_str!("../templates/python_free_run.hbs");
const PYTHON_TEST_CASE: &str = include_str!("../templates/python_test_case.hbs");
const JAVASCRIPT_FREE_RUN: &str = include_str!("../templates/javascript_free_run.hbs");
const JAVASCRIPT_TEST_CASE: &str = include_str!("../templates/javascript_test_case.hbs");

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),
    #[error("test case {position} has no input field '{param}'")]
    MissingParameter { position: u32, param: String },
    #[error("failed to register harness template: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),
    #[error("failed to render harness: {0}")]
    Render(#[from] handlebars::RenderError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    FreeRun,
    TestCase,
}

impl Mode {
    fn as_str(&self) -> &'static str {
        match self {
            Mode::FreeRun => "free_run",
            Mode::TestCase => "test_case",
        }
    }
}

fn template_name(language: Language, mode: Mode) -> String {
    format!("{}/{}", language, mode.as_str())
}

#[derive(Serialize)]
struct FreeRunData<'a> {
    user_code: &'a str,
    function_name: &'a str,
}

#[derive(Serialize)]
struct ArgBinding {
    name: String,
    literal: String,
}

#[derive(Serialize)]
struct TestCaseData<'a> {
    user_code: &'a str,
    function_name: &'a str,
    args: Vec<ArgBinding>,
    call_args: String,
}

pub struct HarnessGenerator {
    registry: Handlebars<'static>,
}

impl HarnessGenerator {
    pub fn new() -> Result<Self, HarnessError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);

        for (language, mode, template) in [
            (Language::Python, Mode::FreeRun, PYTHON_FREE_RUN),
            (Language::Python, Mode::TestCase, PYTHON_TEST_CASE),
            (Language::JavaScript, Mode::FreeRun, JAVASCRIPT_FREE_RUN),
            (Language::JavaScript, Mode::TestCase, JAVASCRIPT_TEST_CASE),
        ] {
            registry
                .register_template_string(&template_name(language, mode), template)
                .map_err(Box::new)?;
        }

        Ok(Self { registry })
    }

    /// Program that reads `nums` and `target` from stdin
    pub fn free_run(
        &self,
        language: Language,
        user_code: &str,
        entry_point: &EntryPoint,
    ) -> Result<String, HarnessError> {
        ensure_identifier(&entry_point.name)?;

        let data = FreeRunData {
            user_code,
            function_name: &entry_point.name,
        };
        Ok(self
            .registry
            .render(&template_name(language, Mode::FreeRun), &data)?)
    }

    /// Program with the test case payload embedded as literals
    pub fn test_case(
        &self,
        language: Language,
        user_code: &str,
        entry_point: &EntryPoint,
        test_case: &TestCase,
    ) -> Result<String, HarnessError> {
        ensure_identifier(&entry_point.name)?;

        let mut args = Vec::with_capacity(entry_point.params.len());
        for param in &entry_point.params {
            ensure_identifier(param)?;
            let value = test_case
                .input
                .get(param)
                .ok_or_else(|| HarnessError::MissingParameter {
                    position: test_case.position,
                    param: param.clone(),
                })?;
            args.push(ArgBinding {
                name: param.clone(),
                literal: literal_for(language, value),
            });
        }

        let data = TestCaseData {
            user_code,
            function_name: &entry_point.name,
            call_args: entry_point.params.join(", "),
            args,
        };
        Ok(self
            .registry
            .render(&template_name(language, Mode::TestCase), &data)?)
    }
}

fn ensure_identifier(name: &str) -> Result<(), HarnessError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(HarnessError::InvalidIdentifier(name.to_string()))
    }
}

fn literal_for(language: Language, value: &Value) -> String {
    match language {
        Language::Python => python_literal(value),
        // JSON text is a valid JavaScript expression
        Language::JavaScript => value.to_string(),
    }
}

/// Render a JSON value as a Python expression
pub fn python_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        // JSON string escapes are a subset of Python's
        Value::String(s) => Value::String(s.clone()).to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(python_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(fields) => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(k, v)| format!("{}: {}", Value::String(k.clone()), python_literal(v)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
    }
}
