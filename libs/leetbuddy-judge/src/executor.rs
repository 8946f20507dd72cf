/// Judge - High-Level Orchestration
///
/// **Responsibility:**
/// Turn one submission into one verdict by driving the harness generator,
/// the remote executor and the evaluator.
///
/// **Architecture:**
/// 1. Pre-checks: language, problem, test cases (no external execution yet)
/// 2. For each test case in catalog order: build harness, execute, judge
/// 3. Stop at the first failing case, otherwise report Accepted
///
/// This module is the glue layer - it knows nothing about:
/// - How code executes (engine's job)
/// - How outputs are compared (evaluator's job)
/// - How source text is built (harness's job)
///
/// Test cases run strictly one after another, with a fixed pause between
/// them to stay under the executor's rate limits.

use crate::engine::RemoteExecutor;
use crate::error::JudgeError;
use crate::evaluator::{evaluate_case, CaseVerdict, Tally};
use crate::harness::{HarnessError, HarnessGenerator};
use leetbuddy_common::catalog::ProblemCatalog;
use leetbuddy_common::language_config::LanguageRegistry;
use leetbuddy_common::types::{EntryPoint, ExecutionOutcome, Language, Submission, Verdict};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct Judge {
    executor: Arc<dyn RemoteExecutor>,
    catalog: Arc<dyn ProblemCatalog>,
    languages: LanguageRegistry,
    harness: HarnessGenerator,
    inter_test_delay: Duration,
}

impl Judge {
    pub fn new(
        executor: Arc<dyn RemoteExecutor>,
        catalog: Arc<dyn ProblemCatalog>,
        languages: LanguageRegistry,
    ) -> Result<Self, HarnessError> {
        Ok(Self {
            executor,
            catalog,
            languages,
            harness: HarnessGenerator::new()?,
            inter_test_delay: Duration::from_secs(1),
        })
    }

    /// Pause between consecutive test cases, zero disables it
    pub fn with_inter_test_delay(mut self, delay: Duration) -> Self {
        self.inter_test_delay = delay;
        self
    }

    pub fn catalog(&self) -> &Arc<dyn ProblemCatalog> {
        &self.catalog
    }

    fn resolve_language(&self, language_id: u32) -> Result<Language, JudgeError> {
        self.languages
            .resolve(language_id)
            .ok_or(JudgeError::UnsupportedLanguage(language_id))
    }

    /// Run user code once against raw stdin and return the raw outcome
    #[tracing::instrument(
        skip(self, submission),
        fields(run_id = %uuid::Uuid::new_v4(), language_id = submission.language_id)
    )]
    pub async fn run_free(&self, submission: &Submission) -> Result<ExecutionOutcome, JudgeError> {
        if submission.source_code.trim().is_empty() {
            return Err(JudgeError::Validation("source_code is required".to_string()));
        }
        let language = self.resolve_language(submission.language_id)?;

        let source = self
            .harness
            .free_run(language, &submission.source_code, &EntryPoint::default())?;
        let outcome = self
            .executor
            .execute(language.judge0_id(), &source, submission.stdin.as_deref())
            .await?;

        info!(
            language = %language,
            status = %outcome.status.description,
            "Free run finished"
        );
        Ok(outcome)
    }

    /// Judge user code against every test case of a problem
    #[tracing::instrument(skip(self, user_code), fields(run_id = %uuid::Uuid::new_v4()))]
    pub async fn run_tests(
        &self,
        slug: &str,
        language_id: u32,
        user_code: &str,
    ) -> Result<Verdict, JudgeError> {
        if slug.trim().is_empty() {
            return Err(JudgeError::Validation("problem_slug is required".to_string()));
        }
        if user_code.trim().is_empty() {
            return Err(JudgeError::Validation("user_code is required".to_string()));
        }
        let language = self.resolve_language(language_id)?;

        let problem = self
            .catalog
            .problem(slug)
            .await?
            .ok_or_else(|| JudgeError::NotFound(slug.to_string()))?;
        let cases = match self.catalog.test_cases(slug).await? {
            Some(cases) if !cases.is_empty() => cases,
            _ => return Err(JudgeError::NoTestCases(slug.to_string())),
        };

        let total = cases.len() as u32;
        info!(problem = %slug, language = %language, total, "Judging submission");

        let mut tally = Tally::default();
        for (idx, case) in cases.iter().enumerate() {
            let position = idx as u32 + 1;

            let source = self
                .harness
                .test_case(language, user_code, &problem.entry_point, case)?;
            let outcome = self
                .executor
                .execute(language.judge0_id(), &source, None)
                .await?;
            tally.record_resources(&outcome);

            if let CaseVerdict::Failed { status, detail } = evaluate_case(position, case, &outcome) {
                warn!(
                    problem = %slug,
                    test_case = position,
                    status = %status,
                    passed = tally.passed,
                    "Test case failed"
                );
                return Ok(tally.rejected(total, status, detail));
            }
            tally.record_pass();

            if position < total && !self.inter_test_delay.is_zero() {
                tokio::time::sleep(self.inter_test_delay).await;
            }
        }

        info!(problem = %slug, passed = tally.passed, total, "Submission accepted");
        Ok(tally.accepted(total))
    }
}
