//! Problem and test-case catalog.
//!
//! The judge only reads from the catalog. Two backends exist: an in-memory
//! catalog loaded from `problems.json`, and a Redis-backed one seeded from the
//! same file by the CLI.

use crate::redis as keys;
use crate::types::{Problem, ProblemSummary, TestCase};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate problem slug '{0}' in catalog")]
    DuplicateSlug(String),
    #[error("catalog store error: {0}")]
    Redis(#[from] ::redis::RedisError),
}

#[async_trait]
pub trait ProblemCatalog: Send + Sync {
    /// All problems, ordered by id
    async fn list_problems(&self) -> Result<Vec<ProblemSummary>, CatalogError>;

    async fn problem(&self, slug: &str) -> Result<Option<Problem>, CatalogError>;

    async fn problem_id(&self, slug: &str) -> Result<Option<u32>, CatalogError> {
        Ok(self.problem(slug).await?.map(|problem| problem.id))
    }

    /// Test cases ordered by position, `None` when the slug is unknown
    async fn test_cases(&self, slug: &str) -> Result<Option<Vec<TestCase>>, CatalogError>;
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    problems: Vec<ProblemEntry>,
}

#[derive(Debug, Deserialize)]
struct ProblemEntry {
    #[serde(flatten)]
    problem: Problem,
    #[serde(default)]
    test_cases: Vec<SeedTestCase>,
}

#[derive(Debug, Deserialize)]
struct SeedTestCase {
    input: Map<String, Value>,
    expected_output: Value,
    #[serde(default)]
    hidden: bool,
}

/// Parse a catalog document, assigning 1-based positions in file order
pub fn parse_catalog(content: &str) -> Result<Vec<(Problem, Vec<TestCase>)>, CatalogError> {
    let file: CatalogFile = serde_json::from_str(content)?;

    let mut entries: Vec<(Problem, Vec<TestCase>)> = Vec::with_capacity(file.problems.len());
    for entry in file.problems {
        if entries.iter().any(|(p, _)| p.slug == entry.problem.slug) {
            return Err(CatalogError::DuplicateSlug(entry.problem.slug));
        }

        let test_cases = entry
            .test_cases
            .into_iter()
            .enumerate()
            .map(|(idx, tc)| TestCase {
                position: (idx + 1) as u32,
                input: tc.input,
                expected_output: tc.expected_output,
                hidden: tc.hidden,
            })
            .collect();

        entries.push((entry.problem, test_cases));
    }

    Ok(entries)
}

pub fn load_catalog_file<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<(Problem, Vec<TestCase>)>, CatalogError> {
    let content = fs::read_to_string(path.as_ref()).map_err(|source| CatalogError::Read {
        path: path.as_ref().display().to_string(),
        source,
    })?;
    parse_catalog(&content)
}

/// Catalog held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    problems: HashMap<String, (Problem, Vec<TestCase>)>,
}

impl InMemoryCatalog {
    pub fn from_entries(entries: Vec<(Problem, Vec<TestCase>)>) -> Self {
        let problems = entries
            .into_iter()
            .map(|(problem, cases)| (problem.slug.clone(), (problem, cases)))
            .collect();
        Self { problems }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        Ok(Self::from_entries(load_catalog_file(path)?))
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}

#[async_trait]
impl ProblemCatalog for InMemoryCatalog {
    async fn list_problems(&self) -> Result<Vec<ProblemSummary>, CatalogError> {
        let mut summaries: Vec<ProblemSummary> =
            self.problems.values().map(|(p, _)| p.summary()).collect();
        summaries.sort_by_key(|s| s.id);
        Ok(summaries)
    }

    async fn problem(&self, slug: &str) -> Result<Option<Problem>, CatalogError> {
        Ok(self.problems.get(slug).map(|(p, _)| p.clone()))
    }

    async fn test_cases(&self, slug: &str) -> Result<Option<Vec<TestCase>>, CatalogError> {
        Ok(self.problems.get(slug).map(|(_, cases)| cases.clone()))
    }
}

/// Catalog backed by Redis, see `crate::redis` for the key layout
#[derive(Clone)]
pub struct RedisCatalog {
    conn: ::redis::aio::ConnectionManager,
}

impl RedisCatalog {
    pub fn new(conn: ::redis::aio::ConnectionManager) -> Self {
        Self { conn }
    }

    pub async fn connect(redis_url: &str) -> Result<Self, CatalogError> {
        let client = ::redis::Client::open(redis_url)?;
        let conn = ::redis::aio::ConnectionManager::new(client).await?;
        Ok(Self::new(conn))
    }

    /// Write every problem of a parsed catalog document
    pub async fn seed(&self, entries: &[(Problem, Vec<TestCase>)]) -> Result<usize, CatalogError> {
        let mut conn = self.conn.clone();
        for (problem, cases) in entries {
            keys::store_problem(&mut conn, problem, cases).await?;
            tracing::info!(slug = %problem.slug, test_cases = cases.len(), "Problem seeded");
        }
        Ok(entries.len())
    }
}

#[async_trait]
impl ProblemCatalog for RedisCatalog {
    async fn list_problems(&self) -> Result<Vec<ProblemSummary>, CatalogError> {
        let mut conn = self.conn.clone();
        let slugs = keys::list_slugs(&mut conn).await?;

        let mut summaries = Vec::with_capacity(slugs.len());
        for slug in slugs {
            match keys::get_problem(&mut conn, &slug).await? {
                Some(problem) => summaries.push(problem.summary()),
                None => tracing::warn!(slug = %slug, "Slug listed without a problem record"),
            }
        }
        summaries.sort_by_key(|s| s.id);
        Ok(summaries)
    }

    async fn problem(&self, slug: &str) -> Result<Option<Problem>, CatalogError> {
        let mut conn = self.conn.clone();
        Ok(keys::get_problem(&mut conn, slug).await?)
    }

    async fn test_cases(&self, slug: &str) -> Result<Option<Vec<TestCase>>, CatalogError> {
        let mut conn = self.conn.clone();
        let mut cases = match keys::get_test_cases(&mut conn, slug).await? {
            Some(cases) => cases,
            None => return Ok(None),
        };
        cases.sort_by_key(|tc| tc.position);
        Ok(Some(cases))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CATALOG: &str = r#"{
        "problems": [
            {
                "id": 2,
                "slug": "pair-sum",
                "title": "Pair Sum",
                "difficulty": "Easy",
                "test_cases": [
                    {"input": {"nums": [1, 2], "target": 3}, "expected_output": [0, 1]},
                    {"input": {"nums": [5, 5], "target": 10}, "expected_output": [0, 1], "hidden": true}
                ]
            },
            {
                "id": 1,
                "slug": "empty",
                "title": "Empty",
                "difficulty": "Medium"
            }
        ]
    }"#;

    #[test]
    fn test_parse_assigns_positions() {
        let entries = parse_catalog(CATALOG).unwrap();
        let (problem, cases) = &entries[0];

        assert_eq!(problem.slug, "pair-sum");
        assert_eq!(problem.entry_point.name, "two_sum");
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].position, 1);
        assert_eq!(cases[1].position, 2);
        assert!(!cases[0].hidden);
        assert!(cases[1].hidden);
        assert_eq!(cases[0].expected_output, json!([0, 1]));
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        let doc = r#"{"problems": [
            {"id": 1, "slug": "a", "title": "A", "difficulty": "Easy"},
            {"id": 2, "slug": "a", "title": "A again", "difficulty": "Easy"}
        ]}"#;
        assert!(matches!(parse_catalog(doc), Err(CatalogError::DuplicateSlug(slug)) if slug == "a"));
    }

    #[tokio::test]
    async fn test_in_memory_lookup() {
        let catalog = InMemoryCatalog::from_entries(parse_catalog(CATALOG).unwrap());

        let listed = catalog.list_problems().await.unwrap();
        assert_eq!(listed.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);

        assert_eq!(catalog.problem_id("pair-sum").await.unwrap(), Some(2));
        assert_eq!(catalog.problem_id("missing").await.unwrap(), None);
        assert_eq!(catalog.test_cases("empty").await.unwrap(), Some(vec![]));
        assert!(catalog.test_cases("missing").await.unwrap().is_none());
    }

    #[test]
    fn test_shipped_catalog_loads() {
        let catalog = InMemoryCatalog::load(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../config/problems.json"
        ))
        .unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn test_redis_catalog_round_trip() {
        let catalog = RedisCatalog::connect("redis://127.0.0.1:6379").await.unwrap();
        let entries = parse_catalog(CATALOG).unwrap();
        catalog.seed(&entries).await.unwrap();

        let cases = catalog.test_cases("pair-sum").await.unwrap().unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(catalog.problem_id("pair-sum").await.unwrap(), Some(2));
    }
}
