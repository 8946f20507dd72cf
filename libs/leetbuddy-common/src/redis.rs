use crate::types::{Problem, TestCase};
use redis::{AsyncCommands, RedisResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Redis key layout for the problem catalog - defines only semantics, not runtime logic
/// Ensures the API and the seeding CLI never drift and keys are deterministic

pub const PROBLEMS_KEY: &str = "leetbuddy:problems";
pub const PROBLEM_PREFIX: &str = "leetbuddy:problem";
pub const TESTCASES_PREFIX: &str = "leetbuddy:testcases";

/// Key holding the JSON problem record for a slug
pub fn problem_key(slug: &str) -> String {
    format!("{}:{}", PROBLEM_PREFIX, slug)
}

/// Key holding the ordered JSON test case array for a slug
pub fn testcases_key(slug: &str) -> String {
    format!("{}:{}", TESTCASES_PREFIX, slug)
}

fn encode<T: Serialize + ?Sized>(value: &T) -> RedisResult<String> {
    serde_json::to_string(value).map_err(|e| {
        redis::RedisError::from((redis::ErrorKind::TypeError, "serialization error", e.to_string()))
    })
}

fn decode<T: DeserializeOwned>(payload: &str) -> RedisResult<T> {
    serde_json::from_str(payload).map_err(|e| {
        redis::RedisError::from((redis::ErrorKind::TypeError, "deserialization error", e.to_string()))
    })
}

/// Store a problem and its test cases atomically, replacing any previous version
pub async fn store_problem(
    conn: &mut redis::aio::ConnectionManager,
    problem: &Problem,
    test_cases: &[TestCase],
) -> RedisResult<()> {
    let problem_payload = encode(problem)?;
    let cases_payload = encode(test_cases)?;

    let _: () = redis::pipe()
        .atomic()
        .set(problem_key(&problem.slug), problem_payload)
        .ignore()
        .set(testcases_key(&problem.slug), cases_payload)
        .ignore()
        .sadd(PROBLEMS_KEY, &problem.slug)
        .ignore()
        .query_async(conn)
        .await?;

    Ok(())
}

/// Retrieve a problem record
pub async fn get_problem(
    conn: &mut redis::aio::ConnectionManager,
    slug: &str,
) -> RedisResult<Option<Problem>> {
    let payload: Option<String> = conn.get(problem_key(slug)).await?;
    payload.as_deref().map(decode).transpose()
}

/// Retrieve the ordered test cases of a problem
pub async fn get_test_cases(
    conn: &mut redis::aio::ConnectionManager,
    slug: &str,
) -> RedisResult<Option<Vec<TestCase>>> {
    let payload: Option<String> = conn.get(testcases_key(slug)).await?;
    payload.as_deref().map(decode).transpose()
}

/// All seeded slugs, unordered
pub async fn list_slugs(conn: &mut redis::aio::ConnectionManager) -> RedisResult<Vec<String>> {
    conn.smembers(PROBLEMS_KEY).await
}
