// CLI commands for operating LeetBuddy
use anyhow::{bail, Context, Result};
use leetbuddy_common::catalog::{
    load_catalog_file, InMemoryCatalog, ProblemCatalog, RedisCatalog,
};
use leetbuddy_common::config::Settings;
use leetbuddy_common::language_config::LanguageRegistry;
use leetbuddy_common::types::{Language, Problem, TestCase};
use leetbuddy_judge::{HarnessGenerator, Judge, Judge0Client, Judge0Config};
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn read_source(path: &str) -> Result<String> {
    fs::read_to_string(Path::new(path)).with_context(|| format!("Failed to read {}", path))
}

fn find_problem(catalog_path: &str, slug: &str) -> Result<(Problem, Vec<TestCase>)> {
    let entries = load_catalog_file(catalog_path)
        .with_context(|| format!("Failed to load {}", catalog_path))?;
    match entries.into_iter().find(|(problem, _)| problem.slug == slug) {
        Some(entry) => Ok(entry),
        None => bail!("Problem '{}' not found in {}", slug, catalog_path),
    }
}

/// Write every problem of a catalog file to Redis
pub async fn seed(catalog_path: &str, redis_url: &str) -> Result<()> {
    println!("🌱 Seeding catalog from {}", catalog_path);

    let entries = load_catalog_file(catalog_path)
        .with_context(|| format!("Failed to load {}", catalog_path))?;
    if entries.is_empty() {
        bail!("No problems found in {}", catalog_path);
    }

    let catalog = RedisCatalog::connect(redis_url)
        .await
        .with_context(|| format!("Failed to connect to Redis at {}", redis_url))?;
    let seeded = catalog.seed(&entries).await.context("Failed to write catalog")?;

    for (problem, cases) in &entries {
        let hidden = cases.iter().filter(|tc| tc.hidden).count();
        println!(
            "  ✅ {:<24} {} test case(s), {} hidden",
            problem.slug,
            cases.len(),
            hidden
        );
    }
    println!("\n✅ Seeded {} problem(s) into {}", seeded, redis_url);
    Ok(())
}

pub fn list_problems(catalog_path: &str) -> Result<()> {
    let entries = load_catalog_file(catalog_path)
        .with_context(|| format!("Failed to load {}", catalog_path))?;

    if entries.is_empty() {
        println!("No problems configured.");
        return Ok(());
    }

    println!("📋 Problems:\n");
    println!("{:<6} {:<24} {:<30} {:<10} {:<6}", "ID", "SLUG", "TITLE", "DIFFICULTY", "TESTS");
    println!("{}", "─".repeat(80));
    for (problem, cases) in &entries {
        println!(
            "{:<6} {:<24} {:<30} {:<10} {:<6}",
            problem.id,
            problem.slug,
            problem.title,
            problem.difficulty,
            cases.len()
        );
    }
    println!("\n✅ Total: {} problem(s)", entries.len());
    Ok(())
}

pub fn list_languages(languages_path: &str) -> Result<()> {
    let registry = LanguageRegistry::load_from_file(languages_path)
        .with_context(|| format!("Failed to load {}", languages_path))?;

    println!("📋 Enabled Languages:\n");
    println!("{:<12} {:<10}", "LANGUAGE", "JUDGE0 ID");
    println!("{}", "─".repeat(24));
    for language in registry.enabled_languages() {
        println!("{:<12} {:<10}", language, language.judge0_id());
    }
    Ok(())
}

/// Print the exact program that would be sent to Judge0
pub fn print_harness(
    catalog_path: &str,
    slug: &str,
    language: &str,
    source_path: &str,
    test_case: Option<u32>,
) -> Result<()> {
    let language = Language::from_name(language)
        .with_context(|| format!("Unsupported language '{}'", language))?;
    let (problem, cases) = find_problem(catalog_path, slug)?;
    let user_code = read_source(source_path)?;
    let generator = HarnessGenerator::new()?;

    let program = match test_case {
        None => generator.free_run(language, &user_code, &problem.entry_point)?,
        Some(position) => {
            let case = cases
                .iter()
                .find(|tc| tc.position == position)
                .with_context(|| format!("Problem '{}' has no test case {}", slug, position))?;
            generator.test_case(language, &user_code, &problem.entry_point, case)?
        }
    };

    print!("{}", program);
    Ok(())
}

/// Judge a local file against a problem using the configured Judge0
pub async fn judge(slug: &str, language_id: u32, source_path: &str) -> Result<()> {
    let settings = Settings::from_env().context("Invalid configuration")?;
    let user_code = read_source(source_path)?;

    let languages = LanguageRegistry::load_from_file(&settings.languages_path)
        .with_context(|| format!("Failed to load {}", settings.languages_path))?;
    let catalog: Arc<dyn ProblemCatalog> = match &settings.redis_url {
        Some(url) => Arc::new(RedisCatalog::connect(url).await?),
        None => Arc::new(InMemoryCatalog::load(&settings.catalog_path)?),
    };
    let executor = Judge0Client::new(Judge0Config::from_settings(&settings))?;
    let judge = Judge::new(Arc::new(executor), catalog, languages)?
        .with_inter_test_delay(settings.inter_test_delay());

    println!("⚖️  Judging {} against '{}'...", source_path, slug);
    let verdict = judge.run_tests(slug, language_id, &user_code).await?;

    println!("{}", serde_json::to_string_pretty(&verdict)?);
    if verdict.status.is_accepted() {
        println!("\n✅ {}", verdict.output.unwrap_or_default());
    } else {
        println!("\n❌ {}", verdict.error.unwrap_or_default());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/problems.json");

    #[test]
    fn test_find_problem() {
        let (problem, cases) = find_problem(CATALOG, "two-sum").unwrap();
        assert_eq!(problem.id, 1);
        assert_eq!(cases.len(), 5);
        assert!(find_problem(CATALOG, "three-sum").is_err());
    }

    #[test]
    fn test_print_harness_rejects_unknown_language() {
        let result = print_harness(CATALOG, "two-sum", "cobol", "solution.cob", None);
        assert!(result.unwrap_err().to_string().contains("Unsupported language"));
    }
}
