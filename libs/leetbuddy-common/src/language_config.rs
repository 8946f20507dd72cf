// Language configuration management
// Loads and validates languages from languages.json

use crate::types::Language;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LanguageConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse languages.json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown language '{0}' in languages.json")]
    UnknownLanguage(String),
    #[error("language '{name}' is configured with Judge0 id {configured}, expected {expected}")]
    IdMismatch {
        name: String,
        configured: u32,
        expected: u32,
    },
    #[error("no languages configured in languages.json")]
    Empty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub name: String,
    pub judge0_id: u32,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LanguagesFile {
    languages: Vec<LanguageConfig>,
}

/// Registry of configured languages
/// This is the authoritative source for which languages are enabled
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    by_judge0_id: HashMap<u32, Language>,
}

impl LanguageRegistry {
    /// Load language configuration from languages.json
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, LanguageConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|source| LanguageConfigError::Read {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, LanguageConfigError> {
        let config: LanguagesFile = serde_json::from_str(content)?;

        let mut by_judge0_id = HashMap::new();
        for lang_config in &config.languages {
            let language = Language::from_name(&lang_config.name)
                .ok_or_else(|| LanguageConfigError::UnknownLanguage(lang_config.name.clone()))?;

            if language.judge0_id() != lang_config.judge0_id {
                return Err(LanguageConfigError::IdMismatch {
                    name: lang_config.name.clone(),
                    configured: lang_config.judge0_id,
                    expected: language.judge0_id(),
                });
            }
            by_judge0_id.insert(lang_config.judge0_id, language);
        }

        if by_judge0_id.is_empty() {
            return Err(LanguageConfigError::Empty);
        }

        Ok(Self { by_judge0_id })
    }

    /// Every language the harness generator supports
    pub fn all() -> Self {
        let by_judge0_id = [Language::Python, Language::JavaScript]
            .into_iter()
            .map(|lang| (lang.judge0_id(), lang))
            .collect();
        Self { by_judge0_id }
    }

    /// Resolve an enabled language by its Judge0 id
    pub fn resolve(&self, judge0_id: u32) -> Option<Language> {
        self.by_judge0_id.get(&judge0_id).copied()
    }

    /// Get all enabled languages
    pub fn enabled_languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> = self.by_judge0_id.values().copied().collect();
        languages.sort_by_key(|lang| lang.judge0_id());
        languages
    }
}
