//! Database technology detection.
//!
//! Evidence comes from four sources: repository topics, the description, the primary language,
//! and the contents of database-related files found by the tree walker. Free text is lower-cased,
//! split on whitespace, stripped of surrounding punctuation, and intersected with each database's
//! keyword list.

use crate::Result;
use crate::config::Config;
use crate::facts::RepoSpec;
use crate::facts::file_content::fetch_text;
use crate::facts::hosting::GitHubClient;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

const LOG_TARGET: &str = "  database";

/// Keyword tables used to recognize databases.
#[derive(Debug, Clone)]
pub struct DatabaseDetector {
    keywords: BTreeMap<String, HashSet<String>>,
    languages: Vec<String>,
}

/// Databases detected in one repository, by source of evidence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatabaseUsage {
    pub topics: BTreeSet<String>,
    pub description: BTreeSet<String>,
    pub language: Option<String>,
    pub files: BTreeSet<String>,
}

impl DatabaseUsage {
    /// Every database detected by any source.
    #[must_use]
    pub fn all(&self) -> BTreeSet<String> {
        self.topics
            .iter()
            .chain(&self.description)
            .chain(&self.files)
            .chain(&self.language)
            .cloned()
            .collect()
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| c.is_ascii_punctuation()).to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}

impl DatabaseDetector {
    #[must_use]
    pub fn new(keywords: &BTreeMap<String, Vec<String>>, languages: &[String]) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|(db, words)| (db.clone(), words.iter().map(|w| w.to_lowercase()).collect()))
                .collect(),
            languages: languages.to_vec(),
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.database_keywords, &config.database_languages)
    }

    /// Databases whose keywords appear as words in `text`.
    #[must_use]
    pub fn search_text(&self, text: &str) -> BTreeSet<String> {
        let words = tokenize(text);
        if words.is_empty() {
            return BTreeSet::new();
        }

        self.keywords
            .iter()
            .filter(|(_, keywords)| !keywords.is_disjoint(&words))
            .map(|(db, _)| db.clone())
            .collect()
    }

    /// The language itself, when it is one of the configured database languages.
    #[must_use]
    pub fn search_language(&self, language: Option<&str>) -> Option<String> {
        let language = language?;
        self.languages.iter().find(|l| l.eq_ignore_ascii_case(language)).cloned()
    }

    /// Detect from repository metadata only, without touching the network.
    #[must_use]
    pub fn detect_metadata(&self, topics: &[String], description: Option<&str>, language: Option<&str>) -> DatabaseUsage {
        DatabaseUsage {
            topics: self.search_text(&topics.join(" ")),
            description: description.map(|d| self.search_text(d)).unwrap_or_default(),
            language: self.search_language(language),
            files: BTreeSet::new(),
        }
    }

    /// Search the contents of the given database files.
    ///
    /// Files that cannot be fetched or decoded are logged and skipped.
    pub async fn search_files(
        &self,
        client: &GitHubClient,
        spec: &RepoSpec,
        paths: impl IntoIterator<Item = &String>,
    ) -> Result<BTreeSet<String>> {
        let mut found = BTreeSet::new();

        for path in paths {
            let Some(text) = fetch_text(client, spec, path).await? else {
                log::warn!(target: LOG_TARGET, "No usable content for {path} in '{spec}'");
                continue;
            };

            let hits = self.search_text(&text);
            if !hits.is_empty() {
                log::debug!(target: LOG_TARGET, "Found {hits:?} in {path} of '{spec}'");
            }
            found.extend(hits);
        }

        Ok(found)
    }

    /// Full detection across metadata and file contents.
    pub async fn detect(
        &self,
        client: &GitHubClient,
        spec: &RepoSpec,
        topics: &[String],
        description: Option<&str>,
        language: Option<&str>,
        db_files: impl IntoIterator<Item = &String>,
    ) -> Result<DatabaseUsage> {
        let mut usage = self.detect_metadata(topics, description, language);
        usage.files = self.search_files(client, spec, db_files).await?;

        log::info!(target: LOG_TARGET, "Databases for '{spec}': {:?}", usage.all());
        Ok(usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> DatabaseDetector {
        DatabaseDetector::from_config(&Config::default())
    }

    #[test]
    fn test_description_keyword() {
        let found = detector().search_text("A sample app using postgres");
        assert!(found.contains("PostgreSQL"));
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_punctuation_and_case_are_ignored() {
        let found = detector().search_text("Backed by Redis, MongoDB.");
        assert!(found.contains("Redis"));
        assert!(found.contains("MongoDB"));
    }

    #[test]
    fn test_substrings_do_not_match() {
        assert!(detector().search_text("a pgadmin-like tool for mongodbish stores").is_empty());
        assert!(detector().search_text("").is_empty());
    }

    #[test]
    fn test_language_match() {
        let d = detector();
        assert_eq!(d.search_language(Some("PLpgSQL")).as_deref(), Some("PLpgSQL"));
        assert_eq!(d.search_language(Some("tsql")).as_deref(), Some("TSQL"));
        assert!(d.search_language(Some("Rust")).is_none());
        assert!(d.search_language(None).is_none());
    }

    #[test]
    fn test_metadata_union() {
        let usage = detector().detect_metadata(&["sqlite".to_string(), "cli".to_string()], Some("talks to mysql"), Some("SQL"));
        let all = usage.all();
        assert!(all.contains("SQLite"));
        assert!(all.contains("MySQL"));
        assert!(all.contains("SQL"));
        assert!(usage.files.is_empty());
    }
}
