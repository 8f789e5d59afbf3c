use crate::Result;
use crate::config::Config;
use ohno::IntoAppError;
use regex::{RegexSet, RegexSetBuilder};
use std::collections::BTreeSet;
use strum::{Display, EnumIter};

/// Semantic bucket for a repository file, listed in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum FileCategory {
    #[strum(to_string = "documentation")]
    Documentation,
    #[strum(to_string = "database")]
    Database,
    #[strum(to_string = "CI/CD")]
    CiCd,
    #[strum(to_string = "API")]
    Api,
}

/// Paths discovered in one repository, bucketed by category.
///
/// A file lands in at most one bucket: the first category whose patterns match it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileClassification {
    pub doc_files: BTreeSet<String>,
    pub db_files: BTreeSet<String>,
    pub cicd_files: BTreeSet<String>,
    pub api_files: BTreeSet<String>,
}

impl FileClassification {
    pub fn insert(&mut self, category: FileCategory, path: impl Into<String>) -> bool {
        self.bucket_mut(category).insert(path.into())
    }

    #[must_use]
    pub const fn get(&self, category: FileCategory) -> &BTreeSet<String> {
        match category {
            FileCategory::Documentation => &self.doc_files,
            FileCategory::Database => &self.db_files,
            FileCategory::CiCd => &self.cicd_files,
            FileCategory::Api => &self.api_files,
        }
    }

    const fn bucket_mut(&mut self, category: FileCategory) -> &mut BTreeSet<String> {
        match category {
            FileCategory::Documentation => &mut self.doc_files,
            FileCategory::Database => &mut self.db_files,
            FileCategory::CiCd => &mut self.cicd_files,
            FileCategory::Api => &mut self.api_files,
        }
    }

    /// True when no bucket holds anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doc_files.is_empty() && self.db_files.is_empty() && self.cicd_files.is_empty() && self.api_files.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.doc_files.len() + self.db_files.len() + self.cicd_files.len() + self.api_files.len()
    }
}

/// Compiled classification pattern sets.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    documentation: RegexSet,
    database: RegexSet,
    ci_cd: RegexSet,
    ci_cd_tools: Vec<String>,
    api: RegexSet,
    api_directories: RegexSet,
    unimportant_directories: RegexSet,
}

fn compile(name: &str, patterns: &[String]) -> Result<RegexSet> {
    RegexSetBuilder::new(patterns)
        .case_insensitive(true)
        .build()
        .into_app_err_with(|| format!("compiling {name} patterns"))
}

impl PathClassifier {
    pub fn from_config(config: &Config) -> Result<Self> {
        let patterns = &config.patterns;
        let ci_cd_patterns: Vec<String> = config.ci_cd_tools.iter().map(|t| t.pattern.clone()).collect();

        Ok(Self {
            documentation: compile("documentation", &patterns.documentation)?,
            database: compile("database", &patterns.database)?,
            ci_cd: compile("CI/CD", &ci_cd_patterns)?,
            ci_cd_tools: config.ci_cd_tools.iter().map(|t| t.tool.clone()).collect(),
            api: compile("API", &patterns.api)?,
            api_directories: compile("API directory", &patterns.api_directories)?,
            unimportant_directories: compile("unimportant directory", &patterns.unimportant_directories)?,
        })
    }

    /// The first category, in priority order, whose patterns match `path`.
    #[must_use]
    pub fn classify_file(&self, path: &str) -> Option<FileCategory> {
        if self.documentation.is_match(path) {
            Some(FileCategory::Documentation)
        } else if self.database.is_match(path) {
            Some(FileCategory::Database)
        } else if self.ci_cd.is_match(path) {
            Some(FileCategory::CiCd)
        } else if self.api.is_match(path) {
            Some(FileCategory::Api)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_api_directory(&self, path: &str) -> bool {
        self.api_directories.is_match(path)
    }

    /// Directories that are never worth listing (assets, logs, build output, ...).
    #[must_use]
    pub fn is_unimportant_directory(&self, path: &str) -> bool {
        self.unimportant_directories.is_match(path)
    }

    /// Names of the CI/CD tools whose configuration files appear in `paths`, in table order.
    #[must_use]
    pub fn ci_cd_tools<'a>(&self, paths: impl IntoIterator<Item = &'a String>) -> Vec<String> {
        let mut matched = BTreeSet::new();
        for path in paths {
            matched.extend(self.ci_cd.matches(path));
        }

        let mut tools: Vec<String> = Vec::new();
        for index in matched {
            let tool = &self.ci_cd_tools[index];
            if !tools.contains(tool) {
                tools.push(tool.clone());
            }
        }
        tools
    }
}
