use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err, bail};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::sync::LazyLock;

/// The default configuration YAML content, embedded from `default_config.yml`
pub const DEFAULT_CONFIG_YAML: &str = include_str!("../../default_config.yml");

/// Largest page size the GitHub API accepts.
const MAX_PER_PAGE: u32 = 100;

/// Column names the user row mapper knows how to fill.
const KNOWN_USER_COLUMNS: &[&str] = &["login", "url", "html_url", "id", "type"];

/// Column names the repository row mapper knows how to fill.
const KNOWN_REPO_COLUMNS: &[&str] = &[
    "owner",
    "repo_name",
    "repo_html_url",
    "language",
    "topics",
    "repo_description",
    "open_issues_count",
    "forks_count",
    "stargazers_count",
    "last_repo_commit_date",
    "pushed_at",
    "updated_at",
    "license",
    "created_at",
    "default_branch",
    "fork",
    "archived",
];

/// Column names the profile row mapper knows how to fill.
const KNOWN_PROFILE_COLUMNS: &[&str] = &[
    "login",
    "name",
    "location",
    "email",
    "bio",
    "company",
    "blog",
    "public_repos",
    "public_gists",
    "followers",
    "following",
    "created_at",
    "updated_at",
];

// The embedded defaults always carry every field, so parsing them never falls back to the
// per-field default functions below. build.rs validates the file.
static DEFAULTS: LazyLock<Config> =
    LazyLock::new(|| serde_yaml::from_str(DEFAULT_CONFIG_YAML).expect("embedded default configuration should parse"));

/// Generates serde default functions that pull a field out of the embedded defaults.
macro_rules! embedded_defaults {
    ($($name:ident: $ty:ty => $($field:ident).+;)*) => {
        $(
            fn $name() -> $ty {
                DEFAULTS.$($field).+.clone()
            }
        )*
    };
}

embedded_defaults! {
    default_api_base_url: String => api_base_url;
    default_user_agent: String => user_agent;
    default_request_timeout_secs: u64 => request_timeout_secs;
    default_request_delay_ms: u64 => request_delay_ms;
    default_retry: RetrySettings => retry;
    default_per_page: u32 => per_page;
    default_count_page_limit: u32 => count_page_limit;
    default_max_search_results: u32 => max_search_results;
    default_dependency_cap: usize => dependency_cap;
    default_large_listing_threshold: usize => large_listing_threshold;
    default_output_dir: Utf8PathBuf => output_dir;
    default_output_files: OutputFiles => output_files;
    default_columns: Columns => columns;
    default_patterns: PatternSets => patterns;
    default_ci_cd_tools: Vec<CiCdTool> => ci_cd_tools;
    default_database_keywords: BTreeMap<String, Vec<String>> => database_keywords;
    default_database_languages: Vec<String> => database_languages;
    default_error_messages: BTreeMap<String, String> => error_messages;

    default_max_attempts: u32 => retry.max_attempts;
    default_backoff_factor_secs: f64 => retry.backoff_factor_secs;
    default_max_retry_after_secs: u64 => retry.max_retry_after_secs;

    default_users_file: String => output_files.users;
    default_repos_file: String => output_files.repos;
    default_top_repos_file: String => output_files.top_repos;
    default_contributors_file: String => output_files.contributors;
    default_details_file: String => output_files.details;

    default_user_columns: Vec<String> => columns.users;
    default_repo_columns: Vec<String> => columns.repos;
    default_profile_columns: Vec<String> => columns.profile;

    default_documentation_patterns: Vec<String> => patterns.documentation;
    default_database_patterns: Vec<String> => patterns.database;
    default_api_patterns: Vec<String> => patterns.api;
    default_api_directory_patterns: Vec<String> => patterns.api_directories;
    default_unimportant_directory_patterns: Vec<String> => patterns.unimportant_directories;
}

/// Connection-level retry behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySettings {
    /// Total number of attempts for a request, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base of the exponential backoff: attempt `n` waits `backoff_factor_secs * 2^(n-1)`.
    #[serde(default = "default_backoff_factor_secs")]
    pub backoff_factor_secs: f64,

    /// Upper bound applied to server-supplied `Retry-After` values.
    #[serde(default = "default_max_retry_after_secs")]
    pub max_retry_after_secs: u64,
}

/// File names, relative to the output directory, for each collection stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputFiles {
    #[serde(default = "default_users_file")]
    pub users: String,

    #[serde(default = "default_repos_file")]
    pub repos: String,

    #[serde(default = "default_top_repos_file")]
    pub top_repos: String,

    #[serde(default = "default_contributors_file")]
    pub contributors: String,

    #[serde(default = "default_details_file")]
    pub details: String,
}

/// Ordered column lists for the user, repository, and contributor profile outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Columns {
    #[serde(default = "default_user_columns")]
    pub users: Vec<String>,

    #[serde(default = "default_repo_columns")]
    pub repos: Vec<String>,

    #[serde(default = "default_profile_columns")]
    pub profile: Vec<String>,
}

/// Regular expressions used to bucket repository paths.
///
/// CI/CD files are recognized through [`Config::ci_cd_tools`] so that the tool lookup and the
/// classification bucket can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternSets {
    #[serde(default = "default_documentation_patterns")]
    pub documentation: Vec<String>,

    #[serde(default = "default_database_patterns")]
    pub database: Vec<String>,

    #[serde(default = "default_api_patterns")]
    pub api: Vec<String>,

    #[serde(default = "default_api_directory_patterns")]
    pub api_directories: Vec<String>,

    #[serde(default = "default_unimportant_directory_patterns")]
    pub unimportant_directories: Vec<String>,
}

/// Maps a CI/CD configuration path pattern to the name of the tool it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CiCdTool {
    pub pattern: String,
    pub tool: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root of the REST API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Fixed pause applied before every request.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_retry")]
    pub retry: RetrySettings,

    /// Page size for list and search endpoints.
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Number of pages fetched when counting contributors, commits, issues, and pull requests.
    #[serde(default = "default_count_page_limit")]
    pub count_page_limit: u32,

    /// The search API never returns more than this many results for one query.
    #[serde(default = "default_max_search_results")]
    pub max_search_results: u32,

    /// Maximum number of dependency names stored per repository.
    #[serde(default = "default_dependency_cap")]
    pub dependency_cap: usize,

    /// Directory listings (other than the root) with more entries than this are skipped.
    #[serde(default = "default_large_listing_threshold")]
    pub large_listing_threshold: usize,

    #[serde(default = "default_output_dir")]
    pub output_dir: Utf8PathBuf,

    #[serde(default = "default_output_files")]
    pub output_files: OutputFiles,

    #[serde(default = "default_columns")]
    pub columns: Columns,

    #[serde(default = "default_patterns")]
    pub patterns: PatternSets,

    #[serde(default = "default_ci_cd_tools")]
    pub ci_cd_tools: Vec<CiCdTool>,

    /// Database name to the keywords that reveal its use.
    #[serde(default = "default_database_keywords")]
    pub database_keywords: BTreeMap<String, Vec<String>>,

    /// Primary repository languages that imply database work on their own.
    #[serde(default = "default_database_languages")]
    pub database_languages: Vec<String>,

    /// HTTP status code to a human-readable explanation.
    #[serde(default = "default_error_messages")]
    pub error_messages: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        DEFAULTS.clone()
    }
}

impl Config {
    /// Load configuration from an explicit path or from the first `harvest.*` file in `base_dir`.
    ///
    /// Returns the configuration together with any non-fatal validation warnings.
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<(Self, Vec<String>)> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading gh-harvest configuration from {path}"))?;
            (path.clone(), text)
        } else {
            let candidates = [
                base_dir.join("harvest.toml"),
                base_dir.join("harvest.yml"),
                base_dir.join("harvest.yaml"),
                base_dir.join("harvest.json"),
            ];

            let mut found = None;
            for path in &candidates {
                match fs::read_to_string(path) {
                    Ok(text) => {
                        found = Some((path.clone(), text));
                        break;
                    }
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e).into_app_err_with(|| format!("reading gh-harvest configuration from {path}")),
                }
            }

            let Some(result) = found else {
                let config = Self::default();
                let warnings = config.validate()?;
                return Ok((config, warnings));
            };
            result
        };

        let extension = final_path.extension().unwrap_or_default();
        let config: Self = match extension {
            "toml" => toml::from_str(&text).into_app_err_with(|| format!("parsing TOML configuration from {final_path}"))?,
            "yml" | "yaml" => serde_yaml::from_str(&text).into_app_err_with(|| format!("parsing YAML configuration from {final_path}"))?,
            "json" => serde_json::from_str(&text).into_app_err_with(|| format!("parsing JSON configuration from {final_path}"))?,
            _ => return Err(app_err!("unsupported configuration file extension: {extension}")),
        };

        let warnings = config.validate()?;
        Ok((config, warnings))
    }

    /// Write the default configuration to `path`, in the format implied by its extension.
    pub fn save_default(path: &Utf8Path) -> Result<()> {
        let text = match path.extension().unwrap_or_default() {
            "yml" | "yaml" => DEFAULT_CONFIG_YAML.to_string(),
            "toml" => toml::to_string_pretty(&Self::default()).into_app_err("serializing default configuration to TOML")?,
            "json" => serde_json::to_string_pretty(&Self::default()).into_app_err("serializing default configuration to JSON")?,
            other => bail!("unsupported configuration file extension: {other}"),
        };

        fs::write(path, text).into_app_err_with(|| format!("writing default configuration to {path}"))
    }

    /// Check the configuration for problems.
    ///
    /// Problems that would make the pipeline misbehave are errors; questionable but workable
    /// settings are returned as warnings.
    pub fn validate(&self) -> Result<Vec<String>> {
        let mut warnings = Vec::new();

        if self.retry.max_attempts == 0 {
            bail!("retry.max_attempts must be at least 1");
        }

        if !self.retry.backoff_factor_secs.is_finite() || self.retry.backoff_factor_secs < 0.0 {
            bail!("retry.backoff_factor_secs must be a non-negative number");
        }

        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            bail!("per_page must be between 1 and {MAX_PER_PAGE}, got {}", self.per_page);
        }

        if self.count_page_limit == 0 {
            bail!("count_page_limit must be at least 1");
        }

        if url::Url::parse(&self.api_base_url).is_err() {
            bail!("api_base_url '{}' is not a valid URL", self.api_base_url);
        }

        let pattern_sets = [
            ("patterns.documentation", &self.patterns.documentation),
            ("patterns.database", &self.patterns.database),
            ("patterns.api", &self.patterns.api),
            ("patterns.api_directories", &self.patterns.api_directories),
            ("patterns.unimportant_directories", &self.patterns.unimportant_directories),
        ];

        for (name, patterns) in pattern_sets {
            if patterns.is_empty() {
                warnings.push(format!("{name} is empty, no paths will be classified by it"));
            }

            for pattern in patterns {
                check_pattern(name, pattern)?;
            }
        }

        if self.ci_cd_tools.is_empty() {
            warnings.push("ci_cd_tools is empty, CI/CD detection is disabled".to_string());
        }

        for tool in &self.ci_cd_tools {
            check_pattern("ci_cd_tools", &tool.pattern)?;
        }

        for (database, keywords) in &self.database_keywords {
            if keywords.is_empty() {
                warnings.push(format!("database_keywords entry '{database}' has no keywords"));
            }

            if let Some(keyword) = keywords.iter().find(|k| k.chars().any(char::is_whitespace)) {
                warnings.push(format!(
                    "database_keywords entry '{database}' contains '{keyword}', which can never match a single token"
                ));
            }
        }

        for code in self.error_messages.keys() {
            if code.parse::<u16>().is_err() {
                warnings.push(format!("error_messages key '{code}' is not an HTTP status code"));
            }
        }

        check_columns("columns.users", &self.columns.users, KNOWN_USER_COLUMNS, &mut warnings);
        check_columns("columns.repos", &self.columns.repos, KNOWN_REPO_COLUMNS, &mut warnings);
        check_columns("columns.profile", &self.columns.profile, KNOWN_PROFILE_COLUMNS, &mut warnings);

        Ok(warnings)
    }

    /// The human-readable explanation for an HTTP status code.
    #[must_use]
    pub fn error_message(&self, status: u16) -> String {
        self.error_messages
            .get(&status.to_string())
            .cloned()
            .unwrap_or_else(|| format!("Error fetching data: {status}"))
    }

    /// Full path of an output file inside the output directory.
    #[must_use]
    pub fn output_path(&self, file_name: &str) -> Utf8PathBuf {
        self.output_dir.join(file_name)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub const fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

fn check_pattern(set: &str, pattern: &str) -> Result<()> {
    let _ = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .into_app_err_with(|| format!("invalid regular expression '{pattern}' in {set}"))?;
    Ok(())
}

fn check_columns(name: &str, columns: &[String], known: &[&str], warnings: &mut Vec<String>) {
    if columns.is_empty() {
        warnings.push(format!("{name} is empty, rows will have no fields"));
    }

    for column in columns {
        if !known.contains(&column.as_str()) {
            warnings.push(format!("{name} contains unknown column '{column}', it will be left blank"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_no_warnings() {
        let config = Config::default();
        let warnings = config.validate().unwrap();
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("per_page: 50\nretry:\n  max_attempts: 2\n").unwrap();
        assert_eq!(config.per_page, 50);
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.max_retry_after_secs, Config::default().retry.max_retry_after_secs);
        assert_eq!(config.patterns, Config::default().patterns);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: core::result::Result<Config, _> = serde_yaml::from_str("not_a_field: 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let mut config = Config::default();
        config.patterns.database.push("([unclosed".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("patterns.database"));
    }

    #[test]
    fn test_zero_attempts_is_error() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_column_warns() {
        let mut config = Config::default();
        config.columns.repos.push("favorite_color".to_string());
        let warnings = config.validate().unwrap();
        assert!(warnings.iter().any(|w| w.contains("favorite_color")));
    }

    #[test]
    fn test_error_message_fallback() {
        let config = Config::default();
        assert!(config.error_message(404).starts_with("[404]"));
        assert_eq!(config.error_message(418), "Error fetching data: 418");
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let base = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let (config, warnings) = Config::load(&base, None).unwrap();
        assert_eq!(config, Config::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_load_discovers_toml() {
        let dir = tempfile::tempdir().unwrap();
        let base = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        fs::write(base.join("harvest.toml"), "dependency_cap = 5\n").unwrap();
        let (config, _) = Config::load(&base, None).unwrap();
        assert_eq!(config.dependency_cap, 5);
    }

    #[test]
    fn test_save_default_round_trips_through_every_format() {
        let dir = tempfile::tempdir().unwrap();
        let base = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

        for name in ["out.yml", "out.toml", "out.json"] {
            let path = base.join(name);
            Config::save_default(&path).unwrap();
            let (config, _) = Config::load(&base, Some(&path)).unwrap();
            assert_eq!(config, Config::default(), "format {name}");
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let base = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let path = base.join("harvest.ini");
        fs::write(&path, "x").unwrap();
        assert!(Config::load(&base, Some(&path)).is_err());
    }
}
