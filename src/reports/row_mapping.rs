//! Mapping API records onto configured output columns.

use super::OutputRow;
use crate::facts::hosting::{RepositorySummary, UserProfile, UserSummary};
use chrono::{DateTime, SecondsFormat, Utc};

/// A record that can fill named output columns.
pub trait RowSource {
    /// Text value for `column`, or `None` when this record does not know the column.
    fn field(&self, column: &str) -> Option<String>;

    /// Build a row with exactly `columns`, in order. Unknown or missing values are left blank.
    fn to_row(&self, columns: &[String]) -> OutputRow {
        let mut row = OutputRow::new();
        for column in columns {
            row.push(column.as_str(), self.field(column).unwrap_or_default());
        }
        row
    }
}

fn opt_text(value: Option<&String>) -> String {
    value.cloned().unwrap_or_default()
}

fn opt_number(value: Option<u64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}

fn opt_time(value: Option<DateTime<Utc>>) -> String {
    value.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)).unwrap_or_default()
}

/// Language label stored for a repository. Notebooks are reported as the language they run.
#[must_use]
pub fn normalize_language(language: &str) -> &str {
    if language == "Jupyter Notebook" { "Python" } else { language }
}

impl RowSource for UserSummary {
    fn field(&self, column: &str) -> Option<String> {
        Some(match column {
            "login" => self.login.clone(),
            "url" => self.url.clone(),
            "html_url" => opt_text(self.html_url.as_ref()),
            "id" => opt_number(self.id),
            "type" => opt_text(self.kind.as_ref()),
            _ => return None,
        })
    }
}

impl RowSource for RepositorySummary {
    fn field(&self, column: &str) -> Option<String> {
        Some(match column {
            "owner" => self.owner.login.clone(),
            "repo_name" => self.name.clone(),
            "repo_html_url" => self.html_url.clone(),
            "language" => self.language.as_deref().map(normalize_language).unwrap_or_default().to_string(),
            "topics" => self.topics.join(", "),
            "repo_description" => opt_text(self.description.as_ref()),
            "open_issues_count" => opt_number(self.open_issues_count),
            "forks_count" => opt_number(self.forks_count),
            "stargazers_count" => opt_number(self.stargazers_count),
            "last_repo_commit_date" | "updated_at" => opt_time(self.updated_at),
            "pushed_at" => opt_time(self.pushed_at),
            "license" => self.license.as_ref().and_then(|l| l.name.clone()).unwrap_or_default(),
            "created_at" => opt_time(self.created_at),
            "default_branch" => opt_text(self.default_branch.as_ref()),
            "fork" => self.fork.to_string(),
            "archived" => self.archived.to_string(),
            _ => return None,
        })
    }
}

impl RowSource for UserProfile {
    fn field(&self, column: &str) -> Option<String> {
        Some(match column {
            "login" => self.login.clone(),
            "name" => opt_text(self.name.as_ref()),
            "location" => opt_text(self.location.as_ref()),
            "email" => opt_text(self.email.as_ref()),
            "bio" => opt_text(self.bio.as_ref()),
            "company" => opt_text(self.company.as_ref()),
            "blog" => opt_text(self.blog.as_ref()),
            "public_repos" => opt_number(self.public_repos),
            "public_gists" => opt_number(self.public_gists),
            "followers" => opt_number(self.followers),
            "following" => opt_number(self.following),
            "created_at" => opt_time(self.created_at),
            "updated_at" => opt_time(self.updated_at),
            _ => return None,
        })
    }
}
