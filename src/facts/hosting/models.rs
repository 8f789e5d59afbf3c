//! Typed records for the GitHub REST endpoints the pipeline reads.
//!
//! Only the fields the pipeline consumes are declared; everything else in the payload is ignored.
//! Fields GitHub may omit or null out are `Option`s.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One page of a search endpoint (`/search/users`, `/search/repositories`).
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage<T> {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// A user as returned by search results and owner fields.
#[derive(Debug, Clone, Deserialize)]
pub struct UserSummary {
    pub login: String,
    /// API URL of the user resource.
    pub url: String,
    pub html_url: Option<String>,
    pub id: Option<u64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct License {
    pub name: Option<String>,
    pub spdx_id: Option<String>,
}

/// A repository as returned by `/users/{login}/repos`, `/repos/{owner}/{repo}`, and repository search.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    pub owner: Owner,
    pub html_url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub open_issues_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub stargazers_count: Option<u64>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub license: Option<License>,
    pub default_branch: Option<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
}

/// Kind of an entry in a contents listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

/// One entry of a `/repos/{owner}/{repo}/contents/{path}` directory listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    /// Path relative to the repository root.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// API URL listing this entry (for directories, the listing of its children).
    pub url: String,
    pub size: Option<u64>,
}

/// A single file fetched through the contents endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FileContent {
    pub content: Option<String>,
    /// Transfer encoding of `content`, usually `base64`.
    pub encoding: Option<String>,
}

/// Open/closed state shared by issues and pull requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

/// Minimal issue info; the issues endpoint also returns pull requests, flagged by `pull_request`.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub state: IssueState,
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    #[must_use]
    pub const fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub state: IssueState,
    pub merged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitSummary {
    pub sha: String,
}

/// A repository contributor. Anonymous contributors carry no login or profile URL.
#[derive(Debug, Clone, Deserialize)]
pub struct Contributor {
    pub login: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub contributions: Option<u64>,
}

/// A full user profile from `/users/{login}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub login: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub public_repos: Option<u64>,
    pub public_gists: Option<u64>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub name: String,
}

/// Response of `/repos/{owner}/{repo}/dependency-graph/sbom`.
#[derive(Debug, Clone, Deserialize)]
pub struct SbomDocument {
    pub sbom: Sbom,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sbom {
    #[serde(default)]
    pub packages: Vec<SbomPackage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SbomPackage {
    pub name: Option<String>,
}
