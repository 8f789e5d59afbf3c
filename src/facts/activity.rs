//! Repository activity counts: contributors, commits, issues, pull requests, and tags.
//!
//! Counts cover the first `max_pages` pages of each list endpoint. When the endpoint yields
//! nothing, the count is [`MISSING_COUNT`] rather than zero so that "unknown" stays distinct
//! from "none".

use crate::Result;
use crate::facts::RepoSpec;
use crate::facts::hosting::{CommitSummary, Contributor, GitHubClient, Issue, IssueState, PullRequest, Tag};
use serde::{Deserialize, Serialize};

const LOG_TARGET: &str = "  activity";

/// Sentinel stored for a count the API did not provide.
pub const MISSING_COUNT: i64 = -1;

/// Open/closed issue counts, pull requests excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCounts {
    pub open: i64,
    pub closed: i64,
}

impl IssueCounts {
    pub const MISSING: Self = Self {
        open: MISSING_COUNT,
        closed: MISSING_COUNT,
    };

    #[must_use]
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut counts = Self { open: 0, closed: 0 };
        for issue in issues.iter().filter(|i| !i.is_pull_request()) {
            match issue.state {
                IssueState::Open => counts.open += 1,
                IssueState::Closed => counts.closed += 1,
            }
        }
        counts
    }
}

/// Open/closed/merged pull request counts. A merged pull request is also closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestCounts {
    pub open: i64,
    pub closed: i64,
    pub merged: i64,
}

impl PullRequestCounts {
    pub const MISSING: Self = Self {
        open: MISSING_COUNT,
        closed: MISSING_COUNT,
        merged: MISSING_COUNT,
    };

    #[must_use]
    pub fn from_pull_requests(pulls: &[PullRequest]) -> Self {
        let mut counts = Self { open: 0, closed: 0, merged: 0 };
        for pull in pulls {
            match pull.state {
                IssueState::Open => counts.open += 1,
                IssueState::Closed => counts.closed += 1,
            }
            if pull.merged_at.is_some() {
                counts.merged += 1;
            }
        }
        counts
    }
}

fn count_of<T>(items: Option<&Vec<T>>) -> i64 {
    items.map_or(MISSING_COUNT, |items| i64::try_from(items.len()).unwrap_or(i64::MAX))
}

/// Number of contributors listed for the repository.
pub async fn contributors_count(client: &GitHubClient, spec: &RepoSpec, max_pages: u32) -> Result<i64> {
    let per_page = client.per_page().to_string();
    let url = client.repo_endpoint(spec, "/contributors", &[("per_page", per_page.as_str())])?;
    let contributors = client.get_list::<Contributor>(&url, max_pages).await?;

    let count = count_of(contributors.as_ref());
    log::debug!(target: LOG_TARGET, "Contributors count for '{spec}': {count}");
    Ok(count)
}

/// Number of commits on the default branch.
pub async fn commits_count(client: &GitHubClient, spec: &RepoSpec, max_pages: u32) -> Result<i64> {
    let per_page = client.per_page().to_string();
    let url = client.repo_endpoint(spec, "/commits", &[("per_page", per_page.as_str())])?;
    let commits = client.get_list::<CommitSummary>(&url, max_pages).await?;

    let count = count_of(commits.as_ref());
    log::debug!(target: LOG_TARGET, "Commits count for '{spec}': {count}");
    Ok(count)
}

pub async fn issue_counts(client: &GitHubClient, spec: &RepoSpec, max_pages: u32) -> Result<IssueCounts> {
    let per_page = client.per_page().to_string();
    let url = client.repo_endpoint(spec, "/issues", &[("state", "all"), ("per_page", per_page.as_str())])?;

    let counts = client
        .get_list::<Issue>(&url, max_pages)
        .await?
        .map_or(IssueCounts::MISSING, |issues| IssueCounts::from_issues(&issues));

    log::debug!(target: LOG_TARGET, "Issues for '{spec}': open {}, closed {}", counts.open, counts.closed);
    Ok(counts)
}

pub async fn pull_request_counts(client: &GitHubClient, spec: &RepoSpec, max_pages: u32) -> Result<PullRequestCounts> {
    let per_page = client.per_page().to_string();
    let url = client.repo_endpoint(spec, "/pulls", &[("state", "all"), ("per_page", per_page.as_str())])?;

    let counts = client
        .get_list::<PullRequest>(&url, max_pages)
        .await?
        .map_or(PullRequestCounts::MISSING, |pulls| PullRequestCounts::from_pull_requests(&pulls));

    log::debug!(
        target: LOG_TARGET,
        "Pull requests for '{spec}': open {}, closed {}, merged {}",
        counts.open,
        counts.closed,
        counts.merged
    );
    Ok(counts)
}

/// Tag names of the repository; empty when the listing is unavailable.
pub async fn tags(client: &GitHubClient, spec: &RepoSpec, max_pages: u32) -> Result<Vec<String>> {
    let per_page = client.per_page().to_string();
    let url = client.repo_endpoint(spec, "/tags", &[("per_page", per_page.as_str())])?;

    Ok(client
        .get_list::<Tag>(&url, max_pages)
        .await?
        .unwrap_or_default()
        .into_iter()
        .map(|tag| tag.name)
        .collect())
}
