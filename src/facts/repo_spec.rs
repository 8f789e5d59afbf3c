use crate::Result;
use core::fmt::{Display, Formatter};
use ohno::bail;
use std::sync::Arc;
use url::Url;

/// Identifies one repository: its owner and name.
///
/// Built per repository and discarded once the repository has been processed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSpec {
    owner: Arc<str>,
    repo: Arc<str>,
}

impl RepoSpec {
    pub fn new(owner: &str, repo: &str) -> Result<Self> {
        let owner = owner.trim();
        let repo = repo.trim().trim_end_matches(".git");

        if owner.is_empty() || repo.is_empty() {
            bail!("invalid repository: empty owner or repo name ('{owner}/{repo}')");
        }

        if owner.contains('/') || repo.contains('/') {
            bail!("invalid repository: owner and name must not contain '/' ('{owner}/{repo}')");
        }

        Ok(Self {
            owner: Arc::from(owner),
            repo: Arc::from(repo),
        })
    }

    /// Parse a repository web URL such as `https://github.com/owner/repo/tree/main`.
    pub fn parse(url: &Url) -> Result<Self> {
        let path_segments: Vec<_> = url.path_segments().map(Iterator::collect).unwrap_or_default();

        let [owner, repo, ..] = path_segments.as_slice() else {
            bail!("invalid repository URL format: {url}");
        };

        Self::new(owner, repo)
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// API path of this repository, optionally extended with a sub-resource such as `/tags`.
    #[must_use]
    pub fn api_path(&self, tail: &str) -> String {
        format!("repos/{}/{}{tail}", self.owner, self.repo)
    }
}

impl Display for RepoSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
