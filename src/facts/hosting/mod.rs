mod client;
mod models;

pub use client::{ApiResult, Disposition, GitHubClient, classify_response};
pub use models::{
    CommitSummary, ContentEntry, Contributor, EntryKind, FileContent, Issue, IssueState, License, Owner, PullRequest,
    RepositorySummary, Sbom, SbomDocument, SbomPackage, SearchPage, Tag, UserProfile, UserSummary,
};
