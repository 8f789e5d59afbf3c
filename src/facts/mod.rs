//! Data collection from the GitHub REST API
//!
//! This module holds everything that talks to GitHub and turns its responses into facts about
//! users and repositories.
//!
//! # Implementation Model
//!
//! The access layer is built bottom-up:
//! - [`TokenRotator`] owns the access tokens and the index of the active one.
//! - [`resilient_http`] retries transient failures (network errors, 429, 5xx) with exponential backoff.
//! - [`GitHubClient`] attaches the active token, classifies each final response, rotates tokens on
//!   rate limits and re-issues once, and reports ordinary API failures as absence rather than errors.
//!
//! On top of the client sit independent, read-only extractors:
//! - [`TreeWalker`] crawls a repository's contents endpoint and classifies files with a [`PathClassifier`].
//! - [`activity`] counts contributors, commits, issues and pull requests, and lists tags.
//! - [`dependencies`] flattens the repository's SBOM.
//! - [`ci_cd`] maps CI/CD files to tool names.
//! - [`database`] detects database technologies from metadata and file contents.
//! - [`documentation`] scores documentation quality.

pub mod activity;
pub mod ci_cd;
pub mod codebase;
pub mod database;
pub mod dependencies;
pub mod documentation;
pub mod file_content;
pub mod hosting;
mod progress;
mod repo_spec;
pub mod resilient_http;
mod tokens;

pub use codebase::{FileCategory, FileClassification, PathClassifier, TreeWalk, TreeWalker};
pub use hosting::GitHubClient;
pub use progress::{NoProgress, Progress};
pub use repo_spec::RepoSpec;
pub use tokens::TokenRotator;
