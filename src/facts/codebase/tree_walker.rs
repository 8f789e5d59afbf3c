//! Iterative crawl of a repository's file tree through the contents endpoint.
//!
//! The walker keeps a stack of directory listings to fetch, seeded with the repository root,
//! and a set of listing URLs already fetched. Each listing is requested at most once.

use super::classifier::{FileClassification, PathClassifier};
use crate::Result;
use crate::facts::RepoSpec;
use crate::facts::hosting::{ContentEntry, EntryKind, GitHubClient};
use ohno::{EnrichableExt, bail};
use std::collections::HashSet;
use url::Url;

const LOG_TARGET: &str = "      tree";

/// Outcome of walking one repository.
#[derive(Debug, Clone, Default)]
pub struct TreeWalk {
    pub files: FileClassification,

    /// Listings taken off the work stack, including duplicates that were skipped.
    pub pops: usize,

    /// Distinct listing URLs fetched (or attempted).
    pub visited: usize,

    /// Listings that failed or were skipped as too large.
    pub skipped: usize,
}

/// Walks repository trees and classifies the files it finds.
#[derive(Debug)]
pub struct TreeWalker<'a> {
    client: &'a GitHubClient,
    classifier: &'a PathClassifier,
    large_listing_threshold: usize,
}

impl<'a> TreeWalker<'a> {
    #[must_use]
    pub const fn new(client: &'a GitHubClient, classifier: &'a PathClassifier, large_listing_threshold: usize) -> Self {
        Self {
            client,
            classifier,
            large_listing_threshold,
        }
    }

    /// Crawl the whole tree of `spec`.
    ///
    /// An unavailable subdirectory listing is logged and skipped and the walk continues until the
    /// stack is empty. Fails when the root listing is unavailable, or when a listing stays rate
    /// limited or cannot be decoded.
    pub async fn walk(&self, spec: &RepoSpec) -> Result<TreeWalk> {
        let root = self.client.repo_endpoint(spec, "/contents/", &[])?;

        let mut walk = TreeWalk::default();
        let mut visited: HashSet<String> = HashSet::new();
        let mut stack: Vec<(Url, bool)> = vec![(root, true)];

        while let Some((url, is_root)) = stack.pop() {
            walk.pops += 1;

            if !visited.insert(url.as_str().to_string()) {
                log::trace!(target: LOG_TARGET, "Already listed {url}");
                continue;
            }
            walk.visited += 1;

            let listing = self
                .client
                .get::<Vec<ContentEntry>>(&url)
                .await
                .map_err(|e| e.enrich_with(|| format!("listing {url} of '{spec}'")))?;

            let Some(entries) = listing else {
                if is_root {
                    bail!("repository '{spec}' is unavailable");
                }
                log::warn!(target: LOG_TARGET, "Could not list {url} for '{spec}'");
                walk.skipped += 1;
                continue;
            };

            if !is_root && entries.len() > self.large_listing_threshold {
                log::info!(
                    target: LOG_TARGET,
                    "Skipping {url} in '{spec}': {} entries exceeds the limit of {}",
                    entries.len(),
                    self.large_listing_threshold
                );
                walk.skipped += 1;
                continue;
            }

            log::debug!(target: LOG_TARGET, "Listed {} entries at {url}", entries.len());

            for entry in entries {
                match entry.kind {
                    EntryKind::File => self.visit_file(&mut walk.files, &entry.path),
                    EntryKind::Dir => {
                        if let Some(child) = self.visit_dir(&mut walk.files, &entry) {
                            stack.push((child, false));
                        }
                    }
                    EntryKind::Symlink | EntryKind::Submodule | EntryKind::Other => {}
                }
            }
        }

        log::info!(
            target: LOG_TARGET,
            "Walked '{spec}': {} listings, {} skipped, {} classified files",
            walk.visited,
            walk.skipped,
            walk.files.len()
        );

        Ok(walk)
    }

    fn visit_file(&self, files: &mut FileClassification, path: &str) {
        if let Some(category) = self.classifier.classify_file(path) {
            log::debug!(target: LOG_TARGET, "Found {category} file {path}");
            let _ = files.insert(category, path);
        }
    }

    /// Record API directories and decide whether a directory gets listed.
    fn visit_dir(&self, files: &mut FileClassification, entry: &ContentEntry) -> Option<Url> {
        if self.classifier.is_api_directory(&entry.path) {
            log::debug!(target: LOG_TARGET, "Found API directory {}", entry.path);
            let _ = files.api_files.insert(entry.path.clone());
        }

        if self.classifier.is_unimportant_directory(&entry.path) {
            log::trace!(target: LOG_TARGET, "Pruning {}", entry.path);
            return None;
        }

        match Url::parse(&entry.url) {
            Ok(url) => Some(url),
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Ignoring directory {} with bad listing URL '{}': {e}", entry.path, entry.url);
                None
            }
        }
    }
}
