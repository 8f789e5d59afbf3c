//! Collection stages
//!
//! Each stage drives the extractors across a batch of targets and appends one row per entity to
//! its output file:
//! - [`collect_users`] ingests paginated user search results.
//! - [`collect_repos`] lists the repositories of each previously collected user.
//! - [`collect_top_repos`] ingests the most-starred repositories matching a search query.
//! - [`collect_contributors`] keeps the contributors of each repository whose profile location
//!   matches a target string.
//! - [`collect_details`] walks each repository's tree and runs every field extractor on it.
//!
//! A failing item is logged, recorded in the stage's [`CollectionSummary`], and skipped; the batch
//! always continues. Only output-file errors stop a stage.

mod contributors;
mod details;
mod repos;
mod search;
mod summary;

pub use contributors::{collect_contributors, location_matches};
pub use details::collect_details;
pub use repos::collect_repos;
pub use search::{collect_top_repos, collect_users, search_page_count};
pub use summary::{CollectionSummary, InputWindow};

use crate::facts::{Progress, RepoSpec};
use crate::reports::InputRecord;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use url::Url;

/// Identify the repository described by a row of a repositories file.
///
/// Uses the `owner` and `repo_name` columns, falling back to `repo_html_url`.
pub fn repo_spec_from_record(record: &InputRecord) -> Option<RepoSpec> {
    if let (Some(owner), Some(repo)) = (record.get("owner"), record.get("repo_name"))
        && let Ok(spec) = RepoSpec::new(owner, repo)
    {
        return Some(spec);
    }

    let url = Url::parse(record.get("repo_html_url")?).ok()?;
    RepoSpec::parse(&url).ok()
}

/// Shared counter driving a determinate progress display.
fn track_progress(progress: &dyn Progress, phase: &str, total: u64, noun: &'static str) -> Arc<AtomicU64> {
    let done = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&done);

    progress.set_phase(phase);
    progress.set_determinate(Box::new(move || {
        let current = counter.load(Ordering::Relaxed);
        (total, current, format!("{current}/{total} {noun}"))
    }));

    done
}
