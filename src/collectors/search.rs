use super::summary::{CollectionSummary, InputWindow};
use super::track_progress;
use crate::Result;
use crate::config::Config;
use crate::facts::hosting::{RepositorySummary, SearchPage, UserSummary};
use crate::facts::{GitHubClient, Progress};
use crate::reports::{CsvSink, RowSource};
use core::sync::atomic::Ordering;
use serde::de::DeserializeOwned;

const LOG_TARGET: &str = "    search";

/// Number of pages needed to cover `total_count` results, within the search window of
/// `max_results` results.
#[must_use]
pub fn search_page_count(total_count: u64, per_page: u32, max_results: u32) -> u32 {
    let per_page = u64::from(per_page.max(1));
    let covered = total_count.min(u64::from(max_results));
    u32::try_from(covered.div_ceil(per_page)).unwrap_or(u32::MAX)
}

/// Page through a search and append every item as a row.
#[expect(clippy::too_many_arguments, reason = "internal helper shared by both search stages")]
async fn collect_search<T>(
    client: &GitHubClient,
    config: &Config,
    kind: &str,
    query: &str,
    sort: Option<&str>,
    columns: &[String],
    sink: &mut CsvSink,
    window: InputWindow,
    progress: &dyn Progress,
    summary: &mut CollectionSummary,
) -> Result<()>
where
    T: DeserializeOwned + RowSource,
{
    let mut page_number = 1;
    let mut page_count = 1;
    let mut seen = 0usize;
    let mut done = None;

    while page_number <= page_count {
        let page: Option<SearchPage<T>> = match client.search(kind, query, sort, page_number).await {
            Ok(page) => page,
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Search page {page_number} for '{query}' failed: {e:#}");
                None
            }
        };

        let Some(page) = page else {
            log::warn!(target: LOG_TARGET, "Search page {page_number} for '{query}' is unavailable");
            summary.miss(format!("page {page_number}"));
            if page_number == 1 {
                break;
            }
            page_number += 1;
            continue;
        };

        if page_number == 1 {
            page_count = search_page_count(page.total_count, client.per_page(), config.max_search_results);
            log::info!(
                target: LOG_TARGET,
                "Search for {kind} '{query}' matched {} results; fetching {page_count} page(s)",
                page.total_count
            );
            done = Some(track_progress(progress, "Searching", u64::from(page_count), "pages"));
        }

        if page.incomplete_results {
            log::warn!(target: LOG_TARGET, "Search page {page_number} for '{query}' has incomplete results");
        }

        if page.items.is_empty() {
            log::debug!(target: LOG_TARGET, "Search page {page_number} is empty; stopping");
            break;
        }

        for item in page.items {
            seen += 1;
            if seen <= window.skip {
                summary.skipped += 1;
                continue;
            }

            sink.write(&item.to_row(columns))?;
            summary.written += 1;

            if window.is_full(summary.written) {
                return Ok(());
            }
        }

        if let Some(done) = &done {
            let _ = done.fetch_add(1, Ordering::Relaxed);
        }

        page_number += 1;
    }

    Ok(())
}

/// Ingest the users matching a user-search query.
pub async fn collect_users(
    client: &GitHubClient,
    config: &Config,
    query: &str,
    sink: &mut CsvSink,
    window: InputWindow,
    progress: &dyn Progress,
) -> Result<CollectionSummary> {
    let mut summary = CollectionSummary::new("users");
    collect_search::<UserSummary>(client, config, "users", query, None, &config.columns.users, sink, window, progress, &mut summary)
        .await?;
    progress.done();

    log::info!(target: LOG_TARGET, "{summary}");
    Ok(summary)
}

/// Ingest the most-starred repositories matching a repository-search query.
///
/// Regions are excluded through the query itself, e.g. `stars:>1000 -location:egypt`.
pub async fn collect_top_repos(
    client: &GitHubClient,
    config: &Config,
    query: &str,
    sink: &mut CsvSink,
    window: InputWindow,
    progress: &dyn Progress,
) -> Result<CollectionSummary> {
    let mut summary = CollectionSummary::new("top_repos");
    collect_search::<RepositorySummary>(
        client,
        config,
        "repositories",
        query,
        Some("stars"),
        &config.columns.repos,
        sink,
        window,
        progress,
        &mut summary,
    )
    .await?;
    progress.done();

    log::info!(target: LOG_TARGET, "{summary}");
    Ok(summary)
}
