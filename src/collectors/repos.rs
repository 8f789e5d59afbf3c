use super::summary::{CollectionSummary, InputWindow};
use super::track_progress;
use crate::Result;
use crate::config::Config;
use crate::facts::hosting::RepositorySummary;
use crate::facts::{GitHubClient, Progress};
use crate::reports::{CsvSink, InputRecord, RowSource};
use core::sync::atomic::Ordering;

const LOG_TARGET: &str = "     repos";

/// Login of the user described by a row of a users file: the `login` column, or the last segment of `url`.
fn login_from_record(record: &InputRecord) -> Option<String> {
    if let Some(login) = record.get("login") {
        return Some(login.to_string());
    }

    record
        .get("url")
        .and_then(|url| url.trim_end_matches('/').rsplit('/').next())
        .filter(|login| !login.is_empty())
        .map(str::to_string)
}

/// List the public repositories owned by each user and append one row per repository.
pub async fn collect_repos(
    client: &GitHubClient,
    config: &Config,
    users: Vec<InputRecord>,
    sink: &mut CsvSink,
    window: InputWindow,
    progress: &dyn Progress,
) -> Result<CollectionSummary> {
    let mut summary = CollectionSummary::new("repos");
    let users = window.apply(users);
    let done = track_progress(progress, "Listing", users.len() as u64, "users");
    let per_page = client.per_page().to_string();

    for record in users {
        let _ = done.fetch_add(1, Ordering::Relaxed);

        let Some(login) = login_from_record(&record) else {
            log::warn!(target: LOG_TARGET, "Skipping a user row without a login");
            summary.skipped += 1;
            continue;
        };

        let url = client.endpoint(
            &format!("users/{login}/repos"),
            &[("type", "owner"), ("per_page", per_page.as_str())],
        )?;

        let repos = match client.get_list::<RepositorySummary>(&url, u32::MAX).await {
            Ok(Some(repos)) => repos,
            Ok(None) => {
                summary.miss(login);
                continue;
            }
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Could not list repositories of '{login}': {e:#}");
                summary.miss(login);
                continue;
            }
        };

        log::info!(target: LOG_TARGET, "User '{login}' owns {} repositories", repos.len());
        for repo in &repos {
            sink.write(&repo.to_row(&config.columns.repos))?;
            summary.written += 1;
        }
    }

    progress.done();
    log::info!(target: LOG_TARGET, "{summary}");
    Ok(summary)
}
