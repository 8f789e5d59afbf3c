use super::summary::{CollectionSummary, InputWindow};
use super::{repo_spec_from_record, track_progress};
use crate::Result;
use crate::config::Config;
use crate::facts::hosting::{Contributor, UserProfile};
use crate::facts::{GitHubClient, Progress, RepoSpec};
use crate::reports::{CsvSink, InputRecord, OutputRow, RowSource};
use core::sync::atomic::Ordering;
use std::collections::HashSet;

const LOG_TARGET: &str = "   contrib";

/// Whether a profile location contains `target`, ignoring case.
///
/// A blank target matches every location; a missing location matches nothing.
#[must_use]
pub fn location_matches(location: Option<&str>, target: &str) -> bool {
    let target = target.trim().to_lowercase();
    location.is_some_and(|location| location.to_lowercase().contains(&target))
}

/// Keep the contributors of each repository whose profile location contains `location`.
///
/// Every contributor is looked up once per run, even when they contribute to several repositories.
/// A matched contributor's profile, prefixed with the repository it was found in.
#[must_use]
pub fn contributor_row(spec: &RepoSpec, profile: &UserProfile, columns: &[String]) -> OutputRow {
    let mut row = OutputRow::new();
    row.push("repo_owner", spec.owner());
    row.push("repo_name", spec.repo());
    row.append(profile.to_row(columns));
    row
}

pub async fn collect_contributors(
    client: &GitHubClient,
    config: &Config,
    location: &str,
    repos: Vec<InputRecord>,
    sink: &mut CsvSink,
    window: InputWindow,
    progress: &dyn Progress,
) -> Result<CollectionSummary> {
    let mut summary = CollectionSummary::new("contributors");
    let repos = window.apply(repos);
    let done = track_progress(progress, "Filtering", repos.len() as u64, "repositories");
    let per_page = client.per_page().to_string();
    let mut seen: HashSet<String> = HashSet::new();

    for record in repos {
        let _ = done.fetch_add(1, Ordering::Relaxed);

        let Some(spec) = repo_spec_from_record(&record) else {
            log::warn!(target: LOG_TARGET, "Skipping a repository row without owner and name");
            summary.skipped += 1;
            continue;
        };

        let url = client.repo_endpoint(&spec, "/contributors", &[("per_page", per_page.as_str())])?;
        let contributors = match client.get_list::<Contributor>(&url, config.count_page_limit).await {
            Ok(Some(contributors)) => contributors,
            Ok(None) => {
                summary.miss(spec.to_string());
                continue;
            }
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Could not list contributors of '{spec}': {e:#}");
                summary.miss(spec.to_string());
                continue;
            }
        };

        for contributor in contributors {
            let Some(login) = contributor.login else {
                summary.skipped += 1;
                continue;
            };

            if !seen.insert(login.clone()) {
                summary.skipped += 1;
                continue;
            }

            let url = client.endpoint(&format!("users/{login}"), &[])?;
            let profile = match client.get::<UserProfile>(&url).await {
                Ok(Some(profile)) => profile,
                Ok(None) => {
                    summary.miss(login);
                    continue;
                }
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "Could not read the profile of '{login}': {e:#}");
                    summary.miss(login);
                    continue;
                }
            };

            if !location_matches(profile.location.as_deref(), location) {
                log::debug!(target: LOG_TARGET, "'{login}' is not located in '{location}'");
                summary.skipped += 1;
                continue;
            }

            log::info!(target: LOG_TARGET, "'{login}' of '{spec}' is located in '{location}'");
            sink.write(&contributor_row(&spec, &profile, &config.columns.profile))?;
            summary.written += 1;
        }
    }

    progress.done();
    log::info!(target: LOG_TARGET, "{summary}");
    Ok(summary)
}
