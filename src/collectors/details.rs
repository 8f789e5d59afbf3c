use super::summary::{CollectionSummary, InputWindow};
use super::{repo_spec_from_record, track_progress};
use crate::Result;
use crate::config::Config;
use crate::facts::activity::{self, IssueCounts, PullRequestCounts};
use crate::facts::ci_cd::detect_ci_cd;
use crate::facts::database::DatabaseDetector;
use crate::facts::{FileClassification, GitHubClient, PathClassifier, Progress, RepoSpec, TreeWalker, dependencies, documentation};
use crate::reports::{CsvSink, InputRecord, OutputRow};
use core::sync::atomic::Ordering;
use ohno::EnrichableExt;

const LOG_TARGET: &str = "   details";

/// Repository metadata carried over from the repositories file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoMetadata {
    pub description: Option<String>,
    pub topics: Vec<String>,
    pub language: Option<String>,
}

impl RepoMetadata {
    #[must_use]
    pub fn from_record(record: &InputRecord) -> Self {
        Self {
            description: record.get("repo_description").map(str::to_string),
            topics: record
                .get("topics")
                .map(|t| t.split(',').map(str::trim).filter(|t| !t.is_empty()).map(str::to_string).collect())
                .unwrap_or_default(),
            language: record.get("language").map(str::to_string),
        }
    }
}

/// Everything extracted about one repository.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoDetails {
    pub spec: RepoSpec,
    pub files: FileClassification,
    pub tags: Vec<String>,
    pub dependencies: Vec<String>,
    pub issues: IssueCounts,
    pub pull_requests: PullRequestCounts,
    pub commits_count: i64,
    pub contributors_count: i64,
    pub ci_cd_tools: Vec<String>,
    pub database_types: Vec<String>,
    pub doc_score: u8,
}

impl RepoDetails {
    #[must_use]
    pub fn to_row(&self) -> OutputRow {
        let mut row = OutputRow::new();
        row.push("owner", self.spec.owner());
        row.push("repo_name", self.spec.repo());
        row.push_json("doc_files", &self.files.doc_files);
        row.push_json("db_files", &self.files.db_files);
        row.push_json("cicd_files", &self.files.cicd_files);
        row.push_json("api_files", &self.files.api_files);
        row.push_json("tags", &self.tags);
        row.push_json("dependencies", &self.dependencies);
        row.push_json("issues", &self.issues);
        row.push_json("pull_requests", &self.pull_requests);
        row.push("commits_count", self.commits_count.to_string());
        row.push("contributors_count", self.contributors_count.to_string());
        row.push("ci_cd_tool", self.ci_cd_tools.join(", "));
        row.push_json("database_types", &self.database_types);
        row.push("doc_score", self.doc_score.to_string());
        row
    }
}

/// Runs the tree walker and every field extractor against repositories.
#[derive(Debug)]
pub struct DetailsExtractor<'a> {
    client: &'a GitHubClient,
    config: &'a Config,
    classifier: PathClassifier,
    databases: DatabaseDetector,
}

impl<'a> DetailsExtractor<'a> {
    pub fn new(client: &'a GitHubClient, config: &'a Config) -> Result<Self> {
        Ok(Self {
            client,
            config,
            classifier: PathClassifier::from_config(config)?,
            databases: DatabaseDetector::from_config(config),
        })
    }

    pub async fn extract(&self, spec: &RepoSpec, metadata: &RepoMetadata) -> Result<RepoDetails> {
        let client = self.client;
        let pages = self.config.count_page_limit;

        let walk = TreeWalker::new(client, &self.classifier, self.config.large_listing_threshold)
            .walk(spec)
            .await?;
        let files = walk.files;

        let tags = activity::tags(client, spec, pages).await?;
        let dependencies = dependencies::dependencies(client, spec, self.config.dependency_cap).await?;
        let issues = activity::issue_counts(client, spec, pages).await?;
        let pull_requests = activity::pull_request_counts(client, spec, pages).await?;
        let commits_count = activity::commits_count(client, spec, pages).await?;
        let contributors_count = activity::contributors_count(client, spec, pages).await?;
        let ci_cd_tools = detect_ci_cd(&self.classifier, &files);

        let databases = self
            .databases
            .detect(
                client,
                spec,
                &metadata.topics,
                metadata.description.as_deref(),
                metadata.language.as_deref(),
                &files.db_files,
            )
            .await?;

        let doc_score = documentation::assess(client, spec, &files, metadata.description.as_deref(), &metadata.topics).await?;

        Ok(RepoDetails {
            spec: spec.clone(),
            files,
            tags,
            dependencies,
            issues,
            pull_requests,
            commits_count,
            contributors_count,
            ci_cd_tools,
            database_types: databases.all().into_iter().collect(),
            doc_score,
        })
    }
}

/// Extract details for each repository and append one row per repository.
///
/// A repository that is unavailable, or stays rate limited, is recorded as missed and gets no row.
pub async fn collect_details(
    client: &GitHubClient,
    config: &Config,
    repos: Vec<InputRecord>,
    sink: &mut CsvSink,
    window: InputWindow,
    progress: &dyn Progress,
) -> Result<CollectionSummary> {
    let extractor = DetailsExtractor::new(client, config)?;
    let mut summary = CollectionSummary::new("details");
    let repos = window.apply(repos);
    let done = track_progress(progress, "Extracting", repos.len() as u64, "repositories");

    for record in repos {
        let _ = done.fetch_add(1, Ordering::Relaxed);

        let Some(spec) = repo_spec_from_record(&record) else {
            log::warn!(target: LOG_TARGET, "Skipping a repository row without owner and name");
            summary.skipped += 1;
            continue;
        };

        log::info!(target: LOG_TARGET, "Extracting details of '{spec}'");
        match extractor.extract(&spec, &RepoMetadata::from_record(&record)).await {
            Ok(details) => {
                sink.write(&details.to_row())?;
                summary.written += 1;
            }
            Err(e) => {
                let e = e.enrich_with(|| format!("extracting details of '{spec}'"));
                log::warn!(target: LOG_TARGET, "{e:#}");
                summary.miss(spec.to_string());
            }
        }
    }

    progress.done();
    log::info!(target: LOG_TARGET, "{summary}");
    Ok(summary)
}
