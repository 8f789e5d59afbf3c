//! Documentation quality score.
//!
//! | Signal                                   | Points |
//! |------------------------------------------|--------|
//! | description or topics present            | 1      |
//! | any API documentation file or directory  | 3      |
//! | any documentation file                   | 1      |
//! | README heading on contributing           | 1      |
//! | README heading on getting started        | 1      |
//! | README heading on tutorials or examples  | 1      |
//!
//! A repository with no classified files at all scores 0.

use crate::Result;
use crate::facts::RepoSpec;
use crate::facts::codebase::FileClassification;
use crate::facts::file_content::fetch_text;
use crate::facts::hosting::GitHubClient;
use regex::Regex;
use std::sync::LazyLock;

const LOG_TARGET: &str = "      docs";

pub const MAX_DOC_SCORE: u8 = 8;

const METADATA_POINTS: u8 = 1;
const API_DOC_POINTS: u8 = 3;
const DOC_FILE_POINTS: u8 = 1;

// Markdown ATX headings, setext headings and HTML <h1>..<h6> all count as headings.
static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]{0,3}#{1,6}[ \t]+(.+)$|(?m)^(.+?)\r?\n[ \t]{0,3}(?:=+|-+)[ \t]*\r?$|(?i)<h[1-6][^>]*>(.*?)</h[1-6]>").expect("invalid regex")
});

static CONTRIBUTING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)contribut").expect("invalid regex"));

static GETTING_STARTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)getting[ _-]?started|quick[ _-]?start|install|setup|set[ _-]up|usage|how[ _-]to[ _-](run|use)|running")
        .expect("invalid regex")
});

static TUTORIALS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)tutorial|example|demo|walkthrough").expect("invalid regex"));

/// Which README sections were found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadmeSections {
    pub contributing: bool,
    pub getting_started: bool,
    pub tutorials: bool,
}

impl ReadmeSections {
    /// Scan the headings of a README.
    #[must_use]
    pub fn scan(readme: &str) -> Self {
        let mut sections = Self::default();
        for caps in HEADING.captures_iter(readme) {
            let Some(heading) = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)) else {
                continue;
            };
            let heading = heading.as_str();
            sections.contributing |= CONTRIBUTING.is_match(heading);
            sections.getting_started |= GETTING_STARTED.is_match(heading);
            sections.tutorials |= TUTORIALS.is_match(heading);
        }
        sections
    }

    #[must_use]
    pub fn points(self) -> u8 {
        u8::from(self.contributing) + u8::from(self.getting_started) + u8::from(self.tutorials)
    }
}

/// Score documentation from already-gathered inputs.
#[must_use]
pub fn score(files: &FileClassification, has_metadata: bool, readme: ReadmeSections) -> u8 {
    if files.is_empty() {
        return 0;
    }

    let mut total = readme.points();
    if has_metadata {
        total += METADATA_POINTS;
    }
    if !files.api_files.is_empty() {
        total += API_DOC_POINTS;
    }
    if !files.doc_files.is_empty() {
        total += DOC_FILE_POINTS;
    }

    total.min(MAX_DOC_SCORE)
}

/// The README among the documentation files, preferring the shallowest one.
fn find_readme(files: &FileClassification) -> Option<&String> {
    files
        .doc_files
        .iter()
        .filter(|path| {
            let name = path.rsplit('/').next().unwrap_or(path).to_ascii_lowercase();
            name == "readme" || name.starts_with("readme.")
        })
        .min_by_key(|path| path.matches('/').count())
}

/// Compute the documentation score of a repository, fetching its README when one was found.
pub async fn assess(
    client: &GitHubClient,
    spec: &RepoSpec,
    files: &FileClassification,
    description: Option<&str>,
    topics: &[String],
) -> Result<u8> {
    if files.is_empty() {
        log::info!(target: LOG_TARGET, "Repository '{spec}' has no classified files; score 0");
        return Ok(0);
    }

    let readme = match find_readme(files) {
        Some(path) => match fetch_text(client, spec, path).await? {
            Some(text) => ReadmeSections::scan(&text),
            None => {
                log::warn!(target: LOG_TARGET, "Could not read {path} for '{spec}'");
                ReadmeSections::default()
            }
        },
        None => ReadmeSections::default(),
    };

    let has_metadata = description.is_some_and(|d| !d.trim().is_empty()) || !topics.is_empty();
    let total = score(files, has_metadata, readme);

    log::info!(target: LOG_TARGET, "Documentation score for '{spec}': {total}");
    Ok(total)
}
