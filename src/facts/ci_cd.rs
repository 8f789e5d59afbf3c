use crate::facts::codebase::{FileClassification, PathClassifier};

/// Marker recorded for repositories without any recognized CI/CD configuration.
pub const NO_CI_CD: &str = "No CI/CD";

/// Names of the CI/CD tools configured in a repository, in tool-table order.
///
/// Returns a single [`NO_CI_CD`] entry when none of the discovered CI/CD files maps to a tool.
#[must_use]
pub fn detect_ci_cd(classifier: &PathClassifier, files: &FileClassification) -> Vec<String> {
    let tools = classifier.ci_cd_tools(&files.cicd_files);
    if tools.is_empty() { vec![NO_CI_CD.to_string()] } else { tools }
}
