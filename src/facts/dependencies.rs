use crate::Result;
use crate::facts::RepoSpec;
use crate::facts::hosting::{GitHubClient, SbomDocument};

const LOG_TARGET: &str = "      deps";

/// Flatten an SBOM into bare package names.
///
/// Ecosystem prefixes (`pip:`, `npm:`, ...) are dropped by keeping the text after the last `:`.
/// The first package describes the repository itself and is skipped. At most `cap` names are kept.
#[must_use]
pub fn flatten_sbom(document: &SbomDocument, cap: usize) -> Vec<String> {
    document
        .sbom
        .packages
        .iter()
        .filter_map(|package| package.name.as_deref())
        .map(|name| name.rsplit(':').next().unwrap_or(name).to_string())
        .skip(1)
        .take(cap)
        .collect()
}

/// Dependency names from the repository's dependency graph; empty when the graph is unavailable.
pub async fn dependencies(client: &GitHubClient, spec: &RepoSpec, cap: usize) -> Result<Vec<String>> {
    let url = client.repo_endpoint(spec, "/dependency-graph/sbom", &[])?;

    let Some(document) = client.get::<SbomDocument>(&url).await? else {
        log::debug!(target: LOG_TARGET, "No dependency graph for '{spec}'");
        return Ok(Vec::new());
    };

    let deps = flatten_sbom(&document, cap);
    log::debug!(target: LOG_TARGET, "Found {} dependencies for '{spec}'", deps.len());
    Ok(deps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(names: &[&str]) -> SbomDocument {
        let packages: Vec<serde_json::Value> = names.iter().map(|n| serde_json::json!({ "name": n })).collect();
        serde_json::from_value(serde_json::json!({ "sbom": { "packages": packages } })).unwrap()
    }

    #[test]
    fn test_root_is_skipped_and_prefixes_dropped() {
        let doc = document(&["com.github.octo/app", "pip:requests", "npm:left-pad", "actions:actions/checkout"]);
        assert_eq!(flatten_sbom(&doc, 20), ["requests", "left-pad", "actions/checkout"]);
    }

    #[test]
    fn test_cap_is_respected() {
        let names: Vec<String> = (0..30).map(|i| format!("pip:pkg{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let deps = flatten_sbom(&document(&refs), 20);
        assert_eq!(deps.len(), 20);
        assert_eq!(deps[0], "pkg1");
        assert_eq!(deps[19], "pkg20");
    }

    #[test]
    fn test_unnamed_packages_are_ignored() {
        let doc: SbomDocument =
            serde_json::from_str(r#"{ "sbom": { "packages": [ { "name": "root" }, {}, { "name": "go:x" } ] } }"#).unwrap();
        assert_eq!(flatten_sbom(&doc, 5), ["x"]);
    }

    #[test]
    fn test_empty_sbom() {
        assert!(flatten_sbom(&document(&[]), 20).is_empty());
        assert!(flatten_sbom(&document(&["root-only"]), 20).is_empty());
    }
}
