//! Fetching and decoding single files through the contents endpoint.

use crate::Result;
use crate::facts::RepoSpec;
use crate::facts::hosting::{FileContent, GitHubClient};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ohno::app_err;
use url::Url;

const LOG_TARGET: &str = "   content";

/// Decode a contents-endpoint payload according to the transfer encoding it reports.
///
/// Supports `base64` (line breaks allowed), `hex`, and anything else as already-plain text.
/// Returns `None` when the payload is empty, cannot be decoded, or is not UTF-8.
#[must_use]
pub fn decode_content(file: &FileContent) -> Option<String> {
    let content = file.content.as_deref()?;
    let encoding = file.encoding.as_deref().unwrap_or("").to_ascii_lowercase();

    let bytes = match encoding.as_str() {
        "base64" => {
            let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            match STANDARD.decode(compact) {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "Invalid base64 file content: {e}");
                    return None;
                }
            }
        }
        "hex" => match hex::decode(content.trim()) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Invalid hex file content: {e}");
                return None;
            }
        },
        _ => return Some(content.to_string()),
    };

    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(e) => {
            log::warn!(target: LOG_TARGET, "File content is not UTF-8: {e}");
            None
        }
    }
}

/// Contents-endpoint URL of `path`, with every path segment percent-encoded.
pub fn content_url(client: &GitHubClient, spec: &RepoSpec, path: &str) -> Result<Url> {
    let mut url = client.repo_endpoint(spec, "/contents", &[])?;
    let _ = url
        .path_segments_mut()
        .map_err(|()| app_err!("cannot append '{path}' to a base URL"))?
        .extend(path.split('/').filter(|segment| !segment.is_empty()));
    Ok(url)
}

/// Fetch one file of a repository as text.
pub async fn fetch_text(client: &GitHubClient, spec: &RepoSpec, path: &str) -> Result<Option<String>> {
    let url = content_url(client, spec, path)?;
    let Some(file) = client.get::<FileContent>(&url).await? else {
        return Ok(None);
    };
    Ok(decode_content(&file))
}
