//! GitHub API client
//!
//! Every request goes through the same path: optional pacing delay, resilient GET with the
//! active token, then classification of the final response. Ordinary API failures surface as
//! absence (`Ok(None)`) so that callers can skip the resource and move on. A rate limit that
//! survives one re-issue with the next token, and payloads that cannot be decoded, are errors.

use super::models::SearchPage;
use crate::Result;
use crate::config::Config;
use crate::facts::RepoSpec;
use crate::facts::resilient_http::{RetryPolicy, resilient_get};
use crate::facts::tokens::TokenRotator;
use chrono::{DateTime, Utc};
use core::time::Duration;
use ohno::{EnrichableExt, IntoAppError, app_err};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;
use url::Url;

const LOG_TARGET: &str = "   hosting";
const GITHUB_JSON: &str = "application/vnd.github+json";

/// What the rate-limit/error handler decided about a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The body carries the requested payload.
    Payload,

    /// The active token is exhausted until the limit resets; switch tokens and try again later.
    RetryLater(Duration),

    /// The resource is unavailable for this request; treat it as missing.
    Absent,
}

/// Result of a GitHub API call
#[derive(Debug)]
pub enum ApiResult<T> {
    /// Request succeeded
    Success(T),

    /// Rate limited until the limit resets; `rotated` tells whether another token is now active
    RateLimited { reset_in: Duration, rotated: bool },

    /// The server answered with a status that means "no data" for this resource
    Absent(StatusCode),

    /// The request never produced a usable response (network failure after all retries)
    Failed(ohno::AppError),
}

/// Classify a response by status and headers.
///
/// 200 is a payload. 403 and 429 are rate limits when `x-ratelimit-reset` lies in the future.
/// Everything else is absence.
#[must_use]
pub fn classify_response(status: StatusCode, headers: &HeaderMap, now: DateTime<Utc>) -> Disposition {
    if status == StatusCode::OK {
        return Disposition::Payload;
    }

    if matches!(status, StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS)
        && let Some(reset_in) = seconds_until_reset(headers, now)
    {
        return Disposition::RetryLater(reset_in);
    }

    Disposition::Absent
}

/// Seconds until the rate limit resets, if the reset lies in the future.
fn seconds_until_reset(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    let reset_timestamp = headers.get("x-ratelimit-reset")?.to_str().ok()?.trim().parse::<i64>().ok()?;
    let remaining = reset_timestamp - now.timestamp();
    u64::try_from(remaining).ok().filter(|&secs| secs > 0).map(Duration::from_secs)
}

/// Extract the `rel="next"` target from a `Link` header.
fn next_page_url(headers: &HeaderMap) -> Option<Url> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        if !params.split(';').any(|p| p.trim() == r#"rel="next""#) {
            return None;
        }
        let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        Url::parse(target).ok()
    })
}

/// GitHub REST API client shared by every extractor and collector.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenRotator>,
    retry: RetryPolicy,
    request_delay: Duration,
    per_page: u32,
    error_messages: BTreeMap<String, String>,
}

impl GitHubClient {
    pub fn new(config: &Config, tokens: Arc<TokenRotator>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()
            .into_app_err("unable to create HTTP client")?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            tokens,
            retry: RetryPolicy::from(&config.retry).with_timeout(config.request_timeout()),
            request_delay: config.request_delay(),
            per_page: config.per_page,
            error_messages: config.error_messages.clone(),
        })
    }

    /// The token rotator used to authenticate requests.
    #[must_use]
    pub fn tokens(&self) -> &TokenRotator {
        &self.tokens
    }

    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Build an API URL from a path relative to the API root plus query parameters.
    pub fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, path.trim_start_matches('/')))
            .into_app_err_with(|| format!("building API URL for '{path}'"))?;

        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                let _ = pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// API URL of a repository sub-resource, e.g. `repo_endpoint(spec, "/tags", &[])`.
    pub fn repo_endpoint(&self, spec: &RepoSpec, tail: &str, params: &[(&str, &str)]) -> Result<Url> {
        self.endpoint(&spec.api_path(tail), params)
    }

    /// Issue a GET and classify the outcome.
    ///
    /// A rate-limited response rotates to the next token before returning; the call itself never sleeps
    /// waiting for the limit to reset.
    pub async fn api_call(&self, url: &Url) -> ApiResult<reqwest::Response> {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        let mut headers = HeaderMap::new();
        match self.tokens.authorization() {
            Ok(value) => {
                let _ = headers.insert(AUTHORIZATION, value);
            }
            Err(e) => return ApiResult::Failed(e.enrich_with(|| "building authorization header".to_string())),
        }

        let resp = match resilient_get(&self.http, url, &headers, &self.retry).await {
            Ok(r) => r,
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Request to {url} failed: {e}");
                return ApiResult::Failed(e);
            }
        };

        let status = resp.status();
        match classify_response(status, resp.headers(), Utc::now()) {
            Disposition::Payload => ApiResult::Success(resp),
            Disposition::RetryLater(reset_in) => {
                log::warn!(
                    target: LOG_TARGET,
                    "Rate limit exceeded for {url}; limit resets in {}s",
                    reset_in.as_secs()
                );
                let rotated = self.tokens.rotate();
                ApiResult::RateLimited { reset_in, rotated }
            }
            Disposition::Absent => {
                log::warn!(target: LOG_TARGET, "{} ({url})", self.error_message(status));
                ApiResult::Absent(status)
            }
        }
    }

    /// Fetch and decode a JSON document.
    ///
    /// Returns `Ok(None)` when the API had nothing to give (error status, network failure).
    /// Returns an error when the request stays rate limited or a successful response cannot be
    /// decoded as `T`.
    pub async fn get<T: DeserializeOwned>(&self, url: &Url) -> Result<Option<T>> {
        Ok(self.get_page(url).await?.map(|(data, _)| data))
    }

    /// Like [`Self::get`], but also returns the URL of the next page when the response is paginated.
    ///
    /// A rate-limited request is re-issued once when the limit caused a switch to another token.
    pub async fn get_page<T: DeserializeOwned>(&self, url: &Url) -> Result<Option<(T, Option<Url>)>> {
        let mut reissued = false;
        let resp = loop {
            match self.api_call(url).await {
                ApiResult::Success(resp) => break resp,
                ApiResult::RateLimited { rotated: true, .. } if !reissued => {
                    log::info!(target: LOG_TARGET, "Re-issuing {url} with the next token");
                    reissued = true;
                }
                ApiResult::RateLimited { reset_in, .. } => {
                    return Err(app_err!("rate limit exceeded for {url}; retry in {}s", reset_in.as_secs()));
                }
                ApiResult::Absent(_) | ApiResult::Failed(_) => return Ok(None),
            }
        };

        let next = next_page_url(resp.headers());
        let data = resp
            .json::<T>()
            .await
            .into_app_err_with(|| format!("decoding response from {url}"))?;

        Ok(Some((data, next)))
    }

    /// Fetch up to `max_pages` pages of a list endpoint by following `Link: rel="next"`.
    ///
    /// Absence on the first page is absence overall; absence on a later page keeps what was gathered.
    pub async fn get_list<T: DeserializeOwned>(&self, url: &Url, max_pages: u32) -> Result<Option<Vec<T>>> {
        let Some((mut items, mut next)) = self.get_page::<Vec<T>>(url).await? else {
            return Ok(None);
        };

        let mut pages = 1;
        while pages < max_pages
            && let Some(next_url) = next.take()
        {
            match self.get_page::<Vec<T>>(&next_url).await? {
                Some((more, following)) => {
                    items.extend(more);
                    next = following;
                    pages += 1;
                }
                None => {
                    log::debug!(target: LOG_TARGET, "Stopping pagination at {next_url}");
                    break;
                }
            }
        }

        Ok(Some(items))
    }

    /// Fetch one page of a search endpoint, optionally sorted in descending order of `sort`.
    pub async fn search<T: DeserializeOwned>(
        &self,
        kind: &str,
        query: &str,
        sort: Option<&str>,
        page: u32,
    ) -> Result<Option<SearchPage<T>>> {
        let per_page = self.per_page.to_string();
        let page = page.to_string();

        let mut params = vec![("q", query), ("per_page", per_page.as_str()), ("page", page.as_str())];
        if let Some(sort) = sort {
            params.push(("sort", sort));
            params.push(("order", "desc"));
        }

        let url = self.endpoint(&format!("search/{kind}"), &params)?;
        self.get(&url).await
    }

    /// The human-readable explanation for an HTTP status code.
    fn error_message(&self, status: StatusCode) -> String {
        let code = status.as_u16();
        self.error_messages
            .get(&code.to_string())
            .cloned()
            .unwrap_or_else(|| format!("Error fetching data: {code}"))
    }
}
