//! Resilient HTTP GET using retry and timeout middleware.
//!
//! Wraps each request with [`seatbelt`] retry and timeout middleware. Transient failures (network
//! errors, 5xx gateway/server errors, 429) are retried with exponential backoff up to the
//! configured number of attempts. A server-supplied `Retry-After` replaces the computed backoff.
//! Whatever the last attempt produced is handed back to the caller for classification.

use crate::config::RetrySettings;
use core::time::Duration;
use layered::{Execute, Service, Stack};
use ohno::app_err;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Response, StatusCode};
use seatbelt::retry::{Backoff, Retry};
use seatbelt::timeout::Timeout;
use seatbelt::{RecoveryInfo, ResilienceContext};
use tick::Clock;
use url::Url;

const LOG_TARGET: &str = "      http";

/// Status codes that signal a transient condition worth another attempt.
const RETRYABLE_STATUSES: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How many times to try a request, how long to wait in between, and how long one try may take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_retry_after: Duration,
    timeout: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration, max_retry_after: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_retry_after,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Bound the duration of each individual attempt.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Retries on top of the original request.
    #[must_use]
    pub const fn max_retry_attempts(&self) -> u32 {
        self.max_attempts - 1
    }

    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        self.base_delay
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self::new(
            settings.max_attempts,
            Duration::from_secs_f64(settings.backoff_factor_secs),
            Duration::from_secs(settings.max_retry_after_secs),
        )
    }
}

/// Parse the `Retry-After` header value as seconds.
fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    let s = headers.get(RETRY_AFTER).and_then(|h| h.to_str().ok())?;
    s.trim().parse::<u64>().ok()
}

/// Whether a finished attempt should be repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recovery {
    Never,
    Backoff,
    After(Duration),
}

fn recovery_for(result: &crate::Result<Response>, max_retry_after: Duration) -> Recovery {
    let capped = |secs: u64| Recovery::After(Duration::from_secs(secs).min(max_retry_after));

    match result {
        // Network / connection errors are always transient.
        Err(_) => Recovery::Backoff,

        Ok(resp) if RETRYABLE_STATUSES.contains(&resp.status()) => {
            parse_retry_after(resp.headers()).map_or(Recovery::Backoff, capped)
        }

        // Secondary rate limit (403 with Retry-After) - wait the requested duration and retry.
        Ok(resp) if resp.status() == StatusCode::FORBIDDEN => parse_retry_after(resp.headers()).map_or(Recovery::Never, capped),

        // Everything else (success, other 4xx client errors) is not retried.
        Ok(_) => Recovery::Never,
    }
}

/// Classify an HTTP response for retry purposes.
fn should_retry_response(result: &crate::Result<Response>, max_retry_after: Duration) -> RecoveryInfo {
    match recovery_for(result, max_retry_after) {
        Recovery::Never => RecoveryInfo::never(),
        Recovery::Backoff => RecoveryInfo::retry(),
        Recovery::After(delay) => RecoveryInfo::retry().delay(delay),
    }
}

/// Send an HTTP GET request with automatic retry and timeout.
///
/// Returns the response of the last attempt, which may still carry an error status, or the
/// transport error if the last attempt never reached the server.
pub async fn resilient_get(client: &reqwest::Client, url: &Url, headers: &HeaderMap, policy: &RetryPolicy) -> crate::Result<Response> {
    let clock = Clock::new_tokio();
    let context = ResilienceContext::new(&clock).name("github_get");
    let max_retry_after = policy.max_retry_after;

    let client = client.clone();
    let headers = headers.clone();
    let service = (
        Retry::layer("retry", &context)
            .clone_input()
            .recovery_with(move |result: &crate::Result<Response>, _| should_retry_response(result, max_retry_after))
            .max_retry_attempts(policy.max_retry_attempts())
            .base_delay(policy.base_delay())
            .backoff(Backoff::Exponential)
            .on_retry(|_output, args| {
                log::debug!(
                    target: LOG_TARGET,
                    "Retrying HTTP GET (attempt {}, delay {}ms)",
                    args.attempt().index() + 1,
                    args.retry_delay().as_millis(),
                );
            }),
        Timeout::layer("timeout", &context)
            .timeout_error(|_| app_err!("HTTP request timed out"))
            .timeout(policy.timeout()),
        Execute::new(move |url: String| {
            let client = client.clone();
            let headers = headers.clone();
            async move { client.get(&url).headers(headers).send().await.map_err(ohno::AppError::from) }
        }),
    )
        .into_service();

    service.execute(url.to_string()).await
}
