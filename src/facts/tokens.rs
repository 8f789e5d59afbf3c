//! Credential rotation across several GitHub access tokens.

use crate::Result;
use camino::Utf8Path;
use core::fmt::{Debug, Formatter};
use core::sync::atomic::{AtomicUsize, Ordering};
use ohno::{IntoAppError, bail};
use reqwest::header::HeaderValue;
use std::env;
use std::fs;

const LOG_TARGET: &str = "    tokens";

/// Environment variable holding a comma-separated list of tokens.
const TOKENS_LIST_VAR: &str = "GITHUB_TOKENS";

/// Environment variable holding a single token.
const TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Prefix of the numbered token variables (`GITHUB_ACCESS_TOKEN1`, `GITHUB_ACCESS_TOKEN2`, ...).
const NUMBERED_TOKEN_PREFIX: &str = "GITHUB_ACCESS_TOKEN";
const MAX_NUMBERED_TOKENS: usize = 9;

/// Cycles through a fixed, ordered set of access tokens.
///
/// The active index always stays within bounds. Rotation wraps around, so after as many
/// rotations as there are tokens the first token is active again.
pub struct TokenRotator {
    tokens: Vec<String>,
    current: AtomicUsize,
}

impl Debug for TokenRotator {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenRotator")
            .field("tokens", &self.tokens.len())
            .field("current", &self.current_index())
            .finish()
    }
}

impl TokenRotator {
    /// Create a rotator over the given tokens, ignoring blanks and duplicates.
    ///
    /// Fails when no usable token remains, since nothing can be collected without credentials.
    pub fn new<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for token in tokens {
            let token = token.as_ref().trim();
            if !token.is_empty() && !unique.iter().any(|t| t == token) {
                unique.push(token.to_string());
            }
        }

        if unique.is_empty() {
            bail!(
                "no GitHub access tokens configured; use --token, --tokens-file, {TOKENS_LIST_VAR}, {TOKEN_VAR}, or {NUMBERED_TOKEN_PREFIX}1..{NUMBERED_TOKEN_PREFIX}{MAX_NUMBERED_TOKENS}"
            );
        }

        log::info!(target: LOG_TARGET, "Using {} access token(s)", unique.len());

        Ok(Self {
            tokens: unique,
            current: AtomicUsize::new(0),
        })
    }

    /// Gather tokens from explicit values, an optional secrets file, and the environment, in that order.
    pub fn discover(explicit: &[String], tokens_file: Option<&Utf8Path>) -> Result<Self> {
        let mut tokens = explicit.to_vec();

        if let Some(path) = tokens_file {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading tokens file {path}"))?;
            tokens.extend(parse_tokens_file(&text));
        }

        if let Ok(list) = env::var(TOKENS_LIST_VAR) {
            tokens.extend(list.split(',').map(str::to_string));
        }

        if let Ok(token) = env::var(TOKEN_VAR) {
            tokens.push(token);
        }

        for i in 1..=MAX_NUMBERED_TOKENS {
            if let Ok(token) = env::var(format!("{NUMBERED_TOKEN_PREFIX}{i}")) {
                tokens.push(token);
            }
        }

        Self::new(tokens)
    }

    /// Number of distinct tokens being rotated.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }

    /// The token used for the next request.
    #[must_use]
    pub fn current(&self) -> &str {
        &self.tokens[self.current_index()]
    }

    /// Advance to the next token, wrapping around at the end.
    ///
    /// With a single token there is nothing to switch to; the call logs a warning and returns `false`.
    pub fn rotate(&self) -> bool {
        let len = self.tokens.len();
        if len < 2 {
            log::warn!(target: LOG_TARGET, "Rate limit reached but only one token is configured; add more tokens to keep collecting");
            return false;
        }

        let previous = self.current.load(Ordering::Relaxed);
        let next = (previous + 1) % len;
        self.current.store(next, Ordering::Relaxed);

        log::warn!(target: LOG_TARGET, "Switching from token #{} to token #{}", previous + 1, next + 1);
        true
    }

    /// The `Authorization` header value for the active token.
    pub(crate) fn authorization(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&format!("token {}", self.current()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

/// Extract tokens from a secrets file: one per line, blank lines and `#` comments ignored.
fn parse_tokens_file(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}
