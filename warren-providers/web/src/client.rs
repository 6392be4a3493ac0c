//! Shared blocking HTTP plumbing for the web providers.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use url::Url;

use warren_core::{FetchError, ResolutionError};

use crate::errors::WebProviderError;

const DEFAULT_BASE: &str = "https://www.youtube.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("warren/", env!("CARGO_PKG_VERSION"));

/// Configuration shared by every web provider: the platform base URL and
/// the hard per-call timeout. Upstream calls have no natural bound, so the
/// timeout is always set.
#[derive(Clone, Debug)]
pub struct WebClientConfig {
    base: Url,
    timeout: Duration,
}

impl Default for WebClientConfig {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_BASE).expect("default base url is valid"),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl WebClientConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the platform base URL, e.g. to point at a test server.
    ///
    /// # Errors
    /// Returns [`WebProviderError::InvalidBaseUrl`] when `base` is not a
    /// parseable absolute URL.
    pub fn with_base_url(mut self, base: &str) -> Result<Self, WebProviderError> {
        self.base = Url::parse(base).map_err(|source| WebProviderError::InvalidBaseUrl {
            url: base.to_owned(),
            source,
        })?;
        Ok(self)
    }

    /// Overrides the per-call timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Blocking HTTP client shared by the web providers. Cloning shares the
/// underlying connection pool.
#[derive(Clone, Debug)]
pub struct WebClient {
    http: Client,
    base: Url,
    timeout: Duration,
}

impl WebClient {
    /// Builds the client from `config`.
    ///
    /// # Errors
    /// Returns [`WebProviderError::ClientBuild`] when the underlying HTTP
    /// client cannot be constructed.
    pub fn new(config: WebClientConfig) -> Result<Self, WebProviderError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            base: config.base,
            timeout: config.timeout,
        })
    }

    pub(crate) fn base(&self) -> &Url {
        &self.base
    }

    /// Fetches `url` and returns the response body as text, with statuses
    /// outside 2xx treated as transport failures.
    pub(crate) fn get_text(&self, url: Url) -> Result<String, FetchError> {
        let response = self
            .http
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|error| self.fetch_transport_error(&error))?;
        response
            .text()
            .map_err(|error| self.fetch_transport_error(&error))
    }

    /// Fetches `url` without status handling, for callers that interpret
    /// specific statuses themselves.
    pub(crate) fn get(&self, url: Url) -> Result<reqwest::blocking::Response, reqwest::Error> {
        self.http.get(url).send()
    }

    pub(crate) fn fetch_transport_error(&self, error: &reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::TimedOut {
                waited_ms: timeout_millis(self.timeout),
            }
        } else {
            FetchError::Unreachable {
                message: Arc::from(error.to_string()),
            }
        }
    }

    pub(crate) fn resolution_transport_error(&self, error: &reqwest::Error) -> ResolutionError {
        if error.is_timeout() {
            ResolutionError::Unreachable {
                message: Arc::from(format!(
                    "timed out after {}ms",
                    timeout_millis(self.timeout)
                )),
            }
        } else {
            ResolutionError::Unreachable {
                message: Arc::from(error.to_string()),
            }
        }
    }
}

fn timeout_millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}
