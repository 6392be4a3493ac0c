//! Structured metadata resolver backed by the platform's Data API.
//!
//! Unlike the embed-info resolver this strategy returns canonical channel
//! ids, so graphs built with it key channels stably across renames. It
//! needs an API key and spends quota on every lookup.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use warren_core::{ChannelRef, ChannelResolver, ResolutionError, VideoAttribution, VideoId};

const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/videos";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised while constructing the Data API resolver. Lookup-time
/// failures map to the core's `ResolutionError` instead.
#[derive(Debug, Error)]
pub enum DataApiError {
    #[error("invalid endpoint url `{url}`: {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build http client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// Resolver querying the platform's `videos.list` metadata endpoint.
pub struct DataApiResolver {
    http: Client,
    endpoint: Url,
    api_key: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    channel_id: String,
    channel_title: String,
}

impl DataApiResolver {
    /// Creates a resolver against the production endpoint.
    ///
    /// # Errors
    /// Returns [`DataApiError::ClientBuild`] when the HTTP client cannot
    /// be constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self, DataApiError> {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT)
    }

    /// Creates a resolver against the production endpoint with a custom
    /// per-call timeout.
    ///
    /// # Errors
    /// Returns [`DataApiError::ClientBuild`] when the HTTP client cannot
    /// be constructed.
    pub fn with_timeout(
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DataApiError> {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT, timeout)
    }

    /// Creates a resolver against a specific endpoint, e.g. a test server.
    ///
    /// # Errors
    /// Returns [`DataApiError::InvalidEndpoint`] for an unparseable
    /// endpoint and [`DataApiError::ClientBuild`] when the HTTP client
    /// cannot be constructed.
    pub fn with_endpoint(
        api_key: impl Into<String>,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Self, DataApiError> {
        let endpoint = Url::parse(endpoint).map_err(|source| DataApiError::InvalidEndpoint {
            url: endpoint.to_owned(),
            source,
        })?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint,
            api_key: api_key.into(),
            timeout,
        })
    }

    fn request_url(&self, video: &VideoId) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("id", video.as_str())
            .append_pair("part", "id,snippet")
            .append_pair("key", &self.api_key);
        url
    }

    fn transport_error(&self, error: &reqwest::Error) -> ResolutionError {
        if error.is_timeout() {
            ResolutionError::Unreachable {
                message: Arc::from(format!("timed out after {:?}", self.timeout)),
            }
        } else {
            ResolutionError::Unreachable {
                message: Arc::from(error.to_string()),
            }
        }
    }
}

/// Maps a decoded response onto an attribution; an empty item list means
/// the platform knows no such video.
fn attribution_from(payload: VideoListResponse, video: &VideoId) -> Result<VideoAttribution, ResolutionError> {
    let Some(item) = payload.items.into_iter().next() else {
        return Err(ResolutionError::NoIdentity {
            video: video.clone(),
        });
    };
    Ok(VideoAttribution::new(
        item.snippet.title,
        ChannelRef::new(item.snippet.channel_id, item.snippet.channel_title),
    ))
}

impl ChannelResolver for DataApiResolver {
    fn name(&self) -> &str {
        "data-api"
    }

    fn resolve(&self, video: &VideoId) -> Result<VideoAttribution, ResolutionError> {
        let response = self
            .http
            .get(self.request_url(video))
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|error| self.transport_error(&error))?;
        let payload: VideoListResponse =
            response.json().map_err(|error| ResolutionError::Malformed {
                message: Arc::from(error.to_string()),
            })?;
        attribution_from(payload, video)
    }
}
