//! Lightweight embed-info identity resolver.

use std::sync::Arc;

use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use warren_core::{ChannelRef, ChannelResolver, ResolutionError, VideoAttribution, VideoId};

use crate::client::WebClient;

/// Resolver backed by the platform's embed-info endpoint.
///
/// The endpoint returns the video title and author in one cheap JSON call
/// but carries no canonical channel id; the author page slug stands in,
/// with the author name as a last resort. Graphs built purely from this
/// resolver key channels by that slug.
pub struct OembedResolver {
    client: WebClient,
}

#[derive(Debug, Deserialize)]
struct OembedResponse {
    title: String,
    author_name: String,
    author_url: Option<String>,
}

impl OembedResolver {
    /// Creates the resolver over `client`.
    #[must_use]
    pub const fn new(client: WebClient) -> Self {
        Self { client }
    }

    fn oembed_url(&self, video: &VideoId) -> Result<Url, ResolutionError> {
        let malformed = |error: url::ParseError| ResolutionError::Malformed {
            message: Arc::from(error.to_string()),
        };
        let mut watch = self.client.base().join("watch").map_err(malformed)?;
        watch.query_pairs_mut().append_pair("v", video.as_str());
        let mut url = self.client.base().join("oembed").map_err(malformed)?;
        url.query_pairs_mut()
            .append_pair("url", watch.as_str())
            .append_pair("format", "json");
        Ok(url)
    }
}

/// Derives a stable channel key from the author page URL, falling back to
/// the display name when the URL is absent or unparseable.
fn channel_key(author_url: Option<&str>, author_name: &str) -> String {
    author_url
        .and_then(|raw| Url::parse(raw).ok())
        .and_then(|url| {
            url.path_segments().and_then(|segments| {
                segments
                    .filter(|segment| !segment.is_empty())
                    .next_back()
                    .map(ToOwned::to_owned)
            })
        })
        .unwrap_or_else(|| author_name.to_owned())
}

impl ChannelResolver for OembedResolver {
    fn name(&self) -> &str {
        "oembed"
    }

    fn resolve(&self, video: &VideoId) -> Result<VideoAttribution, ResolutionError> {
        let url = self.oembed_url(video)?;
        let response = self
            .client
            .get(url)
            .map_err(|error| self.client.resolution_transport_error(&error))?;

        // The endpoint answers 4xx for private, deleted, and embed-disabled
        // videos: that is "no usable identity", not a transport failure.
        if matches!(
            response.status(),
            StatusCode::BAD_REQUEST
                | StatusCode::UNAUTHORIZED
                | StatusCode::FORBIDDEN
                | StatusCode::NOT_FOUND
        ) {
            return Err(ResolutionError::NoIdentity {
                video: video.clone(),
            });
        }

        let response = response
            .error_for_status()
            .map_err(|error| self.client.resolution_transport_error(&error))?;
        let payload: OembedResponse =
            response.json().map_err(|error| ResolutionError::Malformed {
                message: Arc::from(error.to_string()),
            })?;

        let key = channel_key(payload.author_url.as_deref(), &payload.author_name);
        Ok(VideoAttribution::new(
            payload.title,
            ChannelRef::new(key, payload.author_name),
        ))
    }
}
