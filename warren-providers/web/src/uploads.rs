//! Uploads listing for channel-seeded explorations.

use regex::Regex;
use url::Url;

use warren_core::{FetchError, VideoId};

use crate::{client::WebClient, errors::WebProviderError};

/// Lists a channel's most recent uploads from its public videos page.
///
/// Accepts the slug forms the platform uses in channel URLs:
/// `channel/<id>`, `user/<name>`, or `@<handle>`.
pub struct UploadsLister {
    client: WebClient,
    watch_link: Regex,
}

impl UploadsLister {
    /// Creates the lister over `client`.
    ///
    /// # Errors
    /// Returns [`WebProviderError::Pattern`] if the extraction pattern
    /// fails to compile.
    pub fn new(client: WebClient) -> Result<Self, WebProviderError> {
        Ok(Self {
            client,
            watch_link: Regex::new(r#"/watch\?v=([0-9A-Za-z_-]{11})"#)?,
        })
    }

    fn uploads_url(&self, channel_slug: &str) -> Result<Url, FetchError> {
        let path = format!("{}/videos", channel_slug.trim_matches('/'));
        let mut url = self
            .client
            .base()
            .join(&path)
            .map_err(|error| FetchError::Malformed {
                message: std::sync::Arc::from(error.to_string()),
            })?;
        url.query_pairs_mut()
            .append_pair("sort", "dd")
            .append_pair("flow", "grid");
        Ok(url)
    }

    /// Fetches the channel's videos page and returns upload ids, newest
    /// first, each listed once.
    ///
    /// # Errors
    /// Returns [`FetchError`] when the page cannot be fetched; an empty
    /// listing is a successful result.
    pub fn latest_uploads(&self, channel_slug: &str) -> Result<Vec<VideoId>, FetchError> {
        let url = self.uploads_url(channel_slug)?;
        let html = self.client.get_text(url)?;
        Ok(self.extract(&html))
    }

    fn extract(&self, html: &str) -> Vec<VideoId> {
        let mut seen = std::collections::HashSet::new();
        self.watch_link
            .captures_iter(html)
            .filter_map(|caps| caps.get(1))
            .map(|capture| capture.as_str())
            .filter(|id| seen.insert(*id))
            .map(VideoId::new)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::WebClientConfig;

    fn lister() -> UploadsLister {
        let client = WebClient::new(WebClientConfig::default()).expect("client must build");
        UploadsLister::new(client).expect("pattern must compile")
    }

    #[test]
    fn extracts_unique_uploads_in_page_order() {
        let html = r#"
            <a class="tile" href="/watch?v=AAAAAAAAAAA">newest</a>
            <a class="tile" href="/watch?v=BBBBBBBBBBB">older</a>
            <a class="tile" href="/watch?v=AAAAAAAAAAA">thumbnail link</a>
        "#;
        let ids: Vec<String> = lister()
            .extract(html)
            .iter()
            .map(|id| id.as_str().to_owned())
            .collect();
        assert_eq!(ids, vec!["AAAAAAAAAAA", "BBBBBBBBBBB"]);
    }

    #[test]
    fn uploads_url_keeps_the_slug_shape() {
        let url = lister()
            .uploads_url("channel/UC12345678901234567890")
            .expect("url must build");
        assert_eq!(
            url.as_str(),
            "https://www.youtube.com/channel/UC12345678901234567890/videos?sort=dd&flow=grid"
        );
    }

    #[test]
    fn handle_slugs_build_valid_urls() {
        let url = lister()
            .uploads_url("@somecreator")
            .expect("url must build");
        assert_eq!(
            url.as_str(),
            "https://www.youtube.com/@somecreator/videos?sort=dd&flow=grid"
        );
    }
}
