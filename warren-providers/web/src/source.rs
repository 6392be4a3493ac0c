//! Watch-page recommendation source.

use regex::Regex;
use url::Url;

use warren_core::{FetchError, RecommendationSource, VideoId};

use crate::{client::WebClient, errors::WebProviderError};

/// Recommendation source scraping the related-video list of a watch page.
///
/// One fetch is one observation. The surface reshuffles between requests,
/// which is the noise the core's sampler exists to average out.
pub struct WatchPageSource {
    client: WebClient,
    related_item: Regex,
    embedded_id: Regex,
}

impl WatchPageSource {
    /// Creates the source over `client`.
    ///
    /// # Errors
    /// Returns [`WebProviderError::Pattern`] if an extraction pattern fails
    /// to compile.
    pub fn new(client: WebClient) -> Result<Self, WebProviderError> {
        Ok(Self {
            client,
            related_item: Regex::new(
                r#"(?s)related-list-item.*?href="/watch\?v=([0-9A-Za-z_-]{11})"#,
            )?,
            embedded_id: Regex::new(r#""videoId":"([0-9A-Za-z_-]{11})""#)?,
        })
    }

    fn watch_url(&self, video: &VideoId) -> Result<Url, FetchError> {
        let mut url = self
            .client
            .base()
            .join("watch")
            .map_err(|error| FetchError::Malformed {
                message: std::sync::Arc::from(error.to_string()),
            })?;
        url.query_pairs_mut().append_pair("v", video.as_str());
        Ok(url)
    }

    /// Related-list markup is tried first. Newer pages only carry ids in
    /// embedded script JSON, where one renderer repeats its own id in a
    /// run: runs collapse to one slot, separate slots stay.
    fn extract(&self, html: &str, watched: &VideoId) -> Vec<VideoId> {
        let related: Vec<VideoId> = self
            .related_item
            .captures_iter(html)
            .filter_map(|caps| caps.get(1))
            .map(|capture| VideoId::new(capture.as_str()))
            .collect();
        if !related.is_empty() {
            return related;
        }

        let mut ids: Vec<VideoId> = Vec::new();
        for caps in self.embedded_id.captures_iter(html) {
            let Some(capture) = caps.get(1) else {
                continue;
            };
            if capture.as_str() == watched.as_str() {
                continue;
            }
            if ids
                .last()
                .is_some_and(|last| last.as_str() == capture.as_str())
            {
                continue;
            }
            ids.push(VideoId::new(capture.as_str()));
        }
        ids
    }
}

impl RecommendationSource for WatchPageSource {
    fn name(&self) -> &str {
        "watch-page"
    }

    fn fetch_recommendations(&self, video: &VideoId) -> Result<Vec<VideoId>, FetchError> {
        let url = self.watch_url(video)?;
        let html = self.client.get_text(url)?;
        Ok(self.extract(&html, video))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::WebClientConfig;

    fn source() -> WatchPageSource {
        let client = WebClient::new(WebClientConfig::default()).expect("client must build");
        WatchPageSource::new(client).expect("patterns must compile")
    }

    #[test]
    fn extracts_related_list_items_in_document_order() {
        let html = r#"
            <ul>
              <li class="related-list-item"><a href="/watch?v=AAAAAAAAAAA">one</a></li>
              <li class="related-list-item"><a href="/watch?v=BBBBBBBBBBB">two</a></li>
              <li class="related-list-item"><a href="/watch?v=AAAAAAAAAAA">one again</a></li>
            </ul>
        "#;
        let ids = source().extract(html, &VideoId::new("ZZZZZZZZZZZ"));
        let ids: Vec<&str> = ids.iter().map(VideoId::as_str).collect();
        // Duplicate slots are observations, not noise.
        assert_eq!(ids, vec!["AAAAAAAAAAA", "BBBBBBBBBBB", "AAAAAAAAAAA"]);
    }

    #[test]
    fn falls_back_to_embedded_ids_without_the_watched_video() {
        let html = r#"
            {"videoId":"WATCHEDWTCH","other":1}
            {"videoId":"AAAAAAAAAAA"},{"videoId":"AAAAAAAAAAA"}
            {"videoId":"BBBBBBBBBBB"}
            {"videoId":"AAAAAAAAAAA"}
        "#;
        let ids = source().extract(html, &VideoId::new("WATCHEDWTCH"));
        let ids: Vec<&str> = ids.iter().map(VideoId::as_str).collect();
        // The adjacent repeat collapses; the later slot survives.
        assert_eq!(ids, vec!["AAAAAAAAAAA", "BBBBBBBBBBB", "AAAAAAAAAAA"]);
    }

    #[test]
    fn pages_without_recommendations_observe_nothing() {
        let ids = source().extract("<html><body>upload removed</body></html>", &VideoId::new("AAAAAAAAAAA"));
        assert!(ids.is_empty());
    }

    #[test]
    fn watch_url_carries_the_video_id() {
        let url = source()
            .watch_url(&VideoId::new("AAAAAAAAAAA"))
            .expect("url must build");
        assert_eq!(
            url.as_str(),
            "https://www.youtube.com/watch?v=AAAAAAAAAAA"
        );
    }
}
