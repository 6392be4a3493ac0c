//! Shared scripted collaborators for the warren-core test suites.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use warren_core::{
    ChannelRef, ChannelResolver, FetchError, RecommendationSource, ResolutionError,
    VideoAttribution, VideoId,
};

/// Builds a [`VideoId`] from a literal.
pub fn vid(id: &str) -> VideoId {
    VideoId::new(id)
}

/// Builds a [`ChannelRef`] with a derived title.
pub fn chan(id: &str) -> ChannelRef {
    ChannelRef::new(id, format!("{id} title"))
}

/// Builds a [`VideoAttribution`] for a video owned by `channel_id`.
pub fn attr(video: &str, channel_id: &str) -> VideoAttribution {
    VideoAttribution::new(format!("{video} title"), chan(channel_id))
}

/// Recommendation source that answers every observation of a video with the
/// same scripted result. Unknown videos observe an empty multiset.
pub struct MappedSource {
    responses: HashMap<VideoId, Result<Vec<VideoId>, FetchError>>,
    fetches: AtomicUsize,
}

impl MappedSource {
    pub fn new(entries: Vec<(&str, Result<Vec<&str>, FetchError>)>) -> Self {
        let responses = entries
            .into_iter()
            .map(|(video, result)| {
                (
                    vid(video),
                    result.map(|ids| ids.into_iter().map(VideoId::new).collect()),
                )
            })
            .collect();
        Self {
            responses,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Total observation calls made against this source.
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl RecommendationSource for MappedSource {
    fn name(&self) -> &str {
        "mapped"
    }

    fn fetch_recommendations(&self, video: &VideoId) -> Result<Vec<VideoId>, FetchError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.responses
            .get(video)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Recommendation source that scripts results by call order, regardless of
/// which video is asked about. Calls beyond the script observe nothing.
pub struct SequencedSource {
    script: Vec<Result<Vec<VideoId>, FetchError>>,
    calls: AtomicUsize,
}

impl SequencedSource {
    pub fn new(script: Vec<Result<Vec<&str>, FetchError>>) -> Self {
        Self {
            script: script
                .into_iter()
                .map(|result| result.map(|ids| ids.into_iter().map(VideoId::new).collect()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl RecommendationSource for SequencedSource {
    fn name(&self) -> &str {
        "sequenced"
    }

    fn fetch_recommendations(&self, _video: &VideoId) -> Result<Vec<VideoId>, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        self.script
            .get(call)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Resolver backed by a fixed video → attribution table. Unknown videos
/// fail with [`ResolutionError::NoIdentity`].
pub struct MappedResolver {
    identities: HashMap<VideoId, VideoAttribution>,
}

impl MappedResolver {
    pub fn new(entries: Vec<(&str, &str)>) -> Self {
        let identities = entries
            .into_iter()
            .map(|(video, channel_id)| (vid(video), attr(video, channel_id)))
            .collect();
        Self { identities }
    }
}

impl ChannelResolver for MappedResolver {
    fn name(&self) -> &str {
        "mapped"
    }

    fn resolve(&self, video: &VideoId) -> Result<VideoAttribution, ResolutionError> {
        self.identities
            .get(video)
            .cloned()
            .ok_or_else(|| ResolutionError::NoIdentity {
                video: video.clone(),
            })
    }
}
