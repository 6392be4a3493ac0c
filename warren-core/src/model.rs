//! Identity and observation types shared across the exploration pipeline.
//!
//! Videos and channels are platform-assigned opaque identifiers. Channel
//! equality is identity equality on the id; titles are display metadata and
//! may be stale relative to the platform.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Opaque identifier for a platform video.
///
/// # Examples
/// ```
/// use warren_core::VideoId;
///
/// let id = VideoId::new("dQw4w9WgXcQ");
/// assert_eq!(id.as_str(), "dQw4w9WgXcQ");
/// ```
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Creates a video identifier from its platform string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the platform string form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VideoId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for VideoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Opaque identifier for a platform channel.
///
/// # Examples
/// ```
/// use warren_core::ChannelId;
///
/// let id = ChannelId::new("UC123");
/// assert_eq!(id.as_str(), "UC123");
/// ```
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Creates a channel identifier from its platform string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the platform string form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ChannelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A channel reference: identity plus display metadata.
///
/// Two references name the same entity iff their ids match; titles are
/// whatever the platform reported at observation time and may disagree
/// between references to the same channel. Use [`ChannelRef::same_channel`]
/// for entity comparisons.
///
/// # Examples
/// ```
/// use warren_core::ChannelRef;
///
/// let a = ChannelRef::new("UC1", "Old Name");
/// let b = ChannelRef::new("UC1", "New Name");
/// assert!(a.same_channel(&b));
/// assert_ne!(a, b);
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ChannelRef {
    channel_id: ChannelId,
    channel_title: String,
}

impl ChannelRef {
    /// Creates a channel reference.
    #[must_use]
    pub fn new(id: impl Into<ChannelId>, title: impl Into<String>) -> Self {
        Self {
            channel_id: id.into(),
            channel_title: title.into(),
        }
    }

    /// Returns the channel identity.
    #[must_use]
    pub fn id(&self) -> &ChannelId {
        &self.channel_id
    }

    /// Returns the display title reported at observation time.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.channel_title
    }

    /// Whether both references name the same channel entity.
    #[must_use]
    pub fn same_channel(&self, other: &Self) -> bool {
        self.channel_id == other.channel_id
    }
}

/// What an identity lookup reports for a video: its display title and the
/// channel that owns it. Both upstream resolution strategies return the two
/// together from a single call.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct VideoAttribution {
    video_title: String,
    channel: ChannelRef,
}

impl VideoAttribution {
    /// Creates an attribution record.
    #[must_use]
    pub fn new(video_title: impl Into<String>, channel: ChannelRef) -> Self {
        Self {
            video_title: video_title.into(),
            channel,
        }
    }

    /// Returns the video's display title.
    #[must_use]
    pub fn video_title(&self) -> &str {
        &self.video_title
    }

    /// Returns the owning channel.
    #[must_use]
    pub fn channel(&self) -> &ChannelRef {
        &self.channel
    }

    /// Consumes the attribution, returning the owning channel.
    #[must_use]
    pub fn into_channel(self) -> ChannelRef {
        self.channel
    }

    /// Consumes the attribution, returning title and channel.
    #[must_use]
    pub fn into_parts(self) -> (String, ChannelRef) {
        (self.video_title, self.channel)
    }
}

/// One entry of a [`StabilizedRanking`]: a video and how many times it was
/// observed across the merged passes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RankedVideo {
    video: VideoId,
    observations: u64,
}

impl RankedVideo {
    /// Creates a ranking entry.
    #[must_use]
    pub fn new(video: impl Into<VideoId>, observations: u64) -> Self {
        Self {
            video: video.into(),
            observations,
        }
    }

    /// Returns the ranked video.
    #[must_use]
    pub fn video(&self) -> &VideoId {
        &self.video
    }

    /// Returns how many times the video was observed.
    #[must_use]
    pub fn observations(&self) -> u64 {
        self.observations
    }
}

/// Error returned when ranking entries violate the ranking invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RankingOrderError {
    /// Observation counts increase somewhere in the sequence.
    #[error("ranking entries must be non-increasing in observation count")]
    NotDescending,
    /// The same video appears more than once.
    #[error("ranking entries must not repeat a video")]
    DuplicateVideo,
}

/// A stabilized frequency ranking over recommended videos.
///
/// Entries are non-increasing in observation count and contain no duplicate
/// videos; ties rank the first-observed video higher. An empty ranking is a
/// valid, meaningful value: the source offered nothing expandable.
///
/// # Examples
/// ```
/// use warren_core::{RankedVideo, StabilizedRanking};
///
/// let ranking = StabilizedRanking::try_from_entries(vec![
///     RankedVideo::new("V2", 8),
///     RankedVideo::new("V3", 2),
/// ])
/// .expect("entries are descending and unique");
/// assert_eq!(ranking.len(), 2);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StabilizedRanking {
    entries: Vec<RankedVideo>,
}

impl StabilizedRanking {
    /// Validates `entries` against the ranking invariants and wraps them.
    ///
    /// # Errors
    /// Returns [`RankingOrderError::NotDescending`] when a count increases
    /// and [`RankingOrderError::DuplicateVideo`] when a video repeats.
    pub fn try_from_entries(entries: Vec<RankedVideo>) -> Result<Self, RankingOrderError> {
        for pair in entries.windows(2) {
            if let [left, right] = pair
                && right.observations > left.observations
            {
                return Err(RankingOrderError::NotDescending);
            }
        }
        let mut seen = std::collections::HashSet::new();
        for entry in &entries {
            if !seen.insert(&entry.video) {
                return Err(RankingOrderError::DuplicateVideo);
            }
        }
        Ok(Self { entries })
    }

    /// Wraps entries the sampler already produced in invariant order.
    pub(crate) fn from_merged(entries: Vec<RankedVideo>) -> Self {
        Self { entries }
    }

    /// Returns the entries in rank order.
    #[must_use]
    pub fn entries(&self) -> &[RankedVideo] {
        &self.entries
    }

    /// Returns the number of ranked videos.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ranking holds no candidates at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the entries in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &RankedVideo> {
        self.entries.iter()
    }
}

/// One step of an autoplay walk: the video that was chosen, the video it was
/// recommended from, and the channel that owns the chosen video.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TrailHop {
    channel: ChannelRef,
    video: VideoId,
    source: VideoId,
}

impl TrailHop {
    /// Creates a hop record.
    #[must_use]
    pub fn new(channel: ChannelRef, video: VideoId, source: VideoId) -> Self {
        Self {
            channel,
            video,
            source,
        }
    }

    /// Returns the channel owning the chosen video.
    #[must_use]
    pub fn channel(&self) -> &ChannelRef {
        &self.channel
    }

    /// Returns the chosen video.
    #[must_use]
    pub fn video(&self) -> &VideoId {
        &self.video
    }

    /// Returns the video this hop was recommended from.
    #[must_use]
    pub fn source(&self) -> &VideoId {
        &self.source
    }
}

/// A completed autoplay walk of exactly the configured hop count.
///
/// Trails are all-or-nothing: a walk that fails mid-hop is discarded rather
/// than truncated, so every trail in a result set has equal length and
/// per-hop statistics line up.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Trail {
    hops: Vec<TrailHop>,
}

impl Trail {
    pub(crate) fn from_hops(hops: Vec<TrailHop>) -> Self {
        Self { hops }
    }

    /// Returns the hops in walk order.
    #[must_use]
    pub fn hops(&self) -> &[TrailHop] {
        &self.hops
    }

    /// Returns the number of hops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    /// Whether the trail holds no hops. Walks never produce an empty trail;
    /// this exists for slice-like API completeness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_identity_ignores_title() {
        let a = ChannelRef::new("UC1", "Before Rebrand");
        let b = ChannelRef::new("UC1", "After Rebrand");
        let c = ChannelRef::new("UC2", "Before Rebrand");
        assert!(a.same_channel(&b));
        assert!(!a.same_channel(&c));
    }

    #[test]
    fn ranking_rejects_ascending_counts() {
        let err = StabilizedRanking::try_from_entries(vec![
            RankedVideo::new("A", 1),
            RankedVideo::new("B", 3),
        ])
        .expect_err("ascending counts must fail");
        assert_eq!(err, RankingOrderError::NotDescending);
    }

    #[test]
    fn ranking_rejects_duplicate_videos() {
        let err = StabilizedRanking::try_from_entries(vec![
            RankedVideo::new("A", 3),
            RankedVideo::new("A", 1),
        ])
        .expect_err("duplicate ids must fail");
        assert_eq!(err, RankingOrderError::DuplicateVideo);
    }

    #[test]
    fn ranking_accepts_ties() {
        let ranking = StabilizedRanking::try_from_entries(vec![
            RankedVideo::new("A", 2),
            RankedVideo::new("B", 2),
        ])
        .expect("ties are valid");
        assert_eq!(ranking.len(), 2);
    }

    #[test]
    fn empty_ranking_is_valid() {
        let ranking = StabilizedRanking::default();
        assert!(ranking.is_empty());
        assert_eq!(ranking.entries(), &[]);
    }

    #[test]
    fn video_id_serializes_transparently() {
        let id = VideoId::new("abc123");
        let json = serde_json::to_string(&id).expect("id must serialize");
        assert_eq!(json, "\"abc123\"");
    }
}
