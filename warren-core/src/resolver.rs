//! Identity resolution abstraction.
//!
//! Mapping a video to its owning channel is an external lookup with at
//! least two interchangeable upstream strategies (a structured metadata
//! API and a lightweight embed-info endpoint). The core is polymorphic
//! over this single capability and assumes nothing about ordering or
//! caching; callers that need memoization do it themselves.

use std::sync::Arc;

use thiserror::Error;

use crate::model::{VideoAttribution, VideoId};

/// An error produced while resolving a video's identity.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ResolutionError {
    /// The platform reports no usable identity for the video, e.g. it is
    /// private or deleted.
    #[error("no usable identity for video {video}")]
    NoIdentity {
        /// The video that could not be attributed.
        video: VideoId,
    },
    /// The lookup endpoint could not be reached.
    #[error("identity lookup unreachable: {message}")]
    Unreachable {
        /// Transport-level failure description.
        message: Arc<str>,
    },
    /// A response arrived but could not be interpreted.
    #[error("identity response malformed: {message}")]
    Malformed {
        /// What about the response defeated parsing.
        message: Arc<str>,
    },
}

impl ResolutionError {
    /// Returns a stable, machine-readable code for the variant.
    #[must_use]
    pub const fn code(&self) -> ResolutionErrorCode {
        match self {
            Self::NoIdentity { .. } => ResolutionErrorCode::NoIdentity,
            Self::Unreachable { .. } => ResolutionErrorCode::Unreachable,
            Self::Malformed { .. } => ResolutionErrorCode::Malformed,
        }
    }
}

/// Machine-readable error codes for [`ResolutionError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ResolutionErrorCode {
    /// The platform reports no usable identity for the video.
    NoIdentity,
    /// The lookup endpoint could not be reached.
    Unreachable,
    /// A response arrived but could not be interpreted.
    Malformed,
}

impl ResolutionErrorCode {
    /// Returns the stable string form of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoIdentity => "RESOLVE_NO_IDENTITY",
            Self::Unreachable => "RESOLVE_UNREACHABLE",
            Self::Malformed => "RESOLVE_MALFORMED",
        }
    }
}

/// Abstraction over a video-to-channel identity lookup.
///
/// # Examples
/// ```
/// use warren_core::{ChannelRef, ChannelResolver, ResolutionError, VideoAttribution, VideoId};
///
/// struct OneChannel;
///
/// impl ChannelResolver for OneChannel {
///     fn name(&self) -> &str { "one-channel" }
///     fn resolve(&self, video: &VideoId) -> Result<VideoAttribution, ResolutionError> {
///         Ok(VideoAttribution::new(
///             format!("title of {video}"),
///             ChannelRef::new("UC1", "The Channel"),
///         ))
///     }
/// }
///
/// let attribution = OneChannel.resolve(&VideoId::new("V1"))?;
/// assert_eq!(attribution.channel().id().as_str(), "UC1");
/// # Ok::<(), ResolutionError>(())
/// ```
pub trait ChannelResolver {
    /// Returns a human-readable name for diagnostics.
    fn name(&self) -> &str;

    /// Resolves `video` to its display title and owning channel.
    ///
    /// # Errors
    /// Returns [`ResolutionError`] when the platform has no usable identity
    /// for the video or the lookup itself fails.
    fn resolve(&self, video: &VideoId) -> Result<VideoAttribution, ResolutionError>;
}
