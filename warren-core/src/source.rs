//! Recommendation source abstraction.
//!
//! The platform surface that suggests "what plays next" is an external
//! collaborator; the core only depends on this contract. The surface is
//! noisy and non-deterministic: repeated identical queries may return
//! different multisets, which is precisely why the sampler exists.

use std::sync::Arc;

use thiserror::Error;

use crate::model::VideoId;

/// An error produced while fetching one recommendation observation.
///
/// Fetch failures are transient by classification: callers absorb them at
/// the smallest unit (skip the observation, abandon the walk) rather than
/// failing a whole experiment.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum FetchError {
    /// The upstream endpoint could not be reached at all.
    #[error("recommendation source unreachable: {message}")]
    Unreachable {
        /// Transport-level failure description.
        message: Arc<str>,
    },
    /// A response arrived but could not be interpreted.
    #[error("recommendation response malformed: {message}")]
    Malformed {
        /// What about the response defeated parsing.
        message: Arc<str>,
    },
    /// The call exceeded its hard time bound.
    #[error("recommendation fetch timed out after {waited_ms}ms")]
    TimedOut {
        /// How long the call was allowed to run, in milliseconds.
        waited_ms: u64,
    },
}

impl FetchError {
    /// Returns a stable, machine-readable code for the variant.
    #[must_use]
    pub const fn code(&self) -> FetchErrorCode {
        match self {
            Self::Unreachable { .. } => FetchErrorCode::Unreachable,
            Self::Malformed { .. } => FetchErrorCode::Malformed,
            Self::TimedOut { .. } => FetchErrorCode::TimedOut,
        }
    }
}

/// Machine-readable error codes for [`FetchError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FetchErrorCode {
    /// The upstream endpoint could not be reached at all.
    Unreachable,
    /// A response arrived but could not be interpreted.
    Malformed,
    /// The call exceeded its hard time bound.
    TimedOut,
}

impl FetchErrorCode {
    /// Returns the stable string form of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unreachable => "FETCH_UNREACHABLE",
            Self::Malformed => "FETCH_MALFORMED",
            Self::TimedOut => "FETCH_TIMED_OUT",
        }
    }
}

/// Abstraction over the platform's "related/next" recommendation surface.
///
/// One call is one observation: a multiset of recommended videos in the
/// order the surface presented them. Duplicates are expected (the same
/// video can occupy several recommendation slots) and meaningful. An empty
/// observation is a successful observation.
///
/// # Examples
/// ```
/// use warren_core::{FetchError, RecommendationSource, VideoId};
///
/// struct Fixed(Vec<VideoId>);
///
/// impl RecommendationSource for Fixed {
///     fn name(&self) -> &str { "fixed" }
///     fn fetch_recommendations(&self, _video: &VideoId) -> Result<Vec<VideoId>, FetchError> {
///         Ok(self.0.clone())
///     }
/// }
///
/// let source = Fixed(vec![VideoId::new("V2"), VideoId::new("V2")]);
/// let observed = source.fetch_recommendations(&VideoId::new("V1"))?;
/// assert_eq!(observed.len(), 2);
/// # Ok::<(), FetchError>(())
/// ```
pub trait RecommendationSource {
    /// Returns a human-readable name for diagnostics.
    fn name(&self) -> &str;

    /// Performs one observation of the recommendation surface for `video`.
    ///
    /// # Errors
    /// Returns [`FetchError`] when the upstream is unreachable, times out,
    /// or produces an uninterpretable response. An empty result is success.
    fn fetch_recommendations(&self, video: &VideoId) -> Result<Vec<VideoId>, FetchError>;
}
