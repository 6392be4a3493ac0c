//! Error types for the warren core library.
//!
//! Fetch and resolution failures are absorbed where they happen and never
//! reach this enum; [`WarrenError`] covers configuration validation and the
//! one fatal runtime path, failing to resolve the seed itself.

use thiserror::Error;

use crate::{model::VideoId, resolver::ResolutionError};

/// Error type produced when configuring or running [`crate::Warren`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum WarrenError {
    /// Stabilization needs at least one observation pass.
    #[error("precision must be at least 1 (got {got})")]
    InvalidPrecision {
        /// The invalid precision supplied by the caller.
        got: usize,
    },
    /// Rankings must retain at least one candidate.
    #[error("top_n must be at least 1 (got {got})")]
    InvalidTopN {
        /// The invalid candidate count supplied by the caller.
        got: usize,
    },
    /// A walk needs at least one hop.
    #[error("degrees must be at least 1 (got {got})")]
    InvalidDegrees {
        /// The invalid hop count supplied by the caller.
        got: usize,
    },
    /// An experiment needs at least one walk attempt.
    #[error("iterations must be at least 1 (got {got})")]
    InvalidIterations {
        /// The invalid iteration count supplied by the caller.
        got: usize,
    },
    /// The defensive expansion budget cannot be zero.
    #[error("max_expansions must be at least 1 (got {got})")]
    InvalidMaxExpansions {
        /// The invalid expansion budget supplied by the caller.
        got: usize,
    },
    /// The seed video itself could not be resolved, so the run cannot be
    /// labeled and is meaningless.
    #[error("seed video {video} could not be resolved: {error}")]
    SeedResolution {
        /// The seed that failed to resolve.
        video: VideoId,
        /// The underlying resolution failure.
        #[source]
        error: ResolutionError,
    },
}

impl WarrenError {
    /// Returns a stable, machine-readable code for the variant.
    #[must_use]
    pub const fn code(&self) -> WarrenErrorCode {
        match self {
            Self::InvalidPrecision { .. } => WarrenErrorCode::InvalidPrecision,
            Self::InvalidTopN { .. } => WarrenErrorCode::InvalidTopN,
            Self::InvalidDegrees { .. } => WarrenErrorCode::InvalidDegrees,
            Self::InvalidIterations { .. } => WarrenErrorCode::InvalidIterations,
            Self::InvalidMaxExpansions { .. } => WarrenErrorCode::InvalidMaxExpansions,
            Self::SeedResolution { .. } => WarrenErrorCode::SeedResolution,
        }
    }

    /// Retrieve the inner [`crate::ResolutionErrorCode`] when the error
    /// originated in the resolver.
    #[must_use]
    pub const fn resolution_code(&self) -> Option<crate::ResolutionErrorCode> {
        match self {
            Self::SeedResolution { error, .. } => Some(error.code()),
            _ => None,
        }
    }
}

/// Machine-readable error codes for [`WarrenError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum WarrenErrorCode {
    /// Stabilization needs at least one observation pass.
    InvalidPrecision,
    /// Rankings must retain at least one candidate.
    InvalidTopN,
    /// A walk needs at least one hop.
    InvalidDegrees,
    /// An experiment needs at least one walk attempt.
    InvalidIterations,
    /// The defensive expansion budget cannot be zero.
    InvalidMaxExpansions,
    /// The seed video itself could not be resolved.
    SeedResolution,
}

impl WarrenErrorCode {
    /// Returns the stable string form of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidPrecision => "WARREN_INVALID_PRECISION",
            Self::InvalidTopN => "WARREN_INVALID_TOP_N",
            Self::InvalidDegrees => "WARREN_INVALID_DEGREES",
            Self::InvalidIterations => "WARREN_INVALID_ITERATIONS",
            Self::InvalidMaxExpansions => "WARREN_INVALID_MAX_EXPANSIONS",
            Self::SeedResolution => "WARREN_SEED_RESOLUTION",
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, WarrenError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn seed_resolution_exposes_inner_code() {
        let err = WarrenError::SeedResolution {
            video: VideoId::new("V1"),
            error: ResolutionError::Unreachable {
                message: Arc::from("dns"),
            },
        };
        assert_eq!(err.code().as_str(), "WARREN_SEED_RESOLUTION");
        assert_eq!(
            err.resolution_code().map(|code| code.as_str()),
            Some("RESOLVE_UNREACHABLE")
        );
    }

    #[test]
    fn validation_errors_have_no_inner_code() {
        let err = WarrenError::InvalidPrecision { got: 0 };
        assert!(err.resolution_code().is_none());
    }
}
