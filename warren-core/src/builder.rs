//! Builder utilities for configuring warren explorations.
//!
//! Validates the exploration knobs before constructing [`Warren`]
//! instances: everything except `depth` must be non-zero, and `depth`
//! zero is a legitimate "do not expand" configuration.

use std::num::NonZeroUsize;

use crate::{
    error::{Result, WarrenError},
    warren::Warren,
};

const DEFAULT_PRECISION: usize = 20;
const DEFAULT_TOP_N: usize = 20;
const DEFAULT_DEGREES: usize = 6;
const DEFAULT_ITERATIONS: usize = 20;
const DEFAULT_DEPTH: usize = 2;
const DEFAULT_MAX_EXPANSIONS: usize = 10_000;

/// Configures and constructs [`Warren`] instances.
///
/// # Examples
/// ```
/// use warren_core::WarrenBuilder;
///
/// let warren = WarrenBuilder::new()
///     .with_precision(10)
///     .with_depth(3)
///     .build()
///     .expect("configuration is valid");
/// assert_eq!(warren.precision().get(), 10);
/// assert_eq!(warren.depth(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct WarrenBuilder {
    precision: usize,
    top_n: usize,
    degrees: usize,
    iterations: usize,
    depth: usize,
    max_expansions: usize,
}

impl Default for WarrenBuilder {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            top_n: DEFAULT_TOP_N,
            degrees: DEFAULT_DEGREES,
            iterations: DEFAULT_ITERATIONS,
            depth: DEFAULT_DEPTH,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        }
    }
}

impl WarrenBuilder {
    /// Creates a builder populated with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides how many observation passes stabilize one sample.
    #[must_use]
    pub const fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Returns the configured precision.
    #[must_use]
    pub const fn precision(&self) -> usize {
        self.precision
    }

    /// Overrides how many candidates a stabilized ranking retains.
    #[must_use]
    pub const fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Returns the configured retention width.
    #[must_use]
    pub const fn top_n(&self) -> usize {
        self.top_n
    }

    /// Overrides the trail hop count.
    #[must_use]
    pub const fn with_degrees(mut self, degrees: usize) -> Self {
        self.degrees = degrees;
        self
    }

    /// Returns the configured hop count.
    #[must_use]
    pub const fn degrees(&self) -> usize {
        self.degrees
    }

    /// Overrides how many walks the trail experiment attempts.
    #[must_use]
    pub const fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Returns the configured walk attempt count.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    /// Overrides the network recursion bound. Zero is valid and means "do
    /// not expand at all".
    #[must_use]
    pub const fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Returns the configured recursion bound.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Overrides the defensive total-expansion budget.
    #[must_use]
    pub const fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    /// Returns the configured expansion budget.
    #[must_use]
    pub const fn max_expansions(&self) -> usize {
        self.max_expansions
    }

    /// Validates the configuration and constructs a [`Warren`] instance.
    ///
    /// # Errors
    /// Returns the matching [`WarrenError`] variant when any knob other
    /// than `depth` is zero.
    pub fn build(self) -> Result<Warren> {
        let precision = NonZeroUsize::new(self.precision)
            .ok_or(WarrenError::InvalidPrecision { got: self.precision })?;
        let top_n =
            NonZeroUsize::new(self.top_n).ok_or(WarrenError::InvalidTopN { got: self.top_n })?;
        let degrees = NonZeroUsize::new(self.degrees)
            .ok_or(WarrenError::InvalidDegrees { got: self.degrees })?;
        let iterations = NonZeroUsize::new(self.iterations)
            .ok_or(WarrenError::InvalidIterations {
                got: self.iterations,
            })?;
        let max_expansions =
            NonZeroUsize::new(self.max_expansions).ok_or(WarrenError::InvalidMaxExpansions {
                got: self.max_expansions,
            })?;

        Ok(Warren::new(
            precision,
            top_n,
            degrees,
            iterations,
            self.depth,
            max_expansions,
        ))
    }
}
