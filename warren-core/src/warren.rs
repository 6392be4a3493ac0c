//! Exploration orchestration for the warren core library.
//!
//! [`Warren`] is the validated entry point: it owns the exploration knobs
//! and wires the sampler, walker, runner, and network builder together
//! for one seed at a time.

use std::num::NonZeroUsize;

use tracing::instrument;

use crate::{
    cancel::CancellationToken,
    error::{Result, WarrenError},
    experiment::{ExperimentResult, ExperimentRunner},
    model::VideoId,
    network::{NetworkBuilder, NetworkResult},
    resolver::ChannelResolver,
    sampler::Sampler,
    source::RecommendationSource,
    trail::TrailWalker,
};

/// Entry point for running warren explorations.
///
/// Construct via [`crate::WarrenBuilder`]; every instance carries
/// validated knobs. One instance can run any number of explorations, but
/// each run owns its own state — nothing is shared across invocations.
#[derive(Debug, Clone)]
pub struct Warren {
    precision: NonZeroUsize,
    top_n: NonZeroUsize,
    degrees: NonZeroUsize,
    iterations: NonZeroUsize,
    depth: usize,
    max_expansions: NonZeroUsize,
}

impl Warren {
    pub(crate) const fn new(
        precision: NonZeroUsize,
        top_n: NonZeroUsize,
        degrees: NonZeroUsize,
        iterations: NonZeroUsize,
        depth: usize,
        max_expansions: NonZeroUsize,
    ) -> Self {
        Self {
            precision,
            top_n,
            degrees,
            iterations,
            depth,
            max_expansions,
        }
    }

    /// Returns how many observation passes stabilize one sample.
    #[must_use]
    pub const fn precision(&self) -> NonZeroUsize {
        self.precision
    }

    /// Returns how many candidates a stabilized ranking retains.
    #[must_use]
    pub const fn top_n(&self) -> NonZeroUsize {
        self.top_n
    }

    /// Returns the trail hop count.
    #[must_use]
    pub const fn degrees(&self) -> NonZeroUsize {
        self.degrees
    }

    /// Returns how many walks the trail experiment attempts.
    #[must_use]
    pub const fn iterations(&self) -> NonZeroUsize {
        self.iterations
    }

    /// Returns the network recursion bound.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the defensive total-expansion budget.
    #[must_use]
    pub const fn max_expansions(&self) -> NonZeroUsize {
        self.max_expansions
    }

    /// Runs the autoplay experiment: `iterations` independent walks of
    /// `degrees` hops from `seed`.
    ///
    /// # Errors
    /// Returns [`WarrenError::SeedResolution`] when the seed video cannot
    /// be resolved for labeling. Walk-level failures never surface here;
    /// they reduce the success count instead.
    pub fn run_trails<S, R>(
        &self,
        source: &S,
        resolver: &R,
        seed: &VideoId,
        cancel: &CancellationToken,
    ) -> Result<ExperimentResult>
    where
        S: RecommendationSource + Sync,
        R: ChannelResolver + Sync,
    {
        let runner = ExperimentRunner::new(self.iterations, TrailWalker::new(self.degrees));
        runner.run(source, resolver, seed, cancel)
    }

    /// Builds the channel affinity network from `seed`.
    ///
    /// The seed's channel is resolved first so the exploration has a
    /// labelled origin; from there the network builder recurses up to
    /// `depth` levels with `precision`-stabilized, `top_n`-wide
    /// neighbourhoods.
    ///
    /// # Errors
    /// Returns [`WarrenError::SeedResolution`] when the seed video cannot
    /// be resolved. Candidate-level failures are absorbed downstream.
    #[instrument(
        name = "warren.build_network",
        err,
        skip(self, source, resolver, cancel),
        fields(
            seed = %seed,
            depth = self.depth,
            precision = self.precision.get(),
            top_n = self.top_n.get(),
        ),
    )]
    pub fn build_network<S, R>(
        &self,
        source: &S,
        resolver: &R,
        seed: &VideoId,
        cancel: &CancellationToken,
    ) -> Result<NetworkResult>
    where
        S: RecommendationSource + Sync,
        R: ChannelResolver + Sync,
    {
        let attribution =
            resolver
                .resolve(seed)
                .map_err(|error| WarrenError::SeedResolution {
                    video: seed.clone(),
                    error,
                })?;
        let builder = NetworkBuilder::new(
            Sampler::new(self.precision, self.top_n),
            self.depth,
            self.max_expansions,
        );
        let graph = builder.build(source, resolver, seed, attribution.channel(), cancel);
        Ok(NetworkResult::new(seed.clone(), attribution, graph))
    }
}
