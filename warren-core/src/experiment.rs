//! The autoplay experiment: many independent walks from one seed.

use std::num::NonZeroUsize;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    cancel::CancellationToken,
    error::{Result, WarrenError},
    model::{ChannelRef, Trail, VideoId},
    resolver::ChannelResolver,
    source::RecommendationSource,
    trail::TrailWalker,
};

/// The outcome of one autoplay experiment run.
///
/// Built incrementally across `total_iterations` walk attempts and
/// immutable once returned. The gap between
/// [`ExperimentResult::total_iterations`] and
/// [`ExperimentResult::successful_iterations`] is how sampling quality
/// shows up: a low success ratio signals an unstable or low-connectivity
/// seed.
#[derive(Clone, Debug, Serialize)]
pub struct ExperimentResult {
    seed_video: VideoId,
    seed_title: String,
    seed_channel: ChannelRef,
    retrieved_at: DateTime<Utc>,
    total_iterations: usize,
    trails: Vec<Trail>,
}

impl ExperimentResult {
    /// Returns the seed video the walks started from.
    #[must_use]
    pub fn seed_video(&self) -> &VideoId {
        &self.seed_video
    }

    /// Returns the seed video's display title.
    #[must_use]
    pub fn seed_title(&self) -> &str {
        &self.seed_title
    }

    /// Returns the channel owning the seed video.
    #[must_use]
    pub fn seed_channel(&self) -> &ChannelRef {
        &self.seed_channel
    }

    /// Returns when the experiment ran.
    #[must_use]
    pub const fn retrieved_at(&self) -> DateTime<Utc> {
        self.retrieved_at
    }

    /// Returns how many walks were attempted.
    #[must_use]
    pub const fn total_iterations(&self) -> usize {
        self.total_iterations
    }

    /// Returns how many walks completed at full length.
    #[must_use]
    pub fn successful_iterations(&self) -> usize {
        self.trails.len()
    }

    /// Returns the collected full-length trails.
    #[must_use]
    pub fn trails(&self) -> &[Trail] {
        &self.trails
    }
}

/// Repeats the trail walk from a fixed seed and collects the survivors.
#[derive(Clone, Debug)]
pub struct ExperimentRunner {
    iterations: NonZeroUsize,
    walker: TrailWalker,
}

impl ExperimentRunner {
    /// Creates a runner that attempts `iterations` walks with `walker`.
    #[must_use]
    pub const fn new(iterations: NonZeroUsize, walker: TrailWalker) -> Self {
        Self { iterations, walker }
    }

    /// Returns the configured number of walk attempts.
    #[must_use]
    pub const fn iterations(&self) -> NonZeroUsize {
        self.iterations
    }

    /// Runs the experiment: resolves the seed once for labeling, then
    /// attempts `iterations` independent walks. Failed walks are dropped
    /// silently; they affect only the success count.
    ///
    /// Walks are independent and run in parallel. Cancellation stops
    /// issuing new walks; trails already collected are returned.
    ///
    /// # Errors
    /// Returns [`WarrenError::SeedResolution`] if the seed video itself
    /// cannot be resolved — the one failure that invalidates a whole run,
    /// since the result could not be labeled.
    #[instrument(
        name = "runner.run",
        err,
        skip(self, source, resolver, cancel),
        fields(
            source = %source.name(),
            resolver = %resolver.name(),
            seed = %seed,
            iterations = self.iterations.get(),
            degrees = self.walker.degrees().get(),
        ),
    )]
    pub fn run<S, R>(
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
        let attribution =
            resolver
                .resolve(seed)
                .map_err(|error| WarrenError::SeedResolution {
                    video: seed.clone(),
                    error,
                })?;
        let (seed_title, seed_channel) = attribution.into_parts();
        let retrieved_at = Utc::now();

        let total_iterations = self.iterations.get();
        let trails: Vec<Trail> = (0..total_iterations)
            .into_par_iter()
            .filter_map(|_iteration| {
                if cancel.is_cancelled() {
                    return None;
                }
                self.walker.walk(source, resolver, seed)
            })
            .collect();

        info!(
            total = total_iterations,
            successful = trails.len(),
            "trail experiment completed"
        );

        Ok(ExperimentResult {
            seed_video: seed.clone(),
            seed_title,
            seed_channel,
            retrieved_at,
            total_iterations,
            trails,
        })
    }
}
