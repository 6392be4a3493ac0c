//! Recommendation sampling and stabilization.
//!
//! The recommendation surface is non-deterministic: two identical queries
//! can return different multisets. The sampler averages that noise by
//! merging `precision` independent observations into one frequency ranking.

use std::{collections::HashMap, num::NonZeroUsize};

use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::{
    model::{RankedVideo, StabilizedRanking, VideoId},
    source::{FetchError, RecommendationSource},
};

/// Merges repeated observations of a noisy recommendation source into a
/// stabilized frequency ranking.
///
/// `precision` is the number of observation passes attempted; `top_n` is
/// how many candidates the ranking retains. Failed passes are skipped, not
/// fatal: a sample where every pass failed is simply empty, which is itself
/// a meaningful signal (nothing expandable).
#[derive(Clone, Debug)]
pub struct Sampler {
    precision: NonZeroUsize,
    top_n: NonZeroUsize,
}

impl Sampler {
    /// Creates a sampler with the given pass count and retention width.
    #[must_use]
    pub const fn new(precision: NonZeroUsize, top_n: NonZeroUsize) -> Self {
        Self { precision, top_n }
    }

    /// Returns the configured number of observation passes.
    #[must_use]
    pub const fn precision(&self) -> NonZeroUsize {
        self.precision
    }

    /// Returns the configured ranking retention width.
    #[must_use]
    pub const fn top_n(&self) -> NonZeroUsize {
        self.top_n
    }

    /// Observes the recommendation surface `precision` times for `video`
    /// and merges the passes into a stabilized ranking.
    ///
    /// Passes run concurrently but merge in pass order, so observation
    /// counts and tie-breaks are deterministic for a given set of pass
    /// results: counts accumulate with multiset multiplicity, the ranking
    /// is non-increasing in count, and ties rank the video first observed
    /// (earliest pass, then earliest slot) higher. The result is truncated
    /// to `top_n` entries.
    #[instrument(
        name = "sampler.sample",
        skip(self, source),
        fields(
            source = %source.name(),
            video = %video,
            precision = self.precision.get(),
            top_n = self.top_n.get(),
        ),
    )]
    pub fn sample<S>(&self, source: &S, video: &VideoId) -> StabilizedRanking
    where
        S: RecommendationSource + Sync,
    {
        let passes: Vec<Result<Vec<VideoId>, FetchError>> = (0..self.precision.get())
            .into_par_iter()
            .map(|_pass| source.fetch_recommendations(video))
            .collect();

        let attempted = passes.len();
        let mut succeeded = 0_usize;
        let mut entries: Vec<(VideoId, u64)> = Vec::new();
        let mut slots: HashMap<VideoId, usize> = HashMap::new();
        for (pass, result) in passes.into_iter().enumerate() {
            let observation = match result {
                Ok(observation) => observation,
                Err(error) => {
                    warn!(
                        pass,
                        code = error.code().as_str(),
                        %error,
                        "observation failed, skipping pass"
                    );
                    continue;
                }
            };
            succeeded += 1;
            for observed in observation {
                if let Some(&slot) = slots.get(&observed) {
                    if let Some(entry) = entries.get_mut(slot) {
                        entry.1 += 1;
                    }
                } else {
                    slots.insert(observed.clone(), entries.len());
                    entries.push((observed, 1));
                }
            }
        }

        // Stable sort: first-seen order survives among equal counts.
        entries.sort_by(|left, right| right.1.cmp(&left.1));
        entries.truncate(self.top_n.get());

        debug!(
            attempted,
            succeeded,
            retained = entries.len(),
            "sample stabilized"
        );

        StabilizedRanking::from_merged(
            entries
                .into_iter()
                .map(|(observed, count)| RankedVideo::new(observed, count))
                .collect(),
        )
    }
}
