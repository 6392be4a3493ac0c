//! Autoplay trail walking.
//!
//! A walk follows the recommendation surface hop by hop: one raw
//! observation per hop, first candidate taken. Repeated walks from the
//! same seed diverge because the surface is non-deterministic; that
//! divergence is the object of study.

use std::num::NonZeroUsize;

use tracing::{debug, instrument};

use crate::{
    model::{Trail, TrailHop, VideoId},
    resolver::ChannelResolver,
    source::RecommendationSource,
};

/// Performs single fixed-length walks over the recommendation surface.
///
/// Unlike the network builder, the walker does not stabilize: each hop is
/// one single-shot observation, and the first recommended video wins.
#[derive(Clone, Debug)]
pub struct TrailWalker {
    degrees: NonZeroUsize,
}

impl TrailWalker {
    /// Creates a walker with the given hop count.
    #[must_use]
    pub const fn new(degrees: NonZeroUsize) -> Self {
        Self { degrees }
    }

    /// Returns the configured hop count.
    #[must_use]
    pub const fn degrees(&self) -> NonZeroUsize {
        self.degrees
    }

    /// Walks `degrees` hops from `seed`.
    ///
    /// Returns `None` if any hop fails — a fetch error, an empty
    /// observation, or a resolution failure — discarding partial progress.
    /// Trails are all-or-nothing because per-hop statistics downstream
    /// require equal-length trails.
    #[instrument(
        name = "walker.walk",
        skip(self, source, resolver),
        fields(seed = %seed, degrees = self.degrees.get()),
    )]
    pub fn walk<S, R>(&self, source: &S, resolver: &R, seed: &VideoId) -> Option<Trail>
    where
        S: RecommendationSource,
        R: ChannelResolver,
    {
        let mut hops = Vec::with_capacity(self.degrees.get());
        let mut current = seed.clone();
        for hop in 0..self.degrees.get() {
            let observation = match source.fetch_recommendations(&current) {
                Ok(observation) => observation,
                Err(error) => {
                    debug!(
                        hop,
                        code = error.code().as_str(),
                        %error,
                        "fetch failed, abandoning walk"
                    );
                    return None;
                }
            };
            let Some(next) = observation.into_iter().next() else {
                debug!(hop, "nothing recommended, abandoning walk");
                return None;
            };
            let attribution = match resolver.resolve(&next) {
                Ok(attribution) => attribution,
                Err(error) => {
                    debug!(
                        hop,
                        video = %next,
                        code = error.code().as_str(),
                        %error,
                        "resolution failed, abandoning walk"
                    );
                    return None;
                }
            };
            hops.push(TrailHop::new(
                attribution.into_channel(),
                next.clone(),
                current,
            ));
            current = next;
        }
        Some(Trail::from_hops(hops))
    }
}
