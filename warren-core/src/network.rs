//! Depth-limited recursive exploration of channel affinity.
//!
//! From a seed video the builder samples a stabilized neighbourhood,
//! resolves each candidate to its channel, folds edges into the shared
//! graph, and then descends into unvisited candidates. Sibling branches
//! run concurrently; the visited set and the graph are the only shared
//! state, guarded by an atomic claim and a mutex respectively.

use std::num::NonZeroUsize;
use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicUsize, Ordering},
};

use rayon::prelude::*;
use tracing::{debug, instrument, trace, warn};

use crate::{
    cancel::CancellationToken,
    graph::{ChannelGraph, VisitedSet},
    model::{ChannelRef, VideoAttribution, VideoId},
    resolver::ChannelResolver,
    sampler::Sampler,
    source::RecommendationSource,
};

/// A completed network build: the seed's attribution and the affinity
/// graph grown from it.
#[derive(Clone, Debug)]
pub struct NetworkResult {
    seed_video: VideoId,
    seed: VideoAttribution,
    graph: ChannelGraph,
}

impl NetworkResult {
    pub(crate) fn new(seed_video: VideoId, seed: VideoAttribution, graph: ChannelGraph) -> Self {
        Self {
            seed_video,
            seed,
            graph,
        }
    }

    /// Returns the seed video the build started from.
    #[must_use]
    pub fn seed_video(&self) -> &VideoId {
        &self.seed_video
    }

    /// Returns the seed video's attribution.
    #[must_use]
    pub fn seed(&self) -> &VideoAttribution {
        &self.seed
    }

    /// Returns the built graph.
    #[must_use]
    pub fn graph(&self) -> &ChannelGraph {
        &self.graph
    }

    /// Consumes the result, returning the graph.
    #[must_use]
    pub fn into_graph(self) -> ChannelGraph {
        self.graph
    }
}

/// One resolved neighbour of an expanded video.
#[derive(Clone, Debug)]
struct Neighbour {
    video: VideoId,
    channel: ChannelRef,
    observations: u64,
}

/// Builds a channel affinity graph by depth-limited recursive exploration.
#[derive(Clone, Debug)]
pub struct NetworkBuilder {
    sampler: Sampler,
    depth: usize,
    max_expansions: NonZeroUsize,
}

struct BuildState<'a> {
    graph: Mutex<ChannelGraph>,
    visited: VisitedSet,
    expansions: AtomicUsize,
    cancel: &'a CancellationToken,
}

impl NetworkBuilder {
    /// Creates a builder that samples with `sampler`, recurses at most
    /// `depth` levels, and expands at most `max_expansions` videos total.
    ///
    /// `depth` and the sampler's retention width are independent knobs:
    /// one bounds how far exploration reaches, the other how wide each
    /// neighbourhood is.
    #[must_use]
    pub const fn new(
        sampler: Sampler,
        depth: usize,
        max_expansions: NonZeroUsize,
    ) -> Self {
        Self {
            sampler,
            depth,
            max_expansions,
        }
    }

    /// Returns the configured recursion bound.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the defensive total-expansion budget.
    #[must_use]
    pub const fn max_expansions(&self) -> NonZeroUsize {
        self.max_expansions
    }

    /// Explores from `seed_video` (owned by `seed_channel`) and returns the
    /// accumulated affinity graph.
    ///
    /// A `depth` of zero returns an empty graph for any seed. Fetch and
    /// resolution failures skip the affected candidate only. Cancellation
    /// aborts outstanding expansions promptly; everything committed before
    /// the abort remains a valid partial graph, because each expanded
    /// node's immediate neighbourhood is recorded in full before any
    /// deeper recursion starts.
    #[instrument(
        name = "network.build",
        skip(self, source, resolver, cancel),
        fields(
            source = %source.name(),
            resolver = %resolver.name(),
            seed = %seed_video,
            channel = %seed_channel.id(),
            depth = self.depth,
        ),
    )]
    pub fn build<S, R>(
        &self,
        source: &S,
        resolver: &R,
        seed_video: &VideoId,
        seed_channel: &ChannelRef,
        cancel: &CancellationToken,
    ) -> ChannelGraph
    where
        S: RecommendationSource + Sync,
        R: ChannelResolver + Sync,
    {
        let state = BuildState {
            graph: Mutex::new(ChannelGraph::new()),
            visited: VisitedSet::new(),
            expansions: AtomicUsize::new(0),
            cancel,
        };
        self.expand(&state, source, resolver, seed_video, seed_channel, self.depth);
        debug!(
            expanded = state.visited.len(),
            "network build finished"
        );
        state
            .graph
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn expand<S, R>(
        &self,
        state: &BuildState<'_>,
        source: &S,
        resolver: &R,
        video: &VideoId,
        channel: &ChannelRef,
        depth: usize,
    ) where
        S: RecommendationSource + Sync,
        R: ChannelResolver + Sync,
    {
        if depth == 0 {
            trace!(%video, "recursion budget reached");
            return;
        }
        if state.cancel.is_cancelled() {
            debug!(%video, "cancelled before expansion");
            return;
        }
        if !state.visited.claim(video) {
            return;
        }
        let expanded_so_far = state.expansions.fetch_add(1, Ordering::Relaxed);
        if expanded_so_far >= self.max_expansions.get() {
            warn!(
                limit = self.max_expansions.get(),
                %video,
                "expansion budget exhausted, pruning"
            );
            return;
        }

        let ranking = self.sampler.sample(source, video);
        if ranking.is_empty() {
            debug!(%video, "no expandable recommendations");
            return;
        }

        // Resolve the immediate neighbourhood concurrently, rank order
        // preserved; a candidate that fails to resolve is skipped.
        let neighbourhood: Vec<Neighbour> = ranking
            .entries()
            .par_iter()
            .filter_map(|entry| match resolver.resolve(entry.video()) {
                Ok(attribution) => Some(Neighbour {
                    video: entry.video().clone(),
                    channel: attribution.into_channel(),
                    observations: entry.observations(),
                }),
                Err(error) => {
                    warn!(
                        video = %entry.video(),
                        code = error.code().as_str(),
                        %error,
                        "candidate resolution failed, skipping"
                    );
                    None
                }
            })
            .collect();

        // The whole neighbourhood commits before any deeper descent, so an
        // interrupted run still holds complete immediate-neighbour edges
        // for every expanded node.
        {
            let mut graph = state
                .graph
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            for neighbour in &neighbourhood {
                graph.record_edge(channel, &neighbour.channel, neighbour.observations);
            }
        }

        neighbourhood.into_par_iter().for_each(|neighbour| {
            if state.cancel.is_cancelled() || state.visited.contains(&neighbour.video) {
                return;
            }
            self.expand(
                state,
                source,
                resolver,
                &neighbour.video,
                &neighbour.channel,
                depth - 1,
            );
        });
    }
}
