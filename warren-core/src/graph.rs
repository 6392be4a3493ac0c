//! Channel affinity graph and per-build visitation state.

use std::collections::HashMap;

use dashmap::DashSet;

use crate::model::{ChannelId, ChannelRef, VideoId};

/// A directed weighted graph of channel-to-channel recommendation affinity.
///
/// Nodes are channels keyed by identity (the latest-seen title is kept as
/// display metadata); an edge's weight is the accumulated co-recommendation
/// count observed across the whole exploration. Weights accumulate, never
/// overwrite: the same channel pair discovered via two different source
/// videos contributes the sum of both observations. Self-edges are excluded
/// by construction.
///
/// # Examples
/// ```
/// use warren_core::{ChannelGraph, ChannelRef};
///
/// let mut graph = ChannelGraph::new();
/// let from = ChannelRef::new("C1", "Seed");
/// let to = ChannelRef::new("C2", "Neighbour");
/// assert!(graph.record_edge(&from, &to, 3));
/// assert!(graph.record_edge(&from, &to, 5));
/// assert_eq!(graph.edge_weight(from.id(), to.id()), Some(8));
/// assert!(!graph.record_edge(&from, &from, 1));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ChannelGraph {
    titles: HashMap<ChannelId, String>,
    edges: HashMap<(ChannelId, ChannelId), u64>,
}

impl ChannelGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates `weight` on the directed edge `from → to`, registering
    /// both endpoints as nodes. Returns `false` without touching the graph
    /// when both references name the same channel: self-affinity carries no
    /// information about drift between channels.
    pub fn record_edge(&mut self, from: &ChannelRef, to: &ChannelRef, weight: u64) -> bool {
        if from.same_channel(to) {
            return false;
        }
        self.titles
            .insert(from.id().clone(), from.title().to_owned());
        self.titles.insert(to.id().clone(), to.title().to_owned());
        *self
            .edges
            .entry((from.id().clone(), to.id().clone()))
            .or_insert(0) += weight;
        true
    }

    /// Returns the accumulated weight of `from → to`, if the edge exists.
    #[must_use]
    pub fn edge_weight(&self, from: &ChannelId, to: &ChannelId) -> Option<u64> {
        self.edges.get(&(from.clone(), to.clone())).copied()
    }

    /// Returns the display title last observed for `channel`.
    #[must_use]
    pub fn title(&self, channel: &ChannelId) -> Option<&str> {
        self.titles.get(channel).map(String::as_str)
    }

    /// Returns the number of channels the graph knows about.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.titles.len()
    }

    /// Returns the number of directed edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Iterates nodes as `(id, title)` pairs, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = (&ChannelId, &str)> {
        self.titles.iter().map(|(id, title)| (id, title.as_str()))
    }

    /// Iterates edges as `(from, to, weight)`, in no particular order.
    pub fn edges(&self) -> impl Iterator<Item = (&ChannelId, &ChannelId, u64)> {
        self.edges
            .iter()
            .map(|((from, to), weight)| (from, to, *weight))
    }

    /// Folds `other` into this graph: titles take the newer value, edge
    /// weights accumulate. Lets a driver combine per-seed builds into one
    /// graph without violating the accumulation invariant.
    pub fn absorb(&mut self, other: Self) {
        for (id, title) in other.titles {
            self.titles.insert(id, title);
        }
        for (pair, weight) in other.edges {
            *self.edges.entry(pair).or_insert(0) += weight;
        }
    }
}

/// Videos already expanded within one network build.
///
/// Membership is keyed by video id, not channel: the same channel may be
/// re-expanded via a different video, but the same video never is — this
/// is what bounds recursion when the recommendation surface has cycles.
/// Owned exclusively by one build invocation; reusing it across seeds
/// would silently prune valid exploration.
#[derive(Debug, Default)]
pub struct VisitedSet {
    inner: DashSet<VideoId>,
}

impl VisitedSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `video` for expansion. Returns `true` only for the first
    /// caller; concurrent siblings racing on the same video get `false`.
    pub fn claim(&self, video: &VideoId) -> bool {
        self.inner.insert(video.clone())
    }

    /// Whether `video` has already been claimed.
    #[must_use]
    pub fn contains(&self, video: &VideoId) -> bool {
        self.inner.contains(video)
    }

    /// Returns how many videos have been claimed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether nothing has been claimed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
