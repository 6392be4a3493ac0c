//! Tests for the channel network builder.

mod common;

use std::num::NonZeroUsize;

use common::{MappedResolver, MappedSource, chan, vid};
use warren_core::{CancellationToken, ChannelId, NetworkBuilder, Sampler};

fn nz(value: usize) -> NonZeroUsize {
    NonZeroUsize::new(value).expect("test values are non-zero")
}

fn builder(precision: usize, top_n: usize, depth: usize, max_expansions: usize) -> NetworkBuilder {
    NetworkBuilder::new(
        Sampler::new(nz(precision), nz(top_n)),
        depth,
        nz(max_expansions),
    )
}

fn cid(id: &str) -> ChannelId {
    ChannelId::new(id)
}

#[test]
fn depth_zero_builds_an_empty_graph() {
    let source = MappedSource::new(vec![("V1", Ok(vec!["V2"]))]);
    let resolver = MappedResolver::new(vec![("V2", "C2")]);

    let graph = builder(3, 10, 0, 100).build(
        &source,
        &resolver,
        &vid("V1"),
        &chan("C1"),
        &CancellationToken::new(),
    );

    assert!(graph.is_empty());
    assert_eq!(source.fetches(), 0, "no expansion means no observation");
}

#[test]
fn immediate_neighbourhood_becomes_weighted_edges() {
    // One pass observes V2 twice and V3 once; both neighbours belong to
    // other channels, so both edges appear with the observation counts.
    let source = MappedSource::new(vec![("V1", Ok(vec!["V2", "V2", "V3"]))]);
    let resolver = MappedResolver::new(vec![("V2", "C2"), ("V3", "C3")]);

    let graph = builder(1, 10, 1, 100).build(
        &source,
        &resolver,
        &vid("V1"),
        &chan("C1"),
        &CancellationToken::new(),
    );

    assert_eq!(graph.edge_weight(&cid("C1"), &cid("C2")), Some(2));
    assert_eq!(graph.edge_weight(&cid("C1"), &cid("C3")), Some(1));
    assert_eq!(graph.edge_count(), 2);
}

#[test]
fn no_self_loop_and_same_channel_candidate_still_expands() {
    // V9 belongs to the seed's own channel: no edge is recorded for it,
    // but it is still expanded, which is how the C1 → C2 edge appears.
    let source = MappedSource::new(vec![("V1", Ok(vec!["V9"])), ("V9", Ok(vec!["V5"]))]);
    let resolver = MappedResolver::new(vec![("V9", "C1"), ("V5", "C2")]);

    let graph = builder(1, 10, 2, 100).build(
        &source,
        &resolver,
        &vid("V1"),
        &chan("C1"),
        &CancellationToken::new(),
    );

    assert_eq!(graph.edge_weight(&cid("C1"), &cid("C1")), None);
    assert_eq!(graph.edge_weight(&cid("C1"), &cid("C2")), Some(1));
    assert!(graph.edges().all(|(from, to, _)| from != to));
}

#[test]
fn edge_weights_accumulate_across_source_videos() {
    // Channel CA is discovered from two different videos of channel C2:
    // once with count 3 and once with count 5. The edge ends at 8.
    let source = MappedSource::new(vec![
        ("V1", Ok(vec!["V2", "V6"])),
        ("V2", Ok(vec!["V4", "V4", "V4"])),
        ("V6", Ok(vec!["V5", "V5", "V5", "V5", "V5"])),
    ]);
    let resolver = MappedResolver::new(vec![
        ("V2", "C2"),
        ("V6", "C2"),
        ("V4", "CA"),
        ("V5", "CA"),
    ]);

    let graph = builder(1, 10, 2, 100).build(
        &source,
        &resolver,
        &vid("V1"),
        &chan("C1"),
        &CancellationToken::new(),
    );

    assert_eq!(graph.edge_weight(&cid("C2"), &cid("CA")), Some(8));
}

#[test]
fn recommendation_cycles_terminate_and_expand_each_video_once() {
    let source = MappedSource::new(vec![("V1", Ok(vec!["V2"])), ("V2", Ok(vec!["V1"]))]);
    let resolver = MappedResolver::new(vec![("V1", "C1"), ("V2", "C2")]);

    let graph = builder(1, 10, 10, 100).build(
        &source,
        &resolver,
        &vid("V1"),
        &chan("C1"),
        &CancellationToken::new(),
    );

    // Re-expansion would inflate these weights beyond 1.
    assert_eq!(graph.edge_weight(&cid("C1"), &cid("C2")), Some(1));
    assert_eq!(graph.edge_weight(&cid("C2"), &cid("C1")), Some(1));
    assert_eq!(graph.node_count(), 2);
    assert_eq!(
        source.fetches(),
        2,
        "each video is observed by exactly one expansion pass"
    );
}

#[test]
fn failed_candidate_resolution_skips_only_that_candidate() {
    let source = MappedSource::new(vec![("V1", Ok(vec!["V2", "ghost", "V3"]))]);
    // "ghost" has no identity; the other candidates still contribute.
    let resolver = MappedResolver::new(vec![("V2", "C2"), ("V3", "C3")]);

    let graph = builder(1, 10, 1, 100).build(
        &source,
        &resolver,
        &vid("V1"),
        &chan("C1"),
        &CancellationToken::new(),
    );

    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.edge_weight(&cid("C1"), &cid("C2")), Some(1));
    assert_eq!(graph.edge_weight(&cid("C1"), &cid("C3")), Some(1));
}

#[test]
fn empty_ranking_ends_the_branch_quietly() {
    // V2 observes nothing: its branch ends, the graph keeps the V1 edges.
    let source = MappedSource::new(vec![("V1", Ok(vec!["V2"])), ("V2", Ok(vec![]))]);
    let resolver = MappedResolver::new(vec![("V2", "C2")]);

    let graph = builder(1, 10, 5, 100).build(
        &source,
        &resolver,
        &vid("V1"),
        &chan("C1"),
        &CancellationToken::new(),
    );

    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn expansion_budget_prunes_degenerate_exploration() {
    // An unbounded chain; the budget stops expansion after two videos no
    // matter how deep the recursion is allowed to go.
    let source = MappedSource::new(vec![
        ("V1", Ok(vec!["V2"])),
        ("V2", Ok(vec!["V3"])),
        ("V3", Ok(vec!["V4"])),
        ("V4", Ok(vec!["V5"])),
    ]);
    let resolver = MappedResolver::new(vec![
        ("V2", "C2"),
        ("V3", "C3"),
        ("V4", "C4"),
        ("V5", "C5"),
    ]);

    let graph = builder(1, 10, 100, 2).build(
        &source,
        &resolver,
        &vid("V1"),
        &chan("C1"),
        &CancellationToken::new(),
    );

    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.edge_weight(&cid("C1"), &cid("C2")), Some(1));
    assert_eq!(graph.edge_weight(&cid("C2"), &cid("C3")), Some(1));
    assert_eq!(graph.edge_weight(&cid("C3"), &cid("C4")), None);
}

#[test]
fn cancelled_build_returns_a_valid_partial_graph() {
    let source = MappedSource::new(vec![("V1", Ok(vec!["V2"]))]);
    let resolver = MappedResolver::new(vec![("V2", "C2")]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let graph = builder(1, 10, 3, 100).build(&source, &resolver, &vid("V1"), &chan("C1"), &cancel);

    // Cancelled before the first expansion: nothing was committed, and
    // nothing was corrupted.
    assert!(graph.is_empty());
    assert_eq!(source.fetches(), 0);
}

#[test]
fn top_n_bounds_the_recorded_neighbourhood() {
    let source = MappedSource::new(vec![(
        "V1",
        Ok(vec!["V2", "V2", "V2", "V3", "V3", "V4"]),
    )]);
    let resolver = MappedResolver::new(vec![("V2", "C2"), ("V3", "C3"), ("V4", "C4")]);

    let graph = builder(1, 2, 1, 100).build(
        &source,
        &resolver,
        &vid("V1"),
        &chan("C1"),
        &CancellationToken::new(),
    );

    // Only the two strongest candidates survive the ranking cut.
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.edge_weight(&cid("C1"), &cid("C4")), None);
}
