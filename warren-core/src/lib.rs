//! Warren core library.
//!
//! Samples a video platform's noisy recommendation surface, resolves
//! recommended videos to their owning channels, and aggregates the
//! observations into autoplay trails or a channel affinity graph.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod cancel;
mod error;
mod experiment;
mod graph;
mod model;
mod network;
mod report;
mod resolver;
mod sampler;
mod source;
mod trail;
mod warren;

pub use crate::{
    builder::WarrenBuilder,
    cancel::CancellationToken,
    error::{Result, WarrenError, WarrenErrorCode},
    experiment::{ExperimentResult, ExperimentRunner},
    graph::{ChannelGraph, VisitedSet},
    model::{
        ChannelId, ChannelRef, RankedVideo, RankingOrderError, StabilizedRanking, Trail, TrailHop,
        VideoAttribution, VideoId,
    },
    network::{NetworkBuilder, NetworkResult},
    report::hop_channel_frequencies,
    resolver::{ChannelResolver, ResolutionError, ResolutionErrorCode},
    sampler::Sampler,
    source::{FetchError, FetchErrorCode, RecommendationSource},
    trail::TrailWalker,
    warren::Warren,
};
