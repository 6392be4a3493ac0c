//! Command-line interface orchestration for warren.
//!
//! Offers an `autoplay` command (repeated fixed-length walks from a seed
//! video) and a `network` command (recursive channel affinity exploration
//! from a seed video or a channel's recent uploads).

mod commands;
mod output;

pub use commands::{
    AutoplayCommand, AutoplaySummary, Cli, CliError, Command, CommonArgs, ExecutionSummary,
    NetworkCommand, NetworkSummary, ResolverKind, render_summary, run_cli,
};
