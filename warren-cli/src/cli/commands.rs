//! Command implementations and argument parsing for the warren CLI.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::ProgressBar;
use thiserror::Error;
use tracing::{Span, field, info, instrument, warn};

use warren_core::{
    CancellationToken, ChannelGraph, ChannelResolver, FetchError, RecommendationSource,
    ResolutionError, VideoAttribution, VideoId, Warren, WarrenBuilder, WarrenError,
};
use warren_providers_api::{DataApiError, DataApiResolver};
use warren_providers_web::{
    OembedResolver, UploadsLister, WatchPageSource, WebClient, WebClientConfig, WebProviderError,
};

use super::output;

const LABEL_TITLE_CHARS: usize = 30;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "warren", about = "Explore a video platform's recommendation graph.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the autoplay experiment: repeated fixed-length walks from a seed.
    Autoplay(AutoplayCommand),
    /// Build a channel affinity network by recursive exploration.
    Network(NetworkCommand),
}

/// Options accepted by the `autoplay` command.
#[derive(Debug, Args, Clone)]
pub struct AutoplayCommand {
    /// Seed video id.
    pub seed: String,

    /// Walks to attempt.
    #[arg(long, short = 'n', default_value_t = 20)]
    pub iterations: usize,

    /// Hops per walk.
    #[arg(long, default_value_t = 6)]
    pub degrees: usize,

    /// Shared provider options.
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Options accepted by the `network` command.
#[derive(Debug, Args, Clone)]
pub struct NetworkCommand {
    /// Seed video id, or a channel slug with `--from-channel`.
    pub seed: String,

    /// Treat the seed as a channel slug and explore from its uploads.
    #[arg(long, default_value_t = false)]
    pub from_channel: bool,

    /// Uploads to expand when seeding from a channel.
    #[arg(long, default_value_t = 20)]
    pub uploads: usize,

    /// Observation passes per stabilized sample.
    #[arg(long, short = 'p', default_value_t = 20)]
    pub precision: usize,

    /// Recursion depth bound.
    #[arg(long, short = 'd', default_value_t = 2)]
    pub depth: usize,

    /// Candidates retained per stabilized ranking.
    #[arg(long, default_value_t = 20)]
    pub top_n: usize,

    /// Defensive cap on total video expansions.
    #[arg(long, default_value_t = 10_000)]
    pub max_expansions: usize,

    /// Shared provider options.
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Provider options shared by both commands.
#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    /// Identity resolution strategy.
    #[arg(long, value_enum, default_value_t = ResolverKind::Oembed)]
    pub resolver: ResolverKind,

    /// API key for the data-api resolver.
    #[arg(long, env = "WARREN_API_KEY")]
    pub api_key: Option<String>,

    /// Hard per-call timeout in seconds.
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Output directory.
    #[arg(long, default_value = "data")]
    pub out: PathBuf,
}

/// Supported identity resolution strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResolverKind {
    /// Lightweight embed-info lookup; no key, no canonical channel ids.
    Oembed,
    /// Structured Data API lookup; needs a key, returns canonical ids.
    Api,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while writing results.
    #[error("failed to write `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// JSON serialization of a result payload failed.
    #[error("failed to serialize `{path}`: {source}")]
    Json {
        /// Path that was being written.
        path: PathBuf,
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },
    /// The data-api resolver was selected without a key.
    #[error("the data-api resolver needs an api key (--api-key or WARREN_API_KEY)")]
    MissingApiKey,
    /// Listing a channel's uploads failed outright.
    #[error("failed to list uploads for `{slug}`: {source}")]
    Uploads {
        /// The channel slug whose uploads were requested.
        slug: String,
        /// Underlying fetch failure.
        #[source]
        source: FetchError,
    },
    /// Web provider construction failed.
    #[error(transparent)]
    Web(#[from] WebProviderError),
    /// Data API resolver construction failed.
    #[error(transparent)]
    Api(#[from] DataApiError),
    /// Core orchestration failed.
    #[error(transparent)]
    Core(#[from] WarrenError),
}

/// Configured resolver strategy, dispatched at runtime.
pub(super) enum ResolverChoice {
    Oembed(OembedResolver),
    Api(DataApiResolver),
}

impl ChannelResolver for ResolverChoice {
    fn name(&self) -> &str {
        match self {
            Self::Oembed(resolver) => resolver.name(),
            Self::Api(resolver) => resolver.name(),
        }
    }

    fn resolve(&self, video: &VideoId) -> Result<VideoAttribution, ResolutionError> {
        match self {
            Self::Oembed(resolver) => resolver.resolve(video),
            Self::Api(resolver) => resolver.resolve(video),
        }
    }
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub enum ExecutionSummary {
    /// Outcome of the autoplay experiment.
    Autoplay(AutoplaySummary),
    /// Outcome of the network build.
    Network(NetworkSummary),
}

/// What the autoplay command produced.
#[derive(Debug, Clone)]
pub struct AutoplaySummary {
    /// Display title of the seed video.
    pub seed_title: String,
    /// Walks attempted.
    pub total_iterations: usize,
    /// Walks that reached full length.
    pub successful_iterations: usize,
    /// Path of the JSON payload.
    pub data_path: PathBuf,
    /// Path of the per-degree report.
    pub report_path: PathBuf,
}

/// What the network command produced.
#[derive(Debug, Clone)]
pub struct NetworkSummary {
    /// Label describing the exploration origin.
    pub label: String,
    /// Channels discovered.
    pub channels: usize,
    /// Directed edges recorded.
    pub edges: usize,
    /// Path of the GraphML file.
    pub network_path: PathBuf,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when provider construction, execution, or output
/// writing fails.
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Autoplay(command) => {
            Span::current().record("command", field::display("autoplay"));
            let client = web_client(&command.common)?;
            let source = WatchPageSource::new(client.clone())?;
            let resolver = build_resolver(&command.common, &client)?;
            run_autoplay(&command, &source, &resolver).map(ExecutionSummary::Autoplay)
        }
        Command::Network(command) => {
            Span::current().record("command", field::display("network"));
            let client = web_client(&command.common)?;
            let source = WatchPageSource::new(client.clone())?;
            let resolver = build_resolver(&command.common, &client)?;
            let summary = if command.from_channel {
                let lister = UploadsLister::new(client)?;
                let uploads =
                    lister
                        .latest_uploads(&command.seed)
                        .map_err(|source| CliError::Uploads {
                            slug: command.seed.clone(),
                            source,
                        })?;
                let seeds: Vec<VideoId> = uploads.into_iter().take(command.uploads).collect();
                info!(slug = command.seed.as_str(), seeds = seeds.len(), "seeding from uploads");
                run_network(&command, &source, &resolver, &seeds, Some(&command.seed))?
            } else {
                let seeds = vec![VideoId::new(command.seed.clone())];
                run_network(&command, &source, &resolver, &seeds, None)?
            };
            Ok(ExecutionSummary::Network(summary))
        }
    }
}

fn web_client(common: &CommonArgs) -> Result<WebClient, CliError> {
    let config =
        WebClientConfig::new().with_timeout(Duration::from_secs(common.timeout_secs));
    Ok(WebClient::new(config)?)
}

fn build_resolver(common: &CommonArgs, client: &WebClient) -> Result<ResolverChoice, CliError> {
    match common.resolver {
        ResolverKind::Oembed => Ok(ResolverChoice::Oembed(OembedResolver::new(client.clone()))),
        ResolverKind::Api => {
            let api_key = common.api_key.clone().ok_or(CliError::MissingApiKey)?;
            Ok(ResolverChoice::Api(DataApiResolver::with_timeout(
                api_key,
                Duration::from_secs(common.timeout_secs),
            )?))
        }
    }
}

#[instrument(
    name = "cli.autoplay",
    err,
    skip(command, source, resolver),
    fields(seed = command.seed.as_str(), iterations = command.iterations, degrees = command.degrees),
)]
pub(super) fn run_autoplay<S, R>(
    command: &AutoplayCommand,
    source: &S,
    resolver: &R,
) -> Result<AutoplaySummary, CliError>
where
    S: RecommendationSource + Sync,
    R: ChannelResolver + Sync,
{
    let warren = WarrenBuilder::new()
        .with_iterations(command.iterations)
        .with_degrees(command.degrees)
        .build()?;
    let seed = VideoId::new(command.seed.clone());

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("walking {} trails", command.iterations));
    spinner.enable_steady_tick(Duration::from_millis(120));
    let result = warren.run_trails(source, resolver, &seed, &CancellationToken::new());
    spinner.finish_and_clear();
    let result = result?;

    let stamp = timestamp();
    let data_path = command
        .common
        .out
        .join(format!("{}_autoplay_data_{stamp}.json", sanitize(command.seed.as_str())));
    let report_path = command
        .common
        .out
        .join(format!("{}_autoplay_results_{stamp}.csv", sanitize(command.seed.as_str())));
    output::write_json(&data_path, &result)?;
    output::write_degree_report(&report_path, &result, command.degrees)?;

    info!(
        successful = result.successful_iterations(),
        total = result.total_iterations(),
        "autoplay experiment written"
    );
    Ok(AutoplaySummary {
        seed_title: result.seed_title().to_owned(),
        total_iterations: result.total_iterations(),
        successful_iterations: result.successful_iterations(),
        data_path,
        report_path,
    })
}

#[instrument(
    name = "cli.network",
    err,
    skip(command, source, resolver, seeds, label),
    fields(seeds = seeds.len(), depth = command.depth, precision = command.precision),
)]
pub(super) fn run_network<S, R>(
    command: &NetworkCommand,
    source: &S,
    resolver: &R,
    seeds: &[VideoId],
    label: Option<&str>,
) -> Result<NetworkSummary, CliError>
where
    S: RecommendationSource + Sync,
    R: ChannelResolver + Sync,
{
    let warren = warren_from(command)?;
    let cancel = CancellationToken::new();
    let progress = ProgressBar::new(seeds.len() as u64);

    let mut graph = ChannelGraph::new();
    let mut derived_label: Option<String> = None;
    for seed in seeds {
        match warren.build_network(source, resolver, seed, &cancel) {
            Ok(result) => {
                if derived_label.is_none() {
                    derived_label = Some(seed_label(result.seed()));
                }
                graph.absorb(result.into_graph());
            }
            // A channel-seeded run keeps going when one upload has gone
            // private; a single-seed run has nothing left to do.
            Err(error) if seeds.len() > 1 => {
                warn!(seed = %seed, %error, "skipping seed");
            }
            Err(error) => return Err(error.into()),
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    let chosen_label = label
        .map(ToOwned::to_owned)
        .or(derived_label)
        .unwrap_or_else(|| "network".to_owned());
    let stamp = timestamp();
    let network_path = command
        .common
        .out
        .join(format!("{}_{stamp}.graphml", sanitize(&chosen_label)));
    output::write_graphml(&network_path, &graph)?;

    info!(
        channels = graph.node_count(),
        edges = graph.edge_count(),
        "network written"
    );
    Ok(NetworkSummary {
        label: chosen_label,
        channels: graph.node_count(),
        edges: graph.edge_count(),
        network_path,
    })
}

fn warren_from(command: &NetworkCommand) -> Result<Warren, CliError> {
    Ok(WarrenBuilder::new()
        .with_precision(command.precision)
        .with_top_n(command.top_n)
        .with_depth(command.depth)
        .with_max_expansions(command.max_expansions)
        .build()?)
}

fn seed_label(attribution: &VideoAttribution) -> String {
    let title: String = attribution
        .video_title()
        .chars()
        .take(LABEL_TITLE_CHARS)
        .collect();
    format!("{}_{title}", attribution.channel().title())
}

fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H_%M_%S").to_string()
}

pub(super) fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '@' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::Autoplay(autoplay) => {
            writeln!(writer, "seed: {}", autoplay.seed_title)?;
            writeln!(
                writer,
                "trails: {}/{}",
                autoplay.successful_iterations, autoplay.total_iterations
            )?;
            writeln!(writer, "data: {}", autoplay.data_path.display())?;
            writeln!(writer, "report: {}", autoplay.report_path.display())?;
        }
        ExecutionSummary::Network(network) => {
            writeln!(writer, "network: {}", network.label)?;
            writeln!(writer, "channels: {}", network.channels)?;
            writeln!(writer, "edges: {}", network.edges)?;
            writeln!(writer, "graphml: {}", network.network_path.display())?;
        }
    }
    Ok(())
}
