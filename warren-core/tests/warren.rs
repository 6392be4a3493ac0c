//! Tests for the `Warren` orchestration API and its instrumentation.

mod common;

use std::num::NonZeroUsize;
use std::sync::Arc;

use common::{MappedResolver, MappedSource, vid};
use rstest::rstest;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use warren_core::{
    CancellationToken, FetchError, Sampler, VideoId, WarrenBuilder, WarrenError, WarrenErrorCode,
};
use warren_test_support::CaptureLayer;

#[test]
fn builder_defaults() {
    let builder = WarrenBuilder::new();
    assert_eq!(builder.precision(), 20);
    assert_eq!(builder.top_n(), 20);
    assert_eq!(builder.degrees(), 6);
    assert_eq!(builder.iterations(), 20);
    assert_eq!(builder.depth(), 2);
    assert_eq!(builder.max_expansions(), 10_000);

    let warren = builder.build().expect("defaults must be valid");
    assert_eq!(warren.precision().get(), 20);
    assert_eq!(warren.degrees().get(), 6);
}

#[rstest]
#[case::precision(
    WarrenBuilder::new().with_precision(0),
    WarrenErrorCode::InvalidPrecision
)]
#[case::top_n(WarrenBuilder::new().with_top_n(0), WarrenErrorCode::InvalidTopN)]
#[case::degrees(WarrenBuilder::new().with_degrees(0), WarrenErrorCode::InvalidDegrees)]
#[case::iterations(
    WarrenBuilder::new().with_iterations(0),
    WarrenErrorCode::InvalidIterations
)]
#[case::max_expansions(
    WarrenBuilder::new().with_max_expansions(0),
    WarrenErrorCode::InvalidMaxExpansions
)]
fn builder_rejects_zero_knobs(#[case] builder: WarrenBuilder, #[case] expected: WarrenErrorCode) {
    let err = builder.build().expect_err("zero knobs must be rejected");
    assert_eq!(err.code(), expected);
}

#[test]
fn depth_zero_is_a_valid_configuration() {
    let warren = WarrenBuilder::new()
        .with_depth(0)
        .build()
        .expect("depth zero means no expansion, not an error");
    assert_eq!(warren.depth(), 0);
}

#[test]
fn facade_runs_the_trail_experiment() {
    let source = MappedSource::new(vec![("seed", Ok(vec!["A"])), ("A", Ok(vec!["seed"]))]);
    let resolver = MappedResolver::new(vec![("seed", "C0"), ("A", "C1")]);
    let warren = WarrenBuilder::new()
        .with_iterations(3)
        .with_degrees(2)
        .build()
        .expect("configuration must be valid");

    let result = warren
        .run_trails(&source, &resolver, &vid("seed"), &CancellationToken::new())
        .expect("run must succeed");

    assert_eq!(result.total_iterations(), 3);
    assert!(result.trails().iter().all(|trail| trail.len() == 2));
}

#[test]
fn facade_builds_the_network_from_a_resolved_seed() {
    let source = MappedSource::new(vec![("V1", Ok(vec!["V2"]))]);
    let resolver = MappedResolver::new(vec![("V1", "C1"), ("V2", "C2")]);
    let warren = WarrenBuilder::new()
        .with_precision(1)
        .with_depth(1)
        .build()
        .expect("configuration must be valid");

    let result = warren
        .build_network(&source, &resolver, &vid("V1"), &CancellationToken::new())
        .expect("seed resolves, build must succeed");

    assert_eq!(result.seed_video().as_str(), "V1");
    assert_eq!(result.seed().channel().id().as_str(), "C1");
    assert_eq!(result.graph().edge_count(), 1);
}

#[test]
fn facade_build_fails_when_the_seed_cannot_be_resolved() {
    let source = MappedSource::new(vec![]);
    let resolver = MappedResolver::new(vec![]);
    let warren = WarrenBuilder::new().build().expect("defaults must be valid");

    let err = warren
        .build_network(&source, &resolver, &vid("gone"), &CancellationToken::new())
        .expect_err("unresolvable seed must be fatal");

    assert!(matches!(err, WarrenError::SeedResolution { .. }));
    assert_eq!(
        err.resolution_code().map(|code| code.as_str()),
        Some("RESOLVE_NO_IDENTITY")
    );
}

#[test]
fn facade_depth_zero_builds_an_empty_graph() {
    let source = MappedSource::new(vec![("V1", Ok(vec!["V2"]))]);
    let resolver = MappedResolver::new(vec![("V1", "C1"), ("V2", "C2")]);
    let warren = WarrenBuilder::new()
        .with_depth(0)
        .build()
        .expect("configuration must be valid");

    let result = warren
        .build_network(&source, &resolver, &vid("V1"), &CancellationToken::new())
        .expect("build must succeed");

    assert!(result.graph().is_empty());
}

#[test]
fn build_network_records_an_instrumented_span() {
    let source = MappedSource::new(vec![("V1", Ok(vec!["V2"]))]);
    let resolver = MappedResolver::new(vec![("V1", "C1"), ("V2", "C2")]);
    let warren = WarrenBuilder::new()
        .with_precision(2)
        .with_top_n(5)
        .with_depth(1)
        .build()
        .expect("configuration must be valid");
    let layer = CaptureLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    tracing::subscriber::with_default(subscriber, || {
        warren
            .build_network(&source, &resolver, &vid("V1"), &CancellationToken::new())
            .expect("build must succeed");
    });

    let span = layer
        .span("warren.build_network")
        .expect("build span must be captured");
    assert_eq!(span.fields.get("seed").map(String::as_str), Some("V1"));
    assert_eq!(span.fields.get("depth").map(String::as_str), Some("1"));
    assert_eq!(span.fields.get("precision").map(String::as_str), Some("2"));
    assert_eq!(span.fields.get("top_n").map(String::as_str), Some("5"));
}

#[test]
fn sampler_warns_once_per_failed_pass() {
    struct HalfBroken {
        calls: std::sync::atomic::AtomicUsize,
    }

    impl warren_core::RecommendationSource for HalfBroken {
        fn name(&self) -> &str {
            "half-broken"
        }

        fn fetch_recommendations(
            &self,
            _video: &VideoId,
        ) -> Result<Vec<VideoId>, FetchError> {
            let call = self
                .calls
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            if call < 2 {
                Err(FetchError::Unreachable {
                    message: Arc::from("flaky"),
                })
            } else {
                Ok(vec![VideoId::new("X")])
            }
        }
    }

    let source = HalfBroken {
        calls: std::sync::atomic::AtomicUsize::new(0),
    };
    let sampler = Sampler::new(
        NonZeroUsize::new(5).expect("non-zero"),
        NonZeroUsize::new(10).expect("non-zero"),
    );
    let layer = CaptureLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    let ranking = tracing::subscriber::with_default(subscriber, || {
        sampler.sample(&source, &vid("seed"))
    });

    assert_eq!(ranking.len(), 1);
    assert_eq!(
        layer.event_count(Level::WARN, "observation failed, skipping pass"),
        2
    );
}

#[test]
fn runner_reports_completion_with_counts() {
    let source = MappedSource::new(vec![("seed", Ok(vec!["A"]))]);
    let resolver = MappedResolver::new(vec![("seed", "C0"), ("A", "C1")]);
    let warren = WarrenBuilder::new()
        .with_iterations(2)
        .with_degrees(1)
        .build()
        .expect("configuration must be valid");
    let layer = CaptureLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    tracing::subscriber::with_default(subscriber, || {
        warren
            .run_trails(&source, &resolver, &vid("seed"), &CancellationToken::new())
            .expect("run must succeed");
    });

    let completion = layer
        .events()
        .into_iter()
        .find(|event| {
            event
                .fields
                .get("message")
                .is_some_and(|message| message == "trail experiment completed")
        })
        .expect("completion event must be emitted");
    assert_eq!(completion.level, Level::INFO);
    assert_eq!(completion.fields.get("total").map(String::as_str), Some("2"));
    assert_eq!(
        completion.fields.get("successful").map(String::as_str),
        Some("2")
    );
}
