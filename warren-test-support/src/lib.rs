//! Shared test utilities for the warren crates.
//!
//! Provides a tracing layer that captures spans and events so test suites
//! can assert on instrumentation deterministically instead of scraping
//! formatted log output.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

/// Snapshot of a closed span: its name and the fields recorded on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedSpan {
    /// Span name from the tracing metadata.
    pub name: String,
    /// Fields recorded at creation time or later via `Span::record`.
    pub fields: HashMap<String, String>,
}

/// Snapshot of an emitted event: level, target, and fields (the message
/// lands under the `message` key).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    /// Level the event was emitted at.
    pub level: Level,
    /// Module target from the metadata.
    pub target: String,
    /// Structured fields attached to the event.
    pub fields: HashMap<String, String>,
}

#[derive(Debug, Default)]
struct Captured {
    spans: Vec<CapturedSpan>,
    events: Vec<CapturedEvent>,
}

/// Layer installed during tests to capture spans and events for later
/// assertions.
///
/// # Examples
/// ```
/// use tracing_subscriber::layer::SubscriberExt;
/// use warren_test_support::CaptureLayer;
///
/// let layer = CaptureLayer::default();
/// let subscriber = tracing_subscriber::registry().with(layer.clone());
/// tracing::subscriber::with_default(subscriber, || {
///     tracing::info!(answer = 42, "computed");
/// });
/// let events = layer.events();
/// assert_eq!(events.len(), 1);
/// assert_eq!(events[0].fields.get("answer").map(String::as_str), Some("42"));
/// ```
#[derive(Clone, Default)]
pub struct CaptureLayer {
    captured: Arc<Mutex<Captured>>,
}

impl CaptureLayer {
    /// Returns the spans closed so far, in completion order.
    #[must_use]
    pub fn spans(&self) -> Vec<CapturedSpan> {
        self.captured.lock().expect("capture lock poisoned").spans.clone()
    }

    /// Returns the events emitted so far, in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.captured
            .lock()
            .expect("capture lock poisoned")
            .events
            .clone()
    }

    /// Returns the first closed span with the given name, if any.
    #[must_use]
    pub fn span(&self, name: &str) -> Option<CapturedSpan> {
        self.spans().into_iter().find(|span| span.name == name)
    }

    /// Counts events at `level` whose `message` field equals `message`.
    #[must_use]
    pub fn event_count(&self, level: Level, message: &str) -> usize {
        self.events()
            .iter()
            .filter(|event| {
                event.level == level
                    && event
                        .fields
                        .get("message")
                        .is_some_and(|value| value == message)
            })
            .count()
    }
}

#[derive(Default)]
struct SpanFields {
    name: String,
    fields: HashMap<String, String>,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        ctx: Context<'_, S>,
    ) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut data = SpanFields {
            name: attrs.metadata().name().to_owned(),
            ..SpanFields::default()
        };
        attrs.record(&mut StringVisitor(&mut data.fields));
        span.extensions_mut().insert(data);
    }

    fn on_record(
        &self,
        id: &tracing::span::Id,
        values: &tracing::span::Record<'_>,
        ctx: Context<'_, S>,
    ) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut extensions = span.extensions_mut();
        if let Some(data) = extensions.get_mut::<SpanFields>() {
            values.record(&mut StringVisitor(&mut data.fields));
        }
    }

    fn on_close(&self, id: tracing::span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        let Some(data) = span.extensions_mut().remove::<SpanFields>() else {
            return;
        };
        self.captured
            .lock()
            .expect("capture lock poisoned")
            .spans
            .push(CapturedSpan {
                name: data.name,
                fields: data.fields,
            });
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        event.record(&mut StringVisitor(&mut fields));
        self.captured
            .lock()
            .expect("capture lock poisoned")
            .events
            .push(CapturedEvent {
                level: *event.metadata().level(),
                target: event.metadata().target().to_owned(),
                fields,
            });
    }
}

/// Renders every recorded field to a string; warren's instrumentation only
/// emits strings, integers, booleans, and Display/Debug values.
struct StringVisitor<'a>(&'a mut HashMap<String, String>);

impl Visit for StringVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_owned(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_owned(), value.to_owned());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.0.insert(field.name().to_owned(), value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(field.name().to_owned(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(field.name().to_owned(), value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.0.insert(field.name().to_owned(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn captures_span_fields_across_record_calls() {
        let layer = CaptureLayer::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());
        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("unit.work", stage = "begin");
            let _guard = span.enter();
        });
        let span = layer.span("unit.work").expect("span must be captured");
        assert_eq!(span.fields.get("stage").map(String::as_str), Some("begin"));
    }

    #[test]
    fn event_count_matches_level_and_message() {
        let layer = CaptureLayer::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("skipped");
            tracing::warn!("skipped");
            tracing::info!("skipped");
        });
        assert_eq!(layer.event_count(Level::WARN, "skipped"), 2);
        assert_eq!(layer.event_count(Level::INFO, "skipped"), 1);
    }
}
