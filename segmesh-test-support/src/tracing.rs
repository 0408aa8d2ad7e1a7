//! In-memory tracing capture for assertions on spans and events.
//!
//! Install a [`RecordingLayer`] on a registry for the duration of a closure,
//! then query what was emitted:
//!
//! ```
//! use segmesh_test_support::tracing::RecordingLayer;
//! use tracing_subscriber::layer::SubscriberExt;
//!
//! let layer = RecordingLayer::default();
//! let subscriber = tracing_subscriber::registry().with(layer.clone());
//! tracing::subscriber::with_default(subscriber, || {
//!     let span = tracing::info_span!("core.demo", meshes = 2_u64);
//!     let _entered = span.enter();
//!     tracing::info!(merges = 3_u64, "demo finished");
//! });
//! let span = layer.span("core.demo").expect("span closed");
//! assert_eq!(span.field("meshes"), Some("2"));
//! assert!(layer.has_event(tracing::Level::INFO, "demo finished"));
//! ```

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
    span::{Attributes, Id, Record},
};
use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};

/// Layer that stores closed spans and emitted events.
#[derive(Clone, Default)]
pub struct RecordingLayer {
    spans: Arc<Mutex<Vec<SpanRecord>>>,
    events: Arc<Mutex<Vec<EventRecord>>>,
}

impl RecordingLayer {
    /// Snapshot of closed spans in completion order.
    #[must_use]
    pub fn spans(&self) -> Vec<SpanRecord> {
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of events in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<EventRecord> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the first closed span called `name`.
    #[must_use]
    pub fn span(&self, name: &str) -> Option<SpanRecord> {
        self.spans().into_iter().find(|span| span.name == name)
    }

    /// Returns every event at `level` whose message equals `message`.
    #[must_use]
    pub fn events_with(&self, level: Level, message: &str) -> Vec<EventRecord> {
        self.events()
            .into_iter()
            .filter(|event| event.level == level && event.message() == Some(message))
            .collect()
    }

    /// Returns `true` when an event at `level` carried `message`.
    #[must_use]
    pub fn has_event(&self, level: Level, message: &str) -> bool {
        !self.events_with(level, message).is_empty()
    }
}

/// A closed span and its recorded fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanRecord {
    /// Span name from the metadata.
    pub name: String,
    /// Fields recorded at creation or later through `Span::record`.
    pub fields: HashMap<String, String>,
}

impl SpanRecord {
    /// Returns a recorded field rendered as text.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// An emitted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Event level.
    pub level: Level,
    /// Event target (usually the emitting module path).
    pub target: String,
    /// Structured fields, including `message`.
    pub fields: HashMap<String, String>,
}

impl EventRecord {
    /// Returns the formatted `message` field, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.field("message")
    }

    /// Returns a recorded field rendered as text.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

struct OpenSpan {
    name: String,
    fields: HashMap<String, String>,
}

impl<S> Layer<S> for RecordingLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut fields = HashMap::new();
        attrs.record(&mut Fields(&mut fields));
        span.extensions_mut().insert(OpenSpan {
            name: attrs.metadata().name().to_owned(),
            fields,
        });
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        if let Some(open) = span.extensions_mut().get_mut::<OpenSpan>() {
            values.record(&mut Fields(&mut open.fields));
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        let Some(open) = span.extensions_mut().remove::<OpenSpan>() else {
            return;
        };
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SpanRecord {
                name: open.name,
                fields: open.fields,
            });
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        event.record(&mut Fields(&mut fields));
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(EventRecord {
                level: *event.metadata().level(),
                target: event.metadata().target().to_owned(),
                fields,
            });
    }
}

/// Renders every field as text; numbers and booleans use `Display`.
struct Fields<'a>(&'a mut HashMap<String, String>);

impl Fields<'_> {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_owned(), value);
    }
}

impl Visit for Fields<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_owned());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, value.to_string());
    }
}
