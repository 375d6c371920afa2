//! Tests for the tracing events emitted while mapping

mod common;

use common::{Root, User};
use protomap::MapperCache;
use protomap::prelude::*;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::prelude::*;

/// Layer that keeps the level and message of every event it sees
#[derive(Clone, Default)]
struct CaptureLayer {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl CaptureLayer {
    fn messages_at(&self, level: Level) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.0));
    }
}

#[test]
fn test_classification_logs_each_record_at_debug() {
    let layer = CaptureLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    tracing::subscriber::with_default(subscriber, || {
        Mapper::default().encode(&Root::default()).unwrap();
    });

    let classified = layer
        .messages_at(Level::DEBUG)
        .into_iter()
        .filter(|m| m == "classified record")
        .count();
    // Root, Outer and Inner
    assert_eq!(classified, 3);
}

#[test]
fn test_cache_hits_log_at_trace_only() {
    let layer = CaptureLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let mapper = Mapper::default().with_cache(Arc::new(MapperCache::new()));

    tracing::subscriber::with_default(subscriber, || {
        mapper.node_for::<User>().unwrap();
        mapper.node_for::<User>().unwrap();
    });

    assert!(layer.messages_at(Level::INFO).is_empty());
    assert!(layer.messages_at(Level::WARN).is_empty());
    assert!(!layer.messages_at(Level::TRACE).is_empty());
}

#[test]
fn test_failures_are_returned_not_logged_as_errors() {
    let layer = CaptureLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    tracing::subscriber::with_default(subscriber, || {
        let mut user = User::default();
        let err = Mapper::default().decode(b"not json", &mut user).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedJson);
    });

    assert!(layer.messages_at(Level::ERROR).is_empty());
}
