//! Diagnostic logging emitted by resolution and gestures.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use blanket_core::*;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Tracing Capture Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: Option<String>,
    fields: HashMap<String, String>,
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for EventCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.get("message").cloned();
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields,
        });
    }
}

fn with_captured_events<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        events: Arc::clone(&events),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
}

fn find<'a>(events: &'a [CapturedEvent], message: &str) -> Option<&'a CapturedEvent> {
    events.iter().find(|e| e.message.as_deref() == Some(message))
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn resolve_logs_summary() {
    let events = with_captured_events(|| {
        let _ = resolve(
            &ResolveInput {
                detents: &[Detent::CONTENT, Detent::fraction(0.5)],
                content_size: Size::new(390.0, 300.0),
                container_size: Size::new(390.0, 800.0),
                safe_area_bottom: 34.0,
            },
            &BlanketConfig::default(),
        );
    });

    let event = find(&events, "resolved detents").expect("resolve event");
    assert_eq!(event.level, tracing::Level::DEBUG);
    assert_eq!(event.fields.get("resolved").map(String::as_str), Some("2"));
    assert_eq!(event.fields.get("hidden_offset").map(String::as_str), Some("334"));
}

#[test]
fn early_drag_is_reported() {
    let events = with_captured_events(|| {
        let mut sheet = BlanketController::default();
        sheet.present();
        assert!(sheet.on_change(Vector::vertical(10.0)).is_none());
    });
    assert!(find(&events, "drag ignored: detents not resolved").is_some());
}

#[test]
fn release_logs_target() {
    let events = with_captured_events(|| {
        let mut sheet = BlanketController::default();
        sheet.present();
        sheet.set_container_size(Size::new(390.0, 800.0));
        sheet.set_content_size(Size::new(390.0, 300.0));
        sheet.set_detents([]);
        sheet.flush();
        sheet.on_change(Vector::vertical(1.0));
        sheet.on_change(Vector::vertical(80.0));
        sheet.on_end(Vector::ZERO);
    });

    let event = find(&events, "release: translating").expect("release event");
    assert_eq!(event.fields.get("dismiss").map(String::as_str), Some("true"));
    assert_eq!(event.fields.get("to").map(String::as_str), Some("300"));
}
