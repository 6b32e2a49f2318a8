//! Integration test verifying that `#[instrument]` annotations produce
//! spans on `CaKeyManager` operations.

#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};

use sshca_ca::{CaConfig, CaKeyManager, ConfigureCaRequest};
use sshca_storage::MemoryBackend;
use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt, registry::LookupSpan};

// ---------------------------------------------------------------------------
// Collecting layer — records span names as they are created
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct SpanCollector {
    spans: Arc<Mutex<Vec<String>>>,
}

impl<S> tracing_subscriber::Layer<S> for SpanCollector
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        _attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        if let Some(span) = ctx.span(id) {
            self.spans.lock().expect("lock poisoned").push(span.name().to_owned());
        }
    }
}

fn collect_spans() -> (Arc<Mutex<Vec<String>>>, tracing::subscriber::DefaultGuard) {
    let collector = SpanCollector::default();
    let spans = Arc::clone(&collector.spans);
    let subscriber = tracing_subscriber::registry().with(collector);
    (spans, tracing::subscriber::set_default(subscriber))
}

fn assert_spans(recorded: &[String], expected: &[&str]) {
    for name in expected {
        assert!(recorded.iter().any(|s| s == name), "expected a '{name}' span, got: {recorded:?}");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn configure_creates_spans() {
    let (spans, _guard) = collect_spans();

    let config = CaConfig::builder().key_bits(1024).build().expect("config");
    let manager = CaKeyManager::with_config(Arc::new(MemoryBackend::new()), config).expect("manager");
    manager.configure(&ConfigureCaRequest::default()).await.expect("configure");

    let recorded = spans.lock().expect("lock poisoned");
    assert_spans(&recorded, &["configure", "generate", "is_configured", "write_new", "write"]);
}

#[tokio::test]
async fn read_and_delete_create_spans() {
    let (spans, _guard) = collect_spans();

    let manager = CaKeyManager::new(Arc::new(MemoryBackend::new()));
    let _ = manager.public_key().await.expect("public_key");
    manager.delete().await.expect("delete");

    let recorded = spans.lock().expect("lock poisoned");
    assert_spans(&recorded, &["public_key", "read_logical", "delete"]);
}
