//! Tracing bridge tests.

use cloud_log_handler::observability::CloudLoggingLayer;
use cloud_log_handler::{CloudLoggingHandler, Options, Severity};
use tracing_subscriber::layer::SubscriberExt;

mod common;
use common::{test_config, RecordingSink};

#[test]
fn test_events_become_records() {
    let sink = RecordingSink::new();
    let handler = CloudLoggingHandler::with_sink(Options::new(test_config()), sink.clone())
        .unwrap()
        .with_group("app");
    let subscriber = tracing_subscriber::registry().with(CloudLoggingLayer::new(handler));

    tracing::subscriber::with_default(subscriber, || {
        tracing::warn!(user = "alice", attempts = 3_i64, ok = false, "login throttled");
        tracing::debug!("below the handler minimum");
        tracing::error!(latency = 1.5, "backend timeout");
    });

    let entries = sink.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].severity, Severity::Warning);
    assert_eq!(entries[1].severity, Severity::Error);

    let first = sink.payload(0);
    assert_eq!(first["msg"], "login throttled");
    assert_eq!(first["level"], "WARN");
    assert_eq!(first["app"]["user"], "alice");
    assert_eq!(first["app"]["attempts"], 3);
    assert_eq!(first["app"]["ok"], false);
    assert!(first["source"]["file"]
        .as_str()
        .unwrap()
        .ends_with("bridge.rs"));

    let second = sink.payload(1);
    assert_eq!(second["msg"], "backend timeout");
    assert_eq!(second["app"]["latency"], 1.5);
}

#[test]
fn test_internal_events_not_forwarded() {
    let sink = RecordingSink::new();
    let handler = CloudLoggingHandler::with_sink(Options::new(test_config()), sink.clone()).unwrap();
    let subscriber = tracing_subscriber::registry().with(CloudLoggingLayer::new(handler));

    tracing::subscriber::with_default(subscriber, || {
        tracing::warn!(target: "cloud_log_handler::sink", "internal diagnostic");
        tracing::info!(target: "my_service::db", "pool ready");
    });

    assert_eq!(sink.count(), 1);
    assert_eq!(sink.payload(0)["msg"], "pool ready");
}
