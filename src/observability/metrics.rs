//! Handler metrics.
//!
//! # Metrics
//! - `cloudlog_entries_submitted_total` (counter): entries accepted by the sink, by severity
//! - `cloudlog_entries_failed_total` (counter): records lost, by pipeline stage
//! - `cloudlog_async_dispatches_total` (counter): records scheduled for async dispatch
//! - `cloudlog_pending_dispatches` (gauge): async dispatches awaiting shutdown
//! - `cloudlog_drain_duration_seconds` (histogram): time spent draining on shutdown
//!
//! No exporter is installed here; without a recorder these calls are no-ops.

use std::time::Instant;

use metrics::{counter, gauge, histogram};

use crate::severity::Severity;

pub fn record_submitted(severity: Severity) {
    counter!("cloudlog_entries_submitted_total", "severity" => severity.as_str()).increment(1);
}

/// `stage` is `format`, `submit` or `join`.
pub fn record_failure(stage: &'static str) {
    counter!("cloudlog_entries_failed_total", "stage" => stage).increment(1);
}

pub fn record_scheduled(outstanding: usize) {
    counter!("cloudlog_async_dispatches_total").increment(1);
    gauge!("cloudlog_pending_dispatches").set(outstanding as f64);
}

pub fn record_drain(started: Instant) {
    histogram!("cloudlog_drain_duration_seconds").record(started.elapsed().as_secs_f64());
    gauge!("cloudlog_pending_dispatches").set(0.0);
}
