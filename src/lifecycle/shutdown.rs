//! Shutdown coordination for handler chains.
//!
//! Draining awaits every outstanding async dispatch in submission order.
//! Nothing short-circuits the drain; the `continue_on_error` flag only
//! decides which failures are reported back.

use std::time::Instant;

use crate::error::HandlerError;
use crate::handler::dispatch::PendingList;
use crate::handler::CloudLoggingHandler;
use crate::observability::metrics;

/// Outcome of draining a pending list.
#[derive(Debug, Default)]
pub struct DrainReport {
    /// Dispatches awaited.
    pub awaited: usize,
    /// Dispatches that finished with an error.
    pub failed: usize,
    /// First error observed, in submission order.
    pub first_error: Option<HandlerError>,
}

impl DrainReport {
    /// Fold failures into a single error, if there were any.
    pub fn into_error(self) -> Option<HandlerError> {
        let failed = self.failed;
        self.first_error.map(|first| HandlerError::Drain {
            failed,
            first: Box::new(first),
        })
    }
}

/// Await every pending dispatch exactly once.
///
/// Dispatches that panicked or were cancelled never reached their own error
/// reporting, so they are passed to `on_join_error` here.
pub async fn drain<F>(pending: &PendingList, on_join_error: F) -> DrainReport
where
    F: Fn(&HandlerError),
{
    let started = Instant::now();
    let mut report = DrainReport::default();

    for work in pending.take() {
        report.awaited += 1;
        if let Err(e) = work.wait().await {
            if matches!(e, HandlerError::Join(_)) {
                metrics::record_failure("join");
                on_join_error(&e);
            }
            report.failed += 1;
            if report.first_error.is_none() {
                report.first_error = Some(e);
            }
        }
    }

    metrics::record_drain(started);
    tracing::debug!(
        awaited = report.awaited,
        failed = report.failed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Pending dispatches drained"
    );
    report
}

/// Shut down several independent handlers.
///
/// With `continue_on_error` unset the first failing handler stops the
/// sequence; otherwise every handler is shut down and the first error is
/// returned at the end.
pub async fn shutdown_all(
    handlers: &[CloudLoggingHandler],
    continue_on_error: bool,
) -> Result<(), HandlerError> {
    let mut first_error = None;

    for handler in handlers {
        if let Err(e) = handler.shutdown(continue_on_error).await {
            if !continue_on_error {
                return Err(e);
            }
            tracing::warn!(error = %e, "Handler shutdown failed, continuing");
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
