//! Crate-level error type.

use thiserror::Error;

use crate::config::validation::ValidationError;
use crate::format::FormatError;
use crate::sink::SinkError;

/// Errors surfaced by [`CloudLoggingHandler`](crate::CloudLoggingHandler).
///
/// Format and submit errors only reach the caller of `handle` when the
/// handler dispatches synchronously. Asynchronous dispatches report them to
/// the async error hook instead.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Required options missing or malformed. No handler is produced.
    #[error("invalid handler configuration: {}", join(.0))]
    Config(Vec<ValidationError>),

    /// Async dispatch requested without a scheduler or a Tokio runtime.
    #[error("async dispatch requires a scheduler or a running Tokio runtime")]
    Scheduler,

    /// The backend client could not be constructed.
    #[error("failed to connect to logging backend: {0}")]
    Connection(#[source] SinkError),

    #[error("failed to format record: {0}")]
    Format(#[from] FormatError),

    #[error("failed to submit entry: {0}")]
    Submit(#[source] SinkError),

    /// A scheduled dispatch panicked or was cancelled by its runtime.
    #[error("asynchronous dispatch did not complete: {0}")]
    Join(String),

    /// Scheduled dispatches failed while draining on shutdown.
    #[error("{failed} asynchronous dispatch(es) failed, first: {first}")]
    Drain {
        failed: usize,
        first: Box<HandlerError>,
    },

    /// Releasing the backend connection failed.
    #[error("failed to close logging backend: {0}")]
    Close(#[source] SinkError),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
