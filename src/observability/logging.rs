//! Structured logging for the handler's own diagnostics.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Log level configurable via argument and `RUST_LOG`
//! - An optional [`CloudLoggingLayer`] forwards application events to the
//!   backend alongside the local fmt output

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::handler::CloudLoggingHandler;
use crate::observability::layer::CloudLoggingLayer;

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `default_directive`. Fails if a global
/// subscriber is already set.
pub fn init_logging(
    default_directive: &str,
    forward_to: Option<CloudLoggingHandler>,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(forward_to.map(CloudLoggingLayer::new))
        .try_init()
}
