//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handler internals produce:
//!     → logging.rs (tracing diagnostics, local subscriber setup)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Application events:
//!     tracing macros → layer.rs → CloudLoggingHandler::handle
//! ```
//!
//! # Design Decisions
//! - Diagnostics go through tracing, never through the handler itself
//! - Metrics are cheap no-ops until the application installs a recorder

pub mod layer;
pub mod logging;
pub mod metrics;

pub use layer::CloudLoggingLayer;
