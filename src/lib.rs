//! Cloud logging handler library.
//!
//! Forwards structured log records to a cloud log-ingestion backend as JSON
//! payloads with backend severities.
//!
//! # Architecture Overview
//!
//! ```text
//!   facade (tracing layer / direct calls)
//!        │
//!        ▼
//!   CloudLoggingHandler ── with_attrs / with_group ──▶ derived handlers
//!        │ handle(record)
//!        ▼
//!   dispatch ── sync ──▶ pipeline ─────────────┐
//!        └──── async ──▶ scheduler ─▶ pipeline │
//!                                              ▼
//!            consolidate → format → severity → sink
//!
//!   shutdown: drain pending dispatches → close sink
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod handler;
pub mod lifecycle;
pub mod observability;
pub mod record;
pub mod severity;
pub mod sink;

pub use config::HandlerConfig;
pub use error::HandlerError;
pub use handler::{CloudLoggingHandler, Options};
pub use lifecycle::shutdown_all;
pub use record::{Attr, Caller, Level, Record, Value};
pub use severity::Severity;
