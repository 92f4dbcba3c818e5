//! Record formatting.
//!
//! # Data Flow
//! ```text
//! consolidated attrs + record fields
//!     → RecordFormatter::format_record
//!     → payload bytes (JSON object)
//!     → sink entry payload
//! ```
//!
//! The handler only relies on the trait; [`json::JsonFormatter`] is used when
//! no formatter is configured.

pub mod json;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::record::{Attr, Caller, Level};

pub use json::JsonFormatter;

/// Handler identity made available to formatters.
#[derive(Debug, Clone, Copy)]
pub struct FormatContext<'a> {
    pub log_name: &'a str,
    pub project_id: &'a str,
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),
}

/// Turns a record into the payload bytes sent to the backend.
///
/// Implementations must produce a JSON object for the backend to index the
/// payload as structured data.
pub trait RecordFormatter: Send + Sync {
    fn format_record(
        &self,
        ctx: &FormatContext<'_>,
        time: DateTime<Utc>,
        level: Level,
        caller: Option<&Caller>,
        message: &str,
        attrs: &[Attr],
    ) -> Result<Vec<u8>, FormatError>;
}
