//! Backend sinks.
//!
//! # Data Flow
//! ```text
//! handler pipeline
//!     → Entry { timestamp, severity, payload }
//!     → Sink::submit (synchronous, once per record)
//!         → http.rs   (entries:write over HTTPS)
//!         → writer.rs (JSON lines to any io::Write)
//! ```
//!
//! # Design Decisions
//! - Sinks are synchronous; async dispatch runs them on a blocking pool
//! - No retry or batching at this layer
//! - `close` is idempotent; submissions after close fail with `Closed`

pub mod http;
pub mod writer;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::severity::Severity;

pub use http::HttpSink;
pub use writer::WriterSink;

/// One log entry ready for the backend.
#[derive(Debug, Clone)]
pub struct Entry {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    /// Formatted record, normally a JSON object.
    pub payload: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink is closed")]
    Closed,

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("invalid header {0:?}")]
    InvalidHeader(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Destination for formatted entries.
pub trait Sink: Send + Sync {
    /// Deliver one entry. Blocks until the backend accepted or rejected it.
    fn submit(&self, entry: Entry) -> Result<(), SinkError>;

    /// Release the backend connection.
    fn close(&self) -> Result<(), SinkError>;
}

/// Wire shape of an entry, shared by the bundled sinks.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireEntry {
    timestamp: String,
    severity: Severity,
    insert_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    json_payload: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_payload: Option<String>,
}

impl WireEntry {
    /// JSON object payloads travel as `jsonPayload`; anything else is sent
    /// as text.
    pub(crate) fn from_entry(entry: &Entry) -> Self {
        let (json_payload, text_payload) = match serde_json::from_slice::<serde_json::Value>(&entry.payload) {
            Ok(value @ serde_json::Value::Object(_)) => (Some(value), None),
            _ => (None, Some(String::from_utf8_lossy(&entry.payload).into_owned())),
        };

        Self {
            timestamp: entry.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
            severity: entry.severity,
            insert_id: uuid::Uuid::new_v4().to_string(),
            json_payload,
            text_payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_payload_is_json() {
        let entry = Entry {
            timestamp: Utc::now(),
            severity: Severity::Info,
            payload: br#"{"msg":"hi"}"#.to_vec(),
        };
        let wire = serde_json::to_value(WireEntry::from_entry(&entry)).unwrap();
        assert_eq!(wire["jsonPayload"]["msg"], "hi");
        assert_eq!(wire["severity"], "INFO");
        assert!(wire.get("textPayload").is_none());
        assert_eq!(wire["insertId"].as_str().unwrap().len(), 36);
    }

    #[test]
    fn test_non_object_payload_is_text() {
        let entry = Entry {
            timestamp: Utc::now(),
            severity: Severity::Error,
            payload: b"plain line".to_vec(),
        };
        let wire = serde_json::to_value(WireEntry::from_entry(&entry)).unwrap();
        assert_eq!(wire["textPayload"], "plain line");
        assert!(wire.get("jsonPayload").is_none());
    }
}
