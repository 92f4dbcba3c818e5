//! Backend severities and the level → severity mapping.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::record::Level;

/// Severity enumeration understood by the ingestion backend.
///
/// The discriminants are the backend's wire numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Default = 0,
    Debug = 100,
    Info = 200,
    Notice = 300,
    Warning = 400,
    Error = 500,
    Critical = 600,
    Alert = 700,
    Emergency = 800,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Default => "DEFAULT",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Notice => "NOTICE",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
            Severity::Alert => "ALERT",
            Severity::Emergency => "EMERGENCY",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A caller-supplied level mapping. Must be total.
pub type LevelMapper = Arc<dyn Fn(Level) -> Severity + Send + Sync>;

/// Default mapping from facade levels to backend severities.
///
/// Only the named levels map to a specific severity; every other value
/// falls back to [`Severity::Default`].
pub fn default_level_mapper(level: Level) -> Severity {
    match level {
        Level::TRACE | Level::DEBUG => Severity::Debug,
        Level::INFO => Severity::Info,
        Level::NOTICE => Severity::Notice,
        Level::WARN => Severity::Warning,
        Level::ERROR => Severity::Error,
        Level::FATAL => Severity::Critical,
        Level::PANIC => Severity::Emergency,
        _ => Severity::Default,
    }
}
