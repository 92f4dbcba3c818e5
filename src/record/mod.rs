//! Log records as delivered by the logging facade.
//!
//! # Data Flow
//! ```text
//! facade call site
//!     → Record (time, level, message, caller, call-site attrs)
//!     → CloudLoggingHandler::handle
//! ```
//!
//! Records are owned by the caller and passed by value into the handler;
//! the handler never keeps them past one dispatch.

pub mod attr;
pub mod level;

use chrono::{DateTime, Utc};

pub use attr::{Attr, Value};
pub use level::Level;

/// Source location of the call that produced a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub function: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
}

/// A single log event.
#[derive(Debug, Clone)]
pub struct Record {
    pub time: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    pub caller: Option<Caller>,
    pub attrs: Vec<Attr>,
}

impl Record {
    /// Create a record stamped with the current time.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            time: Utc::now(),
            level,
            message: message.into(),
            caller: None,
            attrs: Vec::new(),
        }
    }

    /// Append call-site attributes.
    pub fn with_attrs(mut self, attrs: impl IntoIterator<Item = Attr>) -> Self {
        self.attrs.extend(attrs);
        self
    }

    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }
}
