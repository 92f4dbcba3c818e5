//! Facade log levels.
//!
//! Levels are plain ordered integers so applications can define their own
//! levels between (or beyond) the named ones. Gaps between the named levels
//! leave room for those custom values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A log level. Higher values are more important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(pub i32);

impl Level {
    pub const TRACE: Level = Level(-8);
    pub const DEBUG: Level = Level(-4);
    pub const INFO: Level = Level(0);
    pub const NOTICE: Level = Level(2);
    pub const WARN: Level = Level(4);
    pub const ERROR: Level = Level(8);
    pub const FATAL: Level = Level(12);
    pub const PANIC: Level = Level(16);

    /// Named levels in ascending order.
    const NAMED: [(Level, &'static str); 8] = [
        (Level::TRACE, "TRACE"),
        (Level::DEBUG, "DEBUG"),
        (Level::INFO, "INFO"),
        (Level::NOTICE, "NOTICE"),
        (Level::WARN, "WARN"),
        (Level::ERROR, "ERROR"),
        (Level::FATAL, "FATAL"),
        (Level::PANIC, "PANIC"),
    ];

    /// Raw integer value.
    pub fn value(self) -> i32 {
        self.0
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::INFO
    }
}

impl From<i32> for Level {
    fn from(value: i32) -> Self {
        Level(value)
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::TRACE,
            tracing::Level::DEBUG => Level::DEBUG,
            tracing::Level::INFO => Level::INFO,
            tracing::Level::WARN => Level::WARN,
            _ => Level::ERROR,
        }
    }
}

impl fmt::Display for Level {
    /// Named levels print as their name. Anything else prints relative to the
    /// closest named level below it (`INFO+1`), or above TRACE when it sits
    /// under every named level (`TRACE-2`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (base, name) = Self::NAMED
            .iter()
            .rev()
            .find(|(named, _)| named.0 <= self.0)
            .copied()
            .unwrap_or(Self::NAMED[0]);

        let offset = self.0 - base.0;
        if offset == 0 {
            f.write_str(name)
        } else {
            write!(f, "{}{:+}", name, offset)
        }
    }
}

/// Error returned when a level string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level: {0:?}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Accepts level names (case-insensitive, `warning` as an alias of
    /// `warn`), an optional `+N`/`-N` offset, or a bare integer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(raw) = trimmed.parse::<i32>() {
            return Ok(Level(raw));
        }

        let (name, offset) = match trimmed.find(['+', '-']) {
            Some(idx) => {
                let offset = trimmed[idx..]
                    .parse::<i32>()
                    .map_err(|_| ParseLevelError(s.to_string()))?;
                (&trimmed[..idx], offset)
            }
            None => (trimmed, 0),
        };

        let base = match name.to_ascii_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "notice" => Level::NOTICE,
            "warn" | "warning" => Level::WARN,
            "error" => Level::ERROR,
            "fatal" => Level::FATAL,
            "panic" => Level::PANIC,
            _ => return Err(ParseLevelError(s.to_string())),
        };
        base.0
            .checked_add(offset)
            .map(Level)
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_named_and_offsets() {
        assert_eq!(Level::INFO.to_string(), "INFO");
        assert_eq!(Level::WARN.to_string(), "WARN");
        assert_eq!(Level(1).to_string(), "INFO+1");
        assert_eq!(Level(-10).to_string(), "TRACE-2");
        assert_eq!(Level(20).to_string(), "PANIC+4");
    }

    #[test]
    fn test_parse() {
        assert_eq!("info".parse::<Level>().unwrap(), Level::INFO);
        assert_eq!("Warning".parse::<Level>().unwrap(), Level::WARN);
        assert_eq!("ERROR+2".parse::<Level>().unwrap(), Level(10));
        assert_eq!("trace-2".parse::<Level>().unwrap(), Level(-10));
        assert_eq!("-3".parse::<Level>().unwrap(), Level(-3));
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn test_parse_offset_overflow_is_error() {
        let err = "panic+2147483647".parse::<Level>().unwrap_err();
        assert_eq!(err, ParseLevelError("panic+2147483647".to_string()));
        assert!("trace-2147483647".parse::<Level>().is_err());
        assert_eq!("info+2147483647".parse::<Level>().unwrap(), Level(i32::MAX));
    }

    #[test]
    fn test_ordering() {
        assert!(Level::TRACE < Level::DEBUG);
        assert!(Level::NOTICE > Level::INFO);
        assert!(Level::PANIC > Level::FATAL);
    }
}
