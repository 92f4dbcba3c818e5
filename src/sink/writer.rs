//! Sink writing entries as JSON lines.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::Serialize;

use crate::sink::{Entry, Sink, SinkError, WireEntry};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Line<'a> {
    log_name: &'a str,
    #[serde(flatten)]
    entry: WireEntry,
}

/// Writes one JSON object per line to the wrapped writer.
pub struct WriterSink<W> {
    writer: Mutex<W>,
    log_path: String,
    closed: AtomicBool,
}

impl WriterSink<io::Stdout> {
    pub fn stdout(log_path: impl Into<String>) -> Self {
        Self::new(io::stdout(), log_path)
    }
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W, log_path: impl Into<String>) -> Self {
        Self {
            writer: Mutex::new(writer),
            log_path: log_path.into(),
            closed: AtomicBool::new(false),
        }
    }

    /// Recover the writer, e.g. to inspect a buffer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn submit(&self, entry: Entry) -> Result<(), SinkError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SinkError::Closed);
        }

        let mut line = serde_json::to_vec(&Line {
            log_name: &self.log_path,
            entry: WireEntry::from_entry(&entry),
        })?;
        line.push(b'\n');

        let mut writer = self.writer.lock().expect("writer sink mutex poisoned");
        writer.write_all(&line)?;
        Ok(())
    }

    fn close(&self) -> Result<(), SinkError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let mut writer = self.writer.lock().expect("writer sink mutex poisoned");
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;
    use chrono::Utc;

    #[test]
    fn test_writes_json_lines() {
        let sink = WriterSink::new(Vec::new(), "projects/p/logs/app");
        for msg in ["one", "two"] {
            sink.submit(Entry {
                timestamp: Utc::now(),
                severity: Severity::Notice,
                payload: format!(r#"{{"msg":"{}"}}"#, msg).into_bytes(),
            })
            .unwrap();
        }
        sink.close().unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["logName"], "projects/p/logs/app");
        assert_eq!(lines[1]["jsonPayload"]["msg"], "two");
        assert_eq!(lines[1]["severity"], "NOTICE");
    }

    #[test]
    fn test_submit_after_close_fails() {
        let sink = WriterSink::new(Vec::new(), "log");
        sink.close().unwrap();
        sink.close().unwrap();

        let err = sink
            .submit(Entry {
                timestamp: Utc::now(),
                severity: Severity::Info,
                payload: b"{}".to_vec(),
            })
            .unwrap_err();
        assert!(matches!(err, SinkError::Closed));
    }
}
