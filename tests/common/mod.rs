//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cloud_log_handler::format::{FormatContext, FormatError, RecordFormatter};
use cloud_log_handler::sink::{Entry, Sink, SinkError};
use cloud_log_handler::{Attr, Caller, HandlerConfig, Level};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// Config with both required identifiers set.
pub fn test_config() -> HandlerConfig {
    HandlerConfig::new("test-project", "test-log")
}

/// Sink that keeps every submitted entry.
#[derive(Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<Entry>>,
    closes: AtomicUsize,
    delay: Option<Duration>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Sink that sleeps before accepting each entry.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Payload of entry `idx` parsed as JSON.
    pub fn payload(&self, idx: usize) -> serde_json::Value {
        serde_json::from_slice(&self.entries.lock().unwrap()[idx].payload).unwrap()
    }
}

impl Sink for RecordingSink {
    fn submit(&self, entry: Entry) -> Result<(), SinkError> {
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    fn close(&self) -> Result<(), SinkError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Sink rejecting every entry; optionally failing on close too.
#[derive(Default)]
pub struct FailingSink {
    pub attempts: AtomicUsize,
    pub fail_close: bool,
}

impl Sink for FailingSink {
    fn submit(&self, _entry: Entry) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SinkError::Status {
            status: 503,
            body: "unavailable".into(),
        })
    }

    fn close(&self) -> Result<(), SinkError> {
        if self.fail_close {
            Err(SinkError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "connection reset",
            )))
        } else {
            Ok(())
        }
    }
}

/// Formatter that always fails.
pub struct FailingFormatter;

impl RecordFormatter for FailingFormatter {
    fn format_record(
        &self,
        _ctx: &FormatContext<'_>,
        _time: DateTime<Utc>,
        _level: Level,
        _caller: Option<&Caller>,
        _message: &str,
        _attrs: &[Attr],
    ) -> Result<Vec<u8>, FormatError> {
        Err(FormatError::Custom("formatter exploded".into()))
    }
}

/// A request captured by the mock backend.
#[derive(Debug)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Start a mock backend answering every request with `status`.
///
/// The backend runs on its own Tokio runtime thread so tests driving the
/// blocking client stay outside any runtime. Returns the bound address and a
/// channel of captured requests.
pub fn start_mock_backend(status: u16) -> (SocketAddr, mpsc::Receiver<CapturedRequest>) {
    let (addr_tx, addr_rx) = mpsc::channel();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            addr_tx.send(listener.local_addr().unwrap()).unwrap();

            loop {
                match listener.accept().await {
                    Ok((socket, _)) => {
                        let tx = tx.clone();
                        tokio::spawn(async move {
                            if let Some(request) = serve(socket, status).await {
                                let _ = tx.send(request);
                            }
                        });
                    }
                    Err(_) => break,
                }
            }
        });
    });

    (addr_rx.recv().unwrap(), rx)
}

async fn serve(socket: TcpStream, status: u16) -> Option<CapturedRequest> {
    let mut reader = BufReader::new(socket);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await.ok()?;

    let mut headers = Vec::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).await.ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let (name, value) = (name.trim().to_string(), value.trim().to_string());
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse().ok()?;
            }
            headers.push((name, value));
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).await.ok()?;

    let status_text = match status {
        200 => "200 OK",
        403 => "403 Forbidden",
        500 => "500 Internal Server Error",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    };
    let response_body = if status == 200 { "{}" } else { "backend failure" };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        response_body.len(),
        response_body
    );
    let mut socket = reader.into_inner();
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;

    Some(CapturedRequest {
        request_line: request_line.trim_end().to_string(),
        headers,
        body: String::from_utf8(body).ok()?,
    })
}
