//! HTTP sink writing entries to a cloud logging API.
//!
//! Each submission is one `entries:write` request. The sink uses the blocking
//! `reqwest` client, so it must not be driven from inside an async task:
//! applications running on Tokio should enable async dispatch, which calls
//! the sink from the runtime's blocking pool.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde::Serialize;
use url::Url;

use crate::config::HandlerConfig;
use crate::sink::{Entry, Sink, SinkError, WireEntry};

const WRITE_PATH: &str = "v2/entries:write";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WriteEntriesRequest<'a> {
    log_name: &'a str,
    resource: MonitoredResource<'a>,
    labels: &'a BTreeMap<String, String>,
    entries: [WireEntry; 1],
}

#[derive(Debug, Serialize)]
struct MonitoredResource<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

/// Sink posting entries to `{endpoint}/v2/entries:write`.
#[derive(Debug)]
pub struct HttpSink {
    client: Client,
    url: Url,
    log_path: String,
    resource_type: String,
    labels: BTreeMap<String, String>,
    closed: AtomicBool,
}

impl HttpSink {
    /// Build the backend client described by `config`.
    pub fn connect(config: &HandlerConfig) -> Result<Self, SinkError> {
        let url = Url::parse(&config.client.endpoint)?.join(WRITE_PATH)?;

        let mut headers = HeaderMap::new();
        for (name, value) in &config.client.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| SinkError::InvalidHeader(name.clone()))?;
            let header_value =
                HeaderValue::from_str(value).map_err(|_| SinkError::InvalidHeader(name.clone()))?;
            headers.insert(header_name, header_value);
        }
        if let Some(token) = &config.client.bearer_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| SinkError::InvalidHeader(AUTHORIZATION.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.client.timeout_secs))
            .user_agent(config.client.user_agent.clone())
            .default_headers(headers)
            .build()?;

        tracing::debug!(url = %url, log = %config.log_path(), "HTTP sink connected");

        Ok(Self {
            client,
            url,
            log_path: config.log_path(),
            resource_type: config.logger.resource_type.clone(),
            labels: config.logger.labels.clone(),
            closed: AtomicBool::new(false),
        })
    }

    /// Request URL used for submissions.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Sink for HttpSink {
    fn submit(&self, entry: Entry) -> Result<(), SinkError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SinkError::Closed);
        }

        let request = WriteEntriesRequest {
            log_name: &self.log_path,
            resource: MonitoredResource {
                kind: &self.resource_type,
            },
            labels: &self.labels,
            entries: [WireEntry::from_entry(&entry)],
        };

        let response = self.client.post(self.url.clone()).json(&request).send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().unwrap_or_default();
        Err(SinkError::Status {
            status: status.as_u16(),
            body,
        })
    }

    fn close(&self) -> Result<(), SinkError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!(log = %self.log_path, "HTTP sink closed");
        }
        Ok(())
    }
}
