//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::Level;

/// Root configuration for a cloud logging handler.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// Minimum level passed by `enabled` (default: info).
    pub level: Level,

    /// Name of the destination log. Required.
    pub log_name: String,

    /// Project the log belongs to. Required.
    pub project_id: String,

    /// Dispatch records on a background scheduler.
    ///
    /// Call `shutdown` before exiting so pending records are written.
    pub enable_async: bool,

    /// Backend client construction options.
    pub client: ClientConfig,

    /// Options applied to every entry written by the backend logger.
    pub logger: LoggerConfig,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            log_name: String::new(),
            project_id: String::new(),
            enable_async: false,
            client: ClientConfig::default(),
            logger: LoggerConfig::default(),
        }
    }
}

impl HandlerConfig {
    /// Config with the two required identifiers set and defaults elsewhere.
    pub fn new(project_id: impl Into<String>, log_name: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            log_name: log_name.into(),
            ..Self::default()
        }
    }

    /// Fully-qualified log name as the backend expects it.
    pub fn log_path(&self) -> String {
        format!("projects/{}/logs/{}", self.project_id, self.log_name)
    }
}

/// Backend client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the logging API.
    pub endpoint: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// User agent sent with every request.
    pub user_agent: String,

    /// Optional OAuth bearer token.
    pub bearer_token: Option<String>,

    /// Extra headers added to every request.
    pub headers: BTreeMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://logging.googleapis.com/".to_string(),
            timeout_secs: 10,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            bearer_token: None,
            headers: BTreeMap::new(),
        }
    }
}

/// Backend logger configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Monitored resource type attached to entries.
    pub resource_type: String,

    /// Labels attached to every entry.
    pub labels: BTreeMap<String, String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            resource_type: "global".to_string(),
            labels: BTreeMap::new(),
        }
    }
}
