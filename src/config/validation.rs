//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HandlerConfig → Result<(), Vec<ValidationError>>
//! - Runs before a handler is constructed

use thiserror::Error;
use url::Url;

use crate::config::schema::HandlerConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("log name is required and cannot be empty")]
    MissingLogName,

    #[error("project ID is required and cannot be empty")]
    MissingProjectId,

    #[error("client endpoint {0:?} is not a valid URL")]
    InvalidEndpoint(String),

    #[error("client timeout must be greater than zero")]
    ZeroTimeout,
}

/// Check a configuration before it is accepted.
pub fn validate_config(config: &HandlerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.log_name.trim().is_empty() {
        errors.push(ValidationError::MissingLogName);
    }
    if config.project_id.trim().is_empty() {
        errors.push(ValidationError::MissingProjectId);
    }
    if Url::parse(&config.client.endpoint).is_err() {
        errors.push(ValidationError::InvalidEndpoint(config.client.endpoint.clone()));
    }
    if config.client.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
