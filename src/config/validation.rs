//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (pool size > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: &ServerConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// Smallest head that can hold a request line and terminator.
pub const MIN_REQUEST_BYTES: usize = 16;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a socket address: {:?}", config.listener.bind_address),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::new("listener.max_connections", "must be > 0"));
    }
    if config.workers.pool_size == 0 {
        errors.push(ValidationError::new("workers.pool_size", "must be > 0"));
    }
    if config.workers.queue_depth == 0 {
        errors.push(ValidationError::new("workers.queue_depth", "must be > 0"));
    }
    if config.limits.max_request_bytes < MIN_REQUEST_BYTES {
        errors.push(ValidationError::new(
            "limits.max_request_bytes",
            format!("must be at least {MIN_REQUEST_BYTES}"),
        ));
    }

    let prefix = &config.static_files.url_prefix;
    if !prefix.starts_with('/') || !prefix.ends_with('/') || prefix.len() < 2 {
        errors.push(ValidationError::new(
            "static_files.url_prefix",
            format!("must start and end with '/': {prefix:?}"),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "not a socket address: {:?}",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
