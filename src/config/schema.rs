//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML. Every
//! section has defaults, so an empty file is a valid configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the search server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Worker pool sizing.
    pub workers: WorkerConfig,

    /// Directories crawled into the index at startup.
    pub index: IndexConfig,

    /// Static file serving.
    pub static_files: StaticFilesConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Startup and shutdown behaviour.
    pub lifecycle: LifecycleConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5950").
    pub bind_address: String,

    /// Maximum open connections, including ones still queued for a worker.
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5950".to_string(),
            max_connections: 200,
        }
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of workers; each serves one connection at a time.
    pub pool_size: usize,

    /// Accepted connections that may wait for a free worker.
    pub queue_depth: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            pool_size: 100,
            queue_depth: 100,
        }
    }
}

/// Index configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    /// Crawl roots. Command-line roots are appended.
    pub roots: Vec<PathBuf>,
}

/// Static file configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory that `/static/<path>` is resolved against.
    pub base_dir: PathBuf,

    /// URL prefix selecting static file requests.
    pub url_prefix: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            url_prefix: "/static/".to_string(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Bytes a request head may occupy before its terminator arrives.
    pub max_request_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_bytes: 64 * 1024,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,

    pub log_format: LogFormat,

    /// Serve Prometheus metrics.
    pub metrics_enabled: bool,

    /// Address of the metrics endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "search_server=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9095".to_string(),
        }
    }
}

/// Lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Seconds to wait for open connections after a shutdown signal.
    pub shutdown_grace_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_secs: 10,
        }
    }
}
