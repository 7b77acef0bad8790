//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → command-line overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the index is frozen at startup, so
//!   there is nothing to hot-reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, read_config, ConfigError};
pub use schema::{
    IndexConfig, LifecycleConfig, LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    ServerConfig, StaticFilesConfig, WorkerConfig,
};
pub use validation::{validate_config, ValidationError};
