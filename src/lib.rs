//! Multithreaded full-text search server.
//!
//! Crawls directory trees into an in-memory inverted index, then serves
//! ranked AND queries and static files over keep-alive HTTP/1.1.

// Core subsystems
pub mod config;
pub mod http;
pub mod index;
pub mod net;
pub mod routing;
pub mod workers;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ServerConfig;
pub use http::SearchServer;
pub use index::{SharedIndex, WordIndex};
pub use lifecycle::Shutdown;
