//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept, connection-slot limit)
//!     → connection.rs (ID, open-connection tracking)
//!     → handed to the worker pool as one task
//! ```
//!
//! # Design Decisions
//! - The accept loop does no per-connection I/O
//! - Each connection is tracked so shutdown can drain

pub mod connection;
pub mod listener;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{ConnectionPermit, Listener, ListenerError};
