//! Worker dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! accept loop
//!     → pool.rs dispatch() (bounded FIFO queue)
//!     → one of N workers
//!     → runs the connection's request/response loop to completion
//! ```
//!
//! # Design Decisions
//! - Requests on one connection are handled strictly in order by one worker
//! - No ordering across connections
//! - Pool exhaustion blocks the accept loop; connections are never refused

pub mod pool;

pub use pool::{PoolClosed, WorkerPool};
