//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Parsed Request (target)
//!     → matcher.rs (static prefix test)
//!     → router.rs
//!         /static/<path> → files.rs (read, content type) → 200 | 404
//!         anything else  → terms → index.lookup_query → page.rs → 200
//! ```
//!
//! # Design Decisions
//! - Router built once at startup, immutable at runtime
//! - Deterministic: same target always takes the same route
//! - Logical failures are responses, never errors

pub mod files;
pub mod matcher;
pub mod page;
pub mod router;

pub use router::{RequestRouter, RouteKind};
