//! Indexing subsystem.
//!
//! # Data Flow
//! ```text
//! crawl roots
//!     → crawler.rs (validate roots, walk tree, read files)
//!     → tokenizer.rs (lowercase alphabetic tokens)
//!     → word_index.rs (word → document → count)
//!     → freeze() into SharedIndex
//!     → shared read-only by every worker
//! ```
//!
//! # Design Decisions
//! - The crawl finishes before the listener is bound; serving never
//!   overlaps with recording
//! - No locking: the frozen index is behind `Arc` and has no `&self`
//!   mutators

pub mod crawler;
pub mod tokenizer;
pub mod word_index;

pub use crawler::{crawl, crawl_all, CrawlError, CrawlStats};
pub use tokenizer::tokenize;
pub use word_index::{SearchResult, SharedIndex, WordIndex};
