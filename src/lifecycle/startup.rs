//! Startup orchestration.
//!
//! # Responsibilities
//! - Crawl every configured root into a fresh index
//! - Freeze the index before any connection is accepted
//! - Bind the listener and assemble the server
//!
//! # Design Decisions
//! - Fail fast: a bad root aborts startup before anything is bound
//! - The crawl is blocking filesystem work and runs off the async threads

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ServerConfig;
use crate::http::SearchServer;
use crate::index::{crawl_all, CrawlError, SharedIndex, WordIndex};
use crate::net::{Listener, ListenerError};
use crate::observability::metrics;

/// Error type for startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("no crawl roots configured")]
    NoRoots,

    #[error(transparent)]
    Crawl(#[from] CrawlError),

    #[error("index build task failed: {0}")]
    IndexTask(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// Crawl `roots` and freeze the result.
pub async fn build_index(roots: Vec<PathBuf>) -> Result<SharedIndex, StartupError> {
    if roots.is_empty() {
        return Err(StartupError::NoRoots);
    }

    let (index, stats) = tokio::task::spawn_blocking(move || {
        let mut index = WordIndex::new();
        crawl_all(&roots, &mut index).map(|stats| (index, stats))
    })
    .await??;

    tracing::info!(
        words = index.num_words(),
        documents = index.num_documents(),
        files_indexed = stats.files_indexed,
        files_skipped = stats.files_skipped,
        dirs_skipped = stats.dirs_skipped,
        "Index built"
    );
    metrics::set_index_size(index.num_words(), index.num_documents());

    Ok(index.freeze())
}

/// Build the index, bind the listener, and return a server ready to run.
pub async fn start(config: &ServerConfig) -> Result<(SearchServer, Listener), StartupError> {
    let index = build_index(config.index.roots.clone()).await?;
    let listener = Listener::bind(&config.listener).await?;
    Ok((SearchServer::new(config, index), listener))
}
