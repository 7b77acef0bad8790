//! Directory crawl that populates the word index.
//!
//! # Responsibilities
//! - Validate crawl roots before touching the index
//! - Walk each tree with an explicit worklist (no native recursion)
//! - Tokenize every regular file and record its words
//!
//! # Design Decisions
//! - A bad root is fatal; a bad entry below the root is logged and skipped
//! - Symlinks are followed, so the link target's kind decides
//! - Recording is pure accumulation, so the resulting index does not depend
//!   on listing order. Entries are still visited sorted by name to keep logs
//!   reproducible.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::index::tokenizer::tokenize;
use crate::index::word_index::WordIndex;

/// Reasons a crawl root is rejected.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Root does not exist or cannot be stat'ed.
    #[error("crawl root {path:?} is not accessible: {source}")]
    Inaccessible { path: PathBuf, source: io::Error },

    /// Root exists but is not a directory.
    #[error("crawl root {0:?} is not a directory")]
    NotADirectory(PathBuf),

    /// Root is a directory that cannot be listed.
    #[error("crawl root {path:?} cannot be listed: {source}")]
    Unlistable { path: PathBuf, source: io::Error },
}

/// Summary of one crawl.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrawlStats {
    pub files_indexed: usize,
    pub files_skipped: usize,
    pub dirs_skipped: usize,
}

impl CrawlStats {
    fn absorb(&mut self, other: CrawlStats) {
        self.files_indexed += other.files_indexed;
        self.files_skipped += other.files_skipped;
        self.dirs_skipped += other.dirs_skipped;
    }
}

/// Crawl `root`, recording every word of every regular file into `index`.
///
/// Fails without modifying `index` if `root` is missing, not a directory, or
/// cannot be listed.
pub fn crawl(root: &Path, index: &mut WordIndex) -> Result<CrawlStats, CrawlError> {
    check_root(root)?;
    Ok(walk(root, index))
}

/// Crawl several roots into the same index.
///
/// Every root is validated first; if any is rejected nothing is recorded.
pub fn crawl_all<P: AsRef<Path>>(
    roots: &[P],
    index: &mut WordIndex,
) -> Result<CrawlStats, CrawlError> {
    for root in roots {
        check_root(root.as_ref())?;
    }

    let mut stats = CrawlStats::default();
    for root in roots {
        stats.absorb(walk(root.as_ref(), index));
    }
    Ok(stats)
}

/// Tokenize one file and record its words under `doc`.
pub fn index_file(path: &Path, doc: &str, index: &mut WordIndex) -> io::Result<()> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    for word in tokenize(&text) {
        index.record(&word, doc);
    }
    Ok(())
}

/// Document id for a crawled path.
pub fn doc_id(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn check_root(root: &Path) -> Result<(), CrawlError> {
    let meta = fs::metadata(root).map_err(|source| CrawlError::Inaccessible {
        path: root.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(CrawlError::NotADirectory(root.to_path_buf()));
    }
    fs::read_dir(root).map_err(|source| CrawlError::Unlistable {
        path: root.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn walk(root: &Path, index: &mut WordIndex) -> CrawlStats {
    let mut stats = CrawlStats::default();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .min_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(
                    path = ?e.path(),
                    error = %e,
                    "Skipping unreadable entry"
                );
                stats.dirs_skipped += 1;
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }
        if !file_type.is_file() {
            tracing::trace!(path = ?entry.path(), "Skipping special file");
            continue;
        }

        let doc = doc_id(entry.path());
        match index_file(entry.path(), &doc, index) {
            Ok(()) => {
                tracing::trace!(doc = %doc, "Indexed file");
                stats.files_indexed += 1;
            }
            Err(e) => {
                tracing::warn!(doc = %doc, error = %e, "Skipping unreadable file");
                stats.files_skipped += 1;
            }
        }
    }

    tracing::debug!(
        root = ?root,
        files_indexed = stats.files_indexed,
        files_skipped = stats.files_skipped,
        dirs_skipped = stats.dirs_skipped,
        "Crawl of root finished"
    );
    stats
}
