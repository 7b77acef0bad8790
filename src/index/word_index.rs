//! In-memory inverted index.
//!
//! # Responsibilities
//! - Accumulate (word, document) occurrence counts during the crawl
//! - Answer single-word lookups ranked by occurrence count
//! - Answer multi-word queries as an intersection ranked by summed counts
//!
//! # Design Decisions
//! - Mutation requires `&mut self`; once the crawl hands the index to
//!   [`SharedIndex`] it is read-only for the process lifetime
//! - Equal ranks are ordered by ascending document id so results are stable
//! - Duplicate query words are not collapsed; each one adds its count again

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Read-only handle to a fully built index, shared by all workers.
pub type SharedIndex = Arc<WordIndex>;

/// One ranked search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Document id (path of the indexed file).
    pub doc: String,
    /// Occurrence count, or the sum of counts over the query words.
    pub rank: u64,
}

impl SearchResult {
    pub fn new(doc: impl Into<String>, rank: u64) -> Self {
        Self {
            doc: doc.into(),
            rank,
        }
    }
}

/// Maps each word to the documents containing it and how often.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WordIndex {
    postings: HashMap<String, HashMap<String, u64>>,
}

impl WordIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `word` in `doc`.
    pub fn record(&mut self, word: &str, doc: &str) {
        let docs = self.postings.entry(word.to_string()).or_default();
        *docs.entry(doc.to_string()).or_insert(0) += 1;
    }

    /// Number of distinct words recorded.
    pub fn num_words(&self) -> usize {
        self.postings.len()
    }

    /// Number of distinct documents holding at least one word.
    pub fn num_documents(&self) -> usize {
        self.postings
            .values()
            .flat_map(|docs| docs.keys())
            .collect::<HashSet<_>>()
            .len()
    }

    /// All documents containing `word`, highest count first.
    pub fn lookup_word(&self, word: &str) -> Vec<SearchResult> {
        let mut results: Vec<SearchResult> = self
            .postings
            .get(word)
            .map(|docs| {
                docs.iter()
                    .map(|(doc, count)| SearchResult::new(doc.as_str(), *count))
                    .collect()
            })
            .unwrap_or_default();

        results.sort_by(rank_order);
        results
    }

    /// Documents containing every word of `query`, ranked by summed counts.
    ///
    /// An empty query matches nothing.
    pub fn lookup_query<S: AsRef<str>>(&self, query: &[S]) -> Vec<SearchResult> {
        let mut words = query.iter().map(AsRef::as_ref);

        let Some(first) = words.next() else {
            return Vec::new();
        };
        let mut running: HashMap<&str, u64> = match self.postings.get(first) {
            Some(docs) => docs.iter().map(|(doc, n)| (doc.as_str(), *n)).collect(),
            None => return Vec::new(),
        };

        for word in words {
            let Some(docs) = self.postings.get(word) else {
                return Vec::new();
            };
            running.retain(|doc, rank| match docs.get(*doc) {
                Some(n) => {
                    *rank += n;
                    true
                }
                None => false,
            });
            if running.is_empty() {
                return Vec::new();
            }
        }

        let mut results: Vec<SearchResult> = running
            .into_iter()
            .map(|(doc, rank)| SearchResult::new(doc, rank))
            .collect();
        results.sort_by(rank_order);
        results
    }

    /// Iterate over every (word, doc, count) triple, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, u64)> {
        self.postings.iter().flat_map(|(word, docs)| {
            docs.iter()
                .map(move |(doc, count)| (word.as_str(), doc.as_str(), *count))
        })
    }

    /// Finish the build phase and hand out a shared read-only handle.
    pub fn freeze(self) -> SharedIndex {
        Arc::new(self)
    }
}

fn rank_order(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.rank.cmp(&a.rank).then_with(|| a.doc.cmp(&b.doc))
}
