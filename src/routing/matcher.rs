//! Route matching logic.
//!
//! # Design Decisions
//! - Path matching is a case-sensitive prefix test on the raw target
//! - No regex, so matching is linear in the prefix length

/// Matches request targets that start with a fixed prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn matches(&self, target: &str) -> bool {
        target.starts_with(&self.prefix)
    }

    /// The part of `target` after the prefix, if it matches.
    pub fn strip<'a>(&self, target: &'a str) -> Option<&'a str> {
        target.strip_prefix(self.prefix.as_str())
    }
}
