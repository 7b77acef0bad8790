//! Word tokenization for indexing.
//!
//! A token is a maximal run of ASCII alphabetic characters, lowercased.
//! Whitespace, digits, punctuation and any non-ASCII character end the
//! current token and are never part of one.

/// Iterator over the tokens of a text.
///
/// Calling [`tokenize`] again on the same input restarts the sequence.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a str,
}

/// Split `text` into lowercase alphabetic tokens.
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens { rest: text }
}

impl Iterator for Tokens<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let start = self.rest.find(|c: char| c.is_ascii_alphabetic())?;
        let tail = &self.rest[start..];
        let len = tail
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(tail.len());

        let token = tail[..len].to_ascii_lowercase();
        self.rest = &tail[len..];
        Some(token)
    }
}
