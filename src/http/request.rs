//! Request head parsing.
//!
//! # Responsibilities
//! - Parse a complete request head (everything before the blank line)
//! - Accept only `GET` with a three-token request line
//! - Normalize header names to lowercase and trim names and values
//!
//! # Design Decisions
//! - No body is ever read; anything after the head belongs to the next
//!   request on the connection
//! - Lines may end in CRLF or bare LF; empty lines are ignored, but a
//!   whitespace-only line is a malformed header
//! - Request IDs are generated per request for log correlation only

use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

/// Unique identifier attached to each parsed request in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Why a request head was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty request head")]
    Empty,

    #[error("malformed request line: {0:?}")]
    RequestLine(String),

    #[error("unsupported method: {0}")]
    Method(String),

    #[error("malformed header line: {0:?}")]
    Header(String),
}

/// A parsed `GET` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: String,
    target: String,
    version: String,
    headers: HashMap<String, String>,
}

impl Request {
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request target exactly as sent, including any query string.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// True when the client asked to close the connection after this request.
    pub fn wants_close(&self) -> bool {
        self.header("connection")
            .is_some_and(|v| v.eq_ignore_ascii_case("close"))
    }
}

/// Parse a request head without its terminating blank line.
pub fn parse_request(head: &str) -> Result<Request, ParseError> {
    let mut lines = head
        .split(|c: char| c == '\r' || c == '\n')
        .filter(|line| !line.is_empty());

    let request_line = lines.next().ok_or(ParseError::Empty)?;
    // Inner runs of spaces collapse; a leading or trailing space still
    // leaves an empty token, which rejects the line.
    let pieces: Vec<&str> = request_line.split(' ').collect();
    let last = pieces.len() - 1;
    let parts: Vec<&str> = pieces
        .iter()
        .enumerate()
        .filter(|(i, piece)| !piece.is_empty() || *i == 0 || *i == last)
        .map(|(_, piece)| *piece)
        .collect();
    let [method, target, version] = parts.as_slice() else {
        return Err(ParseError::RequestLine(request_line.to_string()));
    };
    if [method, target, version].iter().any(|part| part.is_empty()) {
        return Err(ParseError::RequestLine(request_line.to_string()));
    }
    if *method != "GET" {
        return Err(ParseError::Method(method.to_string()));
    }

    let mut headers = HashMap::new();
    for line in lines {
        let line = line.trim();
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ParseError::Header(line.to_string()))?;
        headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    Ok(Request {
        method: method.to_string(),
        target: target.to_string(),
        version: version.to_string(),
        headers,
    })
}
