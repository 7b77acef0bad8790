//! Response construction and serialization.
//!
//! # Responsibilities
//! - Hold status, protocol tag, content type and body
//! - Serialize to the wire format (status line, headers, blank line, body)
//! - Escape text interpolated into HTML bodies

pub const PROTOCOL: &str = "HTTP/1.1";

/// A complete response, written in one piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub protocol: String,
    pub status: u16,
    pub message: String,
    pub content_type: String,
    pub body: Vec<u8>,
    /// Emit `Connection: close`.
    pub close: bool,
}

impl Response {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            protocol: PROTOCOL.to_string(),
            status,
            message: message.into(),
            content_type: "text/html".to_string(),
            body: Vec::new(),
            close: false,
        }
    }

    /// 200 with the given content type and body.
    pub fn ok(content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, "OK")
            .with_content_type(content_type)
            .with_body(body)
    }

    /// 404 with an HTML body.
    pub fn not_found(html: impl Into<Vec<u8>>) -> Self {
        Self::new(404, "Not Found").with_body(html)
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_close(mut self, close: bool) -> Self {
        self.close = close;
        self
    }

    /// Serialize the status line, headers and body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!(
            "{} {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n",
            self.protocol,
            self.status,
            self.message,
            self.content_type,
            self.body.len()
        );
        if self.close {
            head.push_str("Connection: close\r\n");
        }
        head.push_str("\r\n");

        let mut out = head.into_bytes();
        out.extend_from_slice(&self.body);
        out
    }
}

/// Escape the characters that are significant in HTML text and attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
