//! Per-connection request framing.
//!
//! # Responsibilities
//! - Buffer bytes from the stream until a full request head has arrived
//! - Hand the head to the parser and keep any trailing bytes for the next
//!   request (pipelining)
//! - Write serialized responses back
//!
//! # State Machine
//! ```text
//! AwaitingData ──terminator found──▶ HaveTerminator ──parsed──▶ Parsed
//!      ▲                                                          │
//!      └──────────────────── next_request() ◀─────────────────────┘
//!
//! any failure or close() ──▶ Closed (terminal)
//! ```
//!
//! # Design Decisions
//! - One `HttpConnection` per socket, owned by exactly one worker
//! - No timeouts; a silent peer parks its worker until it sends or hangs up
//! - The only guard is a cap on bytes buffered without a terminator

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::request::{parse_request, ParseError, Request};
use crate::http::response::Response;

/// Blank line ending a request head.
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

const READ_CHUNK: usize = 4096;

/// Framing state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Waiting for the rest of a request head.
    AwaitingData,
    /// A full head is buffered and about to be parsed.
    HaveTerminator,
    /// The last request was parsed and handed out.
    Parsed,
    /// No further requests will be read.
    Closed,
}

/// Connection-fatal framing and I/O failures.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("connection already closed")]
    Closed,

    #[error("peer closed the connection")]
    PeerClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed request: {0}")]
    Malformed(#[from] ParseError),

    #[error("request head exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("short write while sending response")]
    ShortWrite,
}

impl FrameError {
    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            FrameError::Closed => "closed",
            FrameError::PeerClosed => "peer_closed",
            FrameError::Io(_) => "io",
            FrameError::Malformed(_) => "malformed",
            FrameError::TooLarge { .. } => "too_large",
            FrameError::ShortWrite => "short_write",
        }
    }
}

/// Buffered request reader and response writer over one stream.
#[derive(Debug)]
pub struct HttpConnection<S> {
    stream: S,
    buffer: Vec<u8>,
    /// Bytes at the front of `buffer` already known not to hold a terminator.
    scanned: usize,
    state: FrameState,
    max_request_bytes: usize,
}

impl<S> HttpConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, max_request_bytes: usize) -> Self {
        Self {
            stream,
            buffer: Vec::with_capacity(READ_CHUNK),
            scanned: 0,
            state: FrameState::AwaitingData,
            max_request_bytes,
        }
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Bytes received but not yet consumed by a request.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Read until a full request head is buffered, then parse it.
    ///
    /// Any error closes the connection; later calls return
    /// [`FrameError::Closed`].
    pub async fn next_request(&mut self) -> Result<Request, FrameError> {
        if self.state == FrameState::Closed {
            return Err(FrameError::Closed);
        }
        self.state = FrameState::AwaitingData;

        let result = self.frame().await;
        match &result {
            Ok(_) => self.state = FrameState::Parsed,
            Err(_) => self.state = FrameState::Closed,
        }
        result
    }

    /// Serialize and send `response` in full.
    pub async fn write_response(&mut self, response: &Response) -> Result<(), FrameError> {
        if self.state == FrameState::Closed {
            return Err(FrameError::Closed);
        }

        let bytes = response.to_bytes();
        let result = match self.stream.write_all(&bytes).await {
            Ok(()) => self.stream.flush().await.map_err(FrameError::from),
            Err(e) if e.kind() == std::io::ErrorKind::WriteZero => Err(FrameError::ShortWrite),
            Err(e) => Err(FrameError::Io(e)),
        };
        if result.is_err() {
            self.state = FrameState::Closed;
        }
        result
    }

    /// Stop reading requests from this connection.
    pub fn close(&mut self) {
        self.state = FrameState::Closed;
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    async fn frame(&mut self) -> Result<Request, FrameError> {
        let end = loop {
            if let Some(pos) = self.find_terminator() {
                break pos;
            }
            if self.buffer.len() >= self.max_request_bytes {
                return Err(FrameError::TooLarge {
                    limit: self.max_request_bytes,
                });
            }
            self.fill().await?;
        };
        self.state = FrameState::HaveTerminator;

        let consumed: Vec<u8> = self
            .buffer
            .drain(..end + HEADER_TERMINATOR.len())
            .collect();
        self.scanned = 0;

        let head = String::from_utf8_lossy(&consumed[..end]);
        Ok(parse_request(&head)?)
    }

    fn find_terminator(&mut self) -> Option<usize> {
        let from = self.scanned.saturating_sub(HEADER_TERMINATOR.len() - 1);
        let found = self.buffer[from..]
            .windows(HEADER_TERMINATOR.len())
            .position(|w| w == HEADER_TERMINATOR)
            .map(|pos| from + pos);
        if found.is_none() {
            self.scanned = self.buffer.len();
        }
        found
    }

    async fn fill(&mut self) -> Result<(), FrameError> {
        let mut chunk = [0u8; READ_CHUNK];
        let n = self.stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(FrameError::PeerClosed);
        }
        self.buffer.extend_from_slice(&chunk[..n]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    const LIMIT: usize = 64 * 1024;

    #[tokio::test]
    async fn reads_one_request() {
        let (mut client, server) = duplex(1024);
        let mut conn = HttpConnection::new(server, LIMIT);

        client
            .write_all(b"GET /query?terms=cat HTTP/1.1\r\nHost: x\r\n\r\n")
            .await
            .unwrap();

        let req = conn.next_request().await.unwrap();
        assert_eq!(req.target(), "/query?terms=cat");
        assert_eq!(req.header("host"), Some("x"));
        assert_eq!(conn.state(), FrameState::Parsed);
        assert_eq!(conn.buffered(), 0);
    }

    #[tokio::test]
    async fn fragmented_request_matches_whole() {
        let raw: &[u8] = b"GET /static/a.html HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n";

        let (mut client, server) = duplex(1024);
        let mut whole = HttpConnection::new(server, LIMIT);
        client.write_all(raw).await.unwrap();
        let expected = whole.next_request().await.unwrap();

        let (mut client, server) = duplex(1024);
        let mut split = HttpConnection::new(server, LIMIT);
        let writer = tokio::spawn(async move {
            // Split inside the terminator itself.
            let cut = raw.len() - 2;
            client.write_all(&raw[..cut]).await.unwrap();
            client.flush().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            client.write_all(&raw[cut..]).await.unwrap();
            client
        });

        let got = split.next_request().await.unwrap();
        let _client = writer.await.unwrap();
        assert_eq!(got, expected);
        assert!(got.wants_close());
    }

    #[tokio::test]
    async fn pipelined_requests_keep_trailing_bytes() {
        let (mut client, server) = duplex(1024);
        let mut conn = HttpConnection::new(server, LIMIT);

        client
            .write_all(b"GET /one HTTP/1.1\r\n\r\nGET /two HTTP/1.1\r\nA: b\r\n\r\nGET /thr")
            .await
            .unwrap();

        assert_eq!(conn.next_request().await.unwrap().target(), "/one");
        assert_eq!(conn.next_request().await.unwrap().target(), "/two");
        assert_eq!(conn.buffered(), "GET /thr".len());

        client.write_all(b"ee HTTP/1.1\r\n\r\n").await.unwrap();
        assert_eq!(conn.next_request().await.unwrap().target(), "/three");
    }

    #[tokio::test]
    async fn peer_hangup_mid_request_closes() {
        let (mut client, server) = duplex(1024);
        let mut conn = HttpConnection::new(server, LIMIT);

        client.write_all(b"GET / HTTP/1.1\r\nHost").await.unwrap();
        drop(client);

        assert!(matches!(conn.next_request().await, Err(FrameError::PeerClosed)));
        assert_eq!(conn.state(), FrameState::Closed);
        assert!(matches!(conn.next_request().await, Err(FrameError::Closed)));
    }

    #[tokio::test]
    async fn malformed_request_closes() {
        let (mut client, server) = duplex(1024);
        let mut conn = HttpConnection::new(server, LIMIT);

        client
            .write_all(b"POST / HTTP/1.1\r\n\r\nGET / HTTP/1.1\r\n\r\n")
            .await
            .unwrap();

        assert!(matches!(
            conn.next_request().await,
            Err(FrameError::Malformed(ParseError::Method(_)))
        ));
        assert!(matches!(conn.next_request().await, Err(FrameError::Closed)));
    }

    #[tokio::test]
    async fn oversized_head_is_rejected() {
        let (mut client, server) = duplex(4096);
        let mut conn = HttpConnection::new(server, 32);

        client
            .write_all(b"GET / HTTP/1.1\r\nX-Padding: aaaaaaaaaaaaaaaaaaaaaaaaaaaa\r\n")
            .await
            .unwrap();

        assert!(matches!(
            conn.next_request().await,
            Err(FrameError::TooLarge { limit: 32 })
        ));
    }

    #[tokio::test]
    async fn writes_full_response() {
        let (mut client, server) = duplex(1024);
        let mut conn = HttpConnection::new(server, LIMIT);

        conn.write_response(&Response::ok("text/plain", "hi"))
            .await
            .unwrap();
        drop(conn);

        let mut out = Vec::new();
        client.read_to_end(&mut out).await.unwrap();
        assert_eq!(
            out,
            b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 2\r\n\r\nhi"
        );
    }

    #[tokio::test]
    async fn write_after_close_fails() {
        let (_client, server) = duplex(1024);
        let mut conn = HttpConnection::new(server, LIMIT);
        conn.close();
        assert!(matches!(
            conn.write_response(&Response::ok("text/plain", "x")).await,
            Err(FrameError::Closed)
        ));
    }
}
