//! HTTP/1.1 protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (one worker)
//!     → connection.rs (buffer bytes, frame on "\r\n\r\n")
//!     → request.rs (request line + headers, GET only)
//!     → [routing layer builds the response]
//!     → response.rs (status line, headers, body)
//!     → connection.rs (write back, keep alive unless asked to close)
//! ```
//!
//! # Design Decisions
//! - No request bodies; a request ends at the blank line
//! - Bytes after a framed request stay buffered for the next one
//! - Any framing or parse error closes the connection without a response

pub mod connection;
pub mod request;
pub mod response;
pub mod server;

pub use connection::{FrameError, FrameState, HttpConnection};
pub use request::{parse_request, ParseError, Request, RequestId};
pub use response::Response;
pub use server::{serve_connection, SearchServer};
