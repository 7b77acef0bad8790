//! Shared utilities for integration testing.

use std::collections::HashMap;
use std::fs;
use std::net::SocketAddr;
use std::time::Duration;

use search_server::config::ServerConfig;
use search_server::lifecycle::{self, Shutdown};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

/// Letters used to build one unique word per concurrency document.
pub const UNIQUE: &str = "abcdefghijklmnop";

/// A running server over a temporary document tree.
pub struct TestServer {
    pub addr: SocketAddr,
    pub docs: TempDir,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn connect(&self) -> BufReader<TcpStream> {
        BufReader::new(TcpStream::connect(self.addr).await.unwrap())
    }

    pub fn url(&self, target: &str) -> String {
        format!("http://{}{}", self.addr, target)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop")
            .unwrap();
    }
}

/// Write the fixture tree used by every test.
pub fn write_docs(root: &std::path::Path) {
    fs::write(root.join("alpha.txt"), "cat dog cat").unwrap();
    fs::write(root.join("beta.txt"), "Cat, bird!").unwrap();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub/gamma.html"), "<p>dog Dog</p>").unwrap();
    for letter in UNIQUE.chars() {
        fs::write(
            root.join(format!("u{letter}.txt")),
            format!("unique{letter} shared"),
        )
        .unwrap();
    }
}

/// Index the fixture tree and start a server on an ephemeral port.
///
/// `configure` runs after the defaults are filled in.
pub async fn start_server(configure: impl FnOnce(&mut ServerConfig)) -> TestServer {
    let docs = TempDir::new().unwrap();
    write_docs(docs.path());

    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.workers.pool_size = 8;
    config.index.roots = vec![docs.path().to_path_buf()];
    config.static_files.base_dir = docs.path().to_path_buf();
    config.lifecycle.shutdown_grace_secs = 1;
    configure(&mut config);

    let (server, listener) = lifecycle::start(&config).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    let handle = tokio::spawn(async move {
        server.run(listener, signal).await.unwrap();
    });

    TestServer {
        addr,
        docs,
        shutdown,
        handle,
    }
}

/// A response read off the wire.
#[derive(Debug)]
pub struct RawResponse {
    pub status_line: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Read exactly one response, using Content-Length to find its end.
pub async fn read_response(stream: &mut BufReader<TcpStream>) -> RawResponse {
    let mut status_line = String::new();
    stream.read_line(&mut status_line).await.unwrap();

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        stream.read_line(&mut line).await.unwrap();
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        let (name, value) = line.split_once(':').unwrap();
        headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    let length: usize = headers["content-length"].parse().unwrap();
    let mut body = vec![0; length];
    stream.read_exact(&mut body).await.unwrap();

    RawResponse {
        status_line: status_line.trim_end().to_string(),
        headers,
        body,
    }
}

/// True once the server has closed its end without sending anything more.
///
/// A reset counts as closed: the server may drop a socket with unread input.
pub async fn is_closed(stream: &mut BufReader<TcpStream>) -> bool {
    let mut rest = Vec::new();
    let read = tokio::time::timeout(Duration::from_secs(2), stream.read_to_end(&mut rest)).await;
    matches!(read, Ok(Ok(0)) | Ok(Err(_)))
}
