//! Accept loop and per-connection serving.
//!
//! # Responsibilities
//! - Accept connections and queue one task per connection on the pool
//! - On a worker, loop: frame request → route → write response
//! - Stop on any framing failure or an explicit `Connection: close`
//! - On shutdown, stop accepting and drain open connections
//!
//! # Design Decisions
//! - The accept loop never reads or writes a client socket
//! - The index is reached only through the router's read-only handle
//! - Protocol errors end one connection; nothing else is affected

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::broadcast;

use crate::config::ServerConfig;
use crate::http::connection::{FrameError, HttpConnection};
use crate::http::request::RequestId;
use crate::index::SharedIndex;
use crate::net::{ConnectionGuard, ConnectionId, ConnectionPermit, ConnectionTracker, Listener, ListenerError};
use crate::observability::metrics;
use crate::routing::RequestRouter;
use crate::workers::WorkerPool;

/// One accepted connection waiting for a worker.
#[derive(Debug)]
pub struct ConnectionTask {
    stream: TcpStream,
    peer: SocketAddr,
    permit: ConnectionPermit,
    guard: ConnectionGuard,
}

/// The search server: a router over a frozen index plus a worker pool.
pub struct SearchServer {
    router: Arc<RequestRouter>,
    tracker: ConnectionTracker,
    pool_size: usize,
    queue_depth: usize,
    max_request_bytes: usize,
    shutdown_grace: Duration,
}

impl SearchServer {
    /// Create a server answering from `index`, which must be fully built.
    pub fn new(config: &ServerConfig, index: SharedIndex) -> Self {
        Self {
            router: Arc::new(RequestRouter::new(index, &config.static_files)),
            tracker: ConnectionTracker::new(),
            pool_size: config.workers.pool_size,
            queue_depth: config.workers.queue_depth,
            max_request_bytes: config.limits.max_request_bytes,
            shutdown_grace: Duration::from_secs(config.lifecycle.shutdown_grace_secs),
        }
    }

    pub fn router(&self) -> &Arc<RequestRouter> {
        &self.router
    }

    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    /// Accept and serve connections until `shutdown` fires.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        let addr = listener.local_addr().map_err(ListenerError::Bind)?;
        tracing::info!(
            address = %addr,
            workers = self.pool_size,
            queue_depth = self.queue_depth,
            "Search server accepting connections"
        );

        let router = Arc::clone(&self.router);
        let max_request_bytes = self.max_request_bytes;
        let mut pool = WorkerPool::spawn(
            self.pool_size,
            self.queue_depth,
            move |worker, task: ConnectionTask| {
                let router = Arc::clone(&router);
                async move { handle_task(worker, task, &router, max_request_bytes).await }
            },
        );

        let mut outcome = Ok(());
        loop {
            let accepted = tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting");
                    break;
                }
                accepted = listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, peer, permit)) => {
                    let task = ConnectionTask {
                        stream,
                        peer,
                        permit,
                        guard: self.tracker.track(),
                    };
                    // A full queue must not hide the shutdown signal.
                    tokio::select! {
                        _ = shutdown.recv() => {
                            tracing::info!("Shutdown signal received while workers were saturated");
                            break;
                        }
                        dispatched = pool.dispatch(task) => {
                            if dispatched.is_err() {
                                tracing::error!("Worker pool closed unexpectedly");
                                break;
                            }
                        }
                    }
                }
                Err(ListenerError::Accept(e)) if is_transient(&e) => {
                    tracing::debug!(error = %e, "Transient accept failure");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Accept failed, stopping server");
                    outcome = Err(e);
                    break;
                }
            }
        }

        pool.close();
        if !self.tracker.wait_idle(self.shutdown_grace).await {
            tracing::warn!(
                open_connections = self.tracker.active_count(),
                grace_secs = self.shutdown_grace.as_secs(),
                "Grace period elapsed, dropping open connections"
            );
            pool.abort();
        }
        pool.join().await;

        tracing::info!("Search server stopped");
        outcome
    }
}

fn is_transient(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::ConnectionAborted | ErrorKind::ConnectionReset | ErrorKind::Interrupted
    )
}

async fn handle_task(
    worker: usize,
    task: ConnectionTask,
    router: &RequestRouter,
    max_request_bytes: usize,
) {
    let ConnectionTask {
        stream,
        peer,
        permit,
        guard,
    } = task;
    let id = guard.id();

    tracing::info!(connection_id = %id, peer_addr = %peer, worker, "Client connected");
    let served = serve_connection(HttpConnection::new(stream, max_request_bytes), router, id).await;
    tracing::info!(connection_id = %id, requests = served, "Client disconnected");

    drop(guard);
    drop(permit);
}

/// Serve requests on one connection until it fails or asks to close.
///
/// Returns the number of responses written.
pub async fn serve_connection<S>(
    mut conn: HttpConnection<S>,
    router: &RequestRouter,
    id: ConnectionId,
) -> usize
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut served = 0;

    loop {
        let request = match conn.next_request().await {
            Ok(request) => request,
            Err(FrameError::PeerClosed) if conn.buffered() == 0 => {
                tracing::trace!(connection_id = %id, "Peer closed between requests");
                break;
            }
            Err(e) => {
                tracing::debug!(connection_id = %id, error = %e, "Closing connection");
                metrics::record_connection_error(e.reason());
                break;
            }
        };

        let request_id = RequestId::new();
        tracing::debug!(
            connection_id = %id,
            request_id = %request_id,
            target = %request.target(),
            "Request received"
        );

        let response = router.route(&request).await;
        tracing::debug!(
            connection_id = %id,
            request_id = %request_id,
            status = response.status,
            bytes = response.body.len(),
            "Sending response"
        );

        if let Err(e) = conn.write_response(&response).await {
            tracing::debug!(connection_id = %id, error = %e, "Write failed");
            metrics::record_connection_error(e.reason());
            break;
        }
        served += 1;

        if request.wants_close() {
            conn.close();
            break;
        }
    }

    served
}
