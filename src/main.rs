//! search-server
//!
//! Indexes the given directories, then answers queries over HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!   startup:  roots ──▶ crawler ──▶ WordIndex ──freeze──▶ SharedIndex
//!
//!   serving:
//!     Client ──▶ net::Listener ──▶ worker queue ──▶ worker N
//!                 (accept loop)      (FIFO)          │
//!                                                    ▼
//!                                  http::HttpConnection (frame, parse)
//!                                                    │
//!                                                    ▼
//!                                  routing::RequestRouter
//!                                     /static/* → file on disk
//!                                     otherwise → SharedIndex query
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use search_server::config::{read_config, validate_config, ConfigError, ServerConfig};
use search_server::lifecycle::{self, Shutdown};
use search_server::observability::{logging, metrics};

/// Multithreaded search server over a crawled document tree.
#[derive(Debug, Parser)]
#[command(name = "search-server", version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:5950.
    #[arg(short, long)]
    bind: Option<String>,

    /// Directory served under the static prefix.
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Number of worker tasks.
    #[arg(short, long)]
    workers: Option<usize>,

    /// Directories to crawl; added to any roots in the config file.
    #[arg(value_name = "CRAWL_ROOT")]
    roots: Vec<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ServerConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(dir) = self.static_dir {
            config.static_files.base_dir = dir;
        }
        if let Some(workers) = self.workers {
            config.workers.pool_size = workers;
        }
        config.index.roots.extend(self.roots);

        validate_config(&config)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;
    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        workers = config.workers.pool_size,
        roots = config.index.roots.len(),
        "search-server starting"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let (server, listener) = lifecycle::start(&config).await?;

    let shutdown = Shutdown::new();
    let signals = tokio::spawn(lifecycle::shutdown_on_signal(shutdown.clone()));

    server.run(listener, shutdown.subscribe()).await?;
    signals.abort();

    tracing::info!("Shutdown complete");
    Ok(())
}
