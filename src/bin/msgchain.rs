//! Records service: HTTP API plus the event worker in one process.
//!
//! ```sh
//! msgchain --listen-addr 0.0.0.0:3000 --wire-format msgpack
//! ```
//!
//! - `POST /v1/record` - create a record and publish it to the worker
//! - `GET /v1/record/:id` - fetch a record

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use msgchain::codec::WireFormat;
use msgchain::config::{self, Config};
use msgchain::record::Record;
use msgchain::service::{default_mapping, spawn_worker, worker_chain, RecordRoutes};
use msgchain::store::{MemoryStore, RecordStore};
use msgchain::transport::channel;

#[derive(Parser, Debug)]
#[command(name = "msgchain")]
#[command(about = "Records API with an in-process event worker")]
struct Args {
    /// HTTP listen address.
    #[arg(long, default_value_t = config::DEFAULT_LISTEN_ADDR, env = "MSGCHAIN_LISTEN_ADDR")]
    listen_addr: SocketAddr,

    /// Message channel capacity.
    #[arg(long, default_value_t = config::DEFAULT_CHANNEL_CAPACITY, env = "MSGCHAIN_CHANNEL_CAPACITY")]
    channel_capacity: usize,

    /// Channel payload encoding: json or msgpack.
    #[arg(long, default_value_t = WireFormat::Json, env = "MSGCHAIN_WIRE_FORMAT")]
    wire_format: WireFormat,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = config::DEFAULT_LOG_FILTER, env = "MSGCHAIN_LOG")]
    log: String,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            listen_addr: args.listen_addr,
            channel_capacity: args.channel_capacity,
            wire_format: args.wire_format,
            log_filter: args.log,
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from(Args::parse());
    init_tracing(&config.log_filter);

    let store: Arc<dyn RecordStore<Record>> = Arc::new(MemoryStore::<Record>::new());
    let (producer, consumer) = channel::<Record>(config.channel_capacity, config.wire_format);
    let closer = consumer.closer();

    let worker = spawn_worker(consumer, worker_chain(store.clone(), config.wire_format));
    let app = RecordRoutes::new(store, producer.clone(), default_mapping()).router();

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(
        addr = %config.listen_addr,
        wire_format = %config.wire_format,
        "records API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    producer.close();
    closer.close();

    let stats = worker.await.context("worker task failed")?;
    info!(
        processed = stats.processed,
        failed = stats.failed,
        "shutdown complete"
    );
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                error!("failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
