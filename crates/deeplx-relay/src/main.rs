//! DeepLX Relay - Load-balancing relay for pooled translation upstreams

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::Config;
use relay_api::{AppState, create_router};
use relay_core::{Adapter, CoreError, DispatchEngine, LiveAdapter, PoolRefresher, UpstreamPool};

/// DeepLX Relay - one reliable translation endpoint over many unreliable upstreams
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "DEEPLX_RELAY_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "DEEPLX_RELAY_PORT")]
    port: Option<u16>,

    /// Path to the upstream list file
    #[arg(long, env = "DEEPLX_RELAY_UPSTREAMS")]
    upstreams: Option<String>,

    /// Output JSON-formatted logs
    #[arg(short = 'j', long)]
    json_logs: bool,

    /// Output debugging messages
    #[arg(short = 'd', long)]
    debug: bool,

    /// Detect missing translations; do not enable if the target
    /// language is not Chinese
    #[arg(short = 'c', long)]
    verify_completeness: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    if args.json_logs {
        config.logging.json = true;
    }
    if args.debug {
        config.logging.level = "debug".to_string();
    }
    if args.verify_completeness {
        config.translation.verify_completeness = true;
    }
    if let Some(upstreams) = args.upstreams {
        config.upstreams.file = upstreams;
    }

    init_logging(&config.logging);

    info!("Starting DeepLX Relay v{}", env!("CARGO_PKG_VERSION"));

    let adapter: Arc<dyn Adapter> =
        Arc::new(LiveAdapter::new().context("Failed to build upstream clients")?);
    let pool = Arc::new(UpstreamPool::new());
    let refresher = Arc::new(PoolRefresher::new(
        pool.clone(),
        adapter.clone(),
        PathBuf::from(&config.upstreams.file),
    ));

    // The first refresh is mandatory; an unreadable or empty upstream
    // list is fatal at startup.
    refresher
        .refresh()
        .await
        .context("Initial upstream check failed")?;

    let engine = Arc::new(DispatchEngine::new(
        pool,
        refresher.clone(),
        adapter,
        config.translation.verify_completeness,
    ));

    spawn_scheduled_refresh(refresher.clone(), config.refresh.interval_secs);

    let state = AppState::new(engine, refresher);
    let app = create_router(state).layer(TraceLayer::new_for_http());

    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);
    info!("Upstream list: {}", config.upstreams.file);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Re-probe the full upstream list on a fixed cadence, independent of
/// request traffic. A cycle that loses the in-progress race is skipped;
/// a failed cycle keeps the previous pool contents.
fn spawn_scheduled_refresh(refresher: Arc<PoolRefresher>, interval_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        // The first tick fires immediately; startup already refreshed.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match refresher.refresh().await {
                Ok(_) => {}
                Err(CoreError::AlreadyRefreshing) => {
                    warn!("currently rechecking, skipping scheduled refresh");
                }
                Err(e) => {
                    error!(error = %e, "scheduled refresh failed");
                }
            }
        }
    });
}

/// Initialize logging
fn init_logging(logging: &config::LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}
