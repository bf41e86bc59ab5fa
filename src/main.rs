//! Media download gateway - main entry point
//!
//! Exposes one GET endpoint per supported platform that resolves a
//! social-media/video URL into a list of downloadable formats via yt-dlp.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod error;
mod extractor;
mod normalize;
mod platform;
mod probe;
mod process;
mod routes;

use extractor::{ExtractorConfig, Orchestrator};
use probe::SizeProber;
use routes::AppContext;

/// Command-line arguments for vidgate
#[derive(Parser, Debug)]
#[command(name = "vidgate")]
#[command(about = "HTTP gateway exposing downloadable media formats via yt-dlp")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "VIDGATE_PORT")]
    port: u16,

    /// Netscape cookie file handed to yt-dlp when the file exists
    #[arg(long, default_value = "cookies.txt", env = "VIDGATE_COOKIES")]
    cookies: PathBuf,

    /// Proxy URL forwarded to yt-dlp (e.g. socks5://127.0.0.1:1080)
    #[arg(long, env = "VIDGATE_PROXY")]
    proxy: Option<String>,

    /// Extraction timeout in seconds
    #[arg(long, default_value = "30", env = "VIDGATE_EXTRACT_TIMEOUT")]
    extract_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vidgate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Only pass the cookie file through when it actually exists; yt-dlp
    // errors out on a missing path.
    let cookies_path = args
        .cookies
        .exists()
        .then(|| args.cookies.to_string_lossy().to_string());
    match &cookies_path {
        Some(path) => info!("Using cookie file: {}", path),
        None => info!("No cookie file found, extracting without cookies"),
    }

    let extractor_config = ExtractorConfig {
        cookies_path,
        proxy: args.proxy,
        timeout_seconds: args.extract_timeout,
    };

    let ctx = AppContext {
        extractor: Arc::new(Orchestrator::new()),
        prober: Arc::new(SizeProber::new().context("Failed to build HTTP client")?),
        extractor_config: Arc::new(extractor_config),
    };

    let app = routes::router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Starting media gateway on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown on ctrl-c or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
