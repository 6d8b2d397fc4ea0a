//! PromoKV Server Binary
//!
//! Starts the TCP server for PromoKV.

use std::sync::Arc;

use clap::Parser;
use promokv::network::Server;
use promokv::{Config, Engine, Profile};
use tracing_subscriber::{fmt, EnvFilter};

/// PromoKV Server
#[derive(Parser, Debug)]
#[command(name = "promokv-server")]
#[command(about = "In-memory promotion price store")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, env = "PROMOKV_LISTEN", default_value = "127.0.0.1:8080")]
    listen: String,

    /// Deployment profile ("production" selects release logging)
    #[arg(long, env = "APP_ENV", default_value = "development")]
    profile: String,

    /// Worker threads serving connections
    #[arg(short, long, env = "PROMOKV_WORKERS", default_value = "8")]
    workers: usize,

    /// Maximum queued connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Upload size limit in MB
    #[arg(short = 'u', long, env = "PROMOKV_MAX_UPLOAD_MB", default_value = "32")]
    max_upload_mb: usize,
}

fn main() {
    let args = Args::parse();

    // Infallible: unknown profiles fall back to development
    let profile = args.profile.parse::<Profile>().unwrap_or_default();

    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(profile.default_log_filter()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    tracing::info!("PromoKV Server v{}", promokv::VERSION);
    tracing::info!("Profile: {}", profile);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .profile(profile)
        .listen_addr(&args.listen)
        .worker_threads(args.workers)
        .max_connections(args.max_connections)
        .max_upload_bytes(args.max_upload_mb * 1024 * 1024)
        .build();

    let engine = match Engine::new(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to start engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine initialized with an empty dataset");

    let mut server = Server::new(config, engine);
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
