//! HTTP API server for asset-ownership circuit input generation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use clap::Parser;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod handlers;
mod routes;

use asset_zk_circuits::PoseidonHasher;
use asset_zk_prover::{MemoryNullifierRegistry, PipelineConfig};

/// Application state shared across handlers.
///
/// Holds no tree and no key material; every generate request builds its own.
pub struct AppState {
    pub hasher: PoseidonHasher,
    pub config: PipelineConfig,
    pub registry: RwLock<MemoryNullifierRegistry>,
}

impl AppState {
    pub fn new(hasher: PoseidonHasher, config: PipelineConfig) -> Self {
        Self {
            hasher,
            config,
            registry: RwLock::new(MemoryNullifierRegistry::new()),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "asset-zk-server", about = "HTTP API for circuit input generation")]
struct Args {
    #[arg(long, default_value_t = 3001)]
    port: u16,

    /// Pipeline defaults (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Build the router with CORS and request tracing.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match PipelineConfig::load_or_default(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    let hasher = match PoseidonHasher::new() {
        Ok(hasher) => hasher,
        Err(e) => {
            eprintln!("Failed to initialize Poseidon: {}", e);
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState::new(hasher, config));

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app(state))
        .await
        .expect("Server error");
}
