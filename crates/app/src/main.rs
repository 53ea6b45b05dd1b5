//! Signboard - collaborative signature board server
//!
//! Serves the signature store, board placement and the tile pyramid the
//! pan/zoom viewer draws from.

mod error;
mod handlers;
mod seed;
mod state;
mod store;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use board::Board;
use signboard_config::AppConfig;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use error::AppError;
use state::AppState;
use store::{JsonFileStore, MemoryStore, SignatureStore};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = signboard_config::load()?;
    let store = open_store(&config).await?;

    if config.server.seed_examples {
        seed::seed_if_empty(store.as_ref()).await?;
    }

    let board = Board::new(&config.board)?;
    let state = AppState::new(board, store, config.server.page_size);
    let loaded = state.reload().await?;
    info!(
        "Board ready: {}x{} cells, {} signatures, {} placement",
        config.board.grid.cols, config.board.grid.rows, loaded, config.board.placement
    );

    let ip: IpAddr = config
        .server
        .host
        .parse()
        .map_err(|_| AppError::Address(config.server.host.clone()))?;
    let addr = SocketAddr::new(ip, config.server.port);

    let (bound, server) = warp::serve(handlers::routes(state)).try_bind_with_graceful_shutdown(addr, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    })?;
    info!("Listening on http://{}", bound);
    server.await;
    info!("Server stopped");
    Ok(())
}

async fn open_store(config: &AppConfig) -> Result<Arc<dyn SignatureStore>, AppError> {
    match &config.server.store_path {
        Some(path) => {
            let store = JsonFileStore::open(path).await?;
            info!("Using signature file {}", store.path().display());
            Ok(Arc::new(store))
        }
        None => {
            info!("Keeping signatures in memory");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
