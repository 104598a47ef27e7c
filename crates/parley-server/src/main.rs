mod config;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use parley_api::{AppState, AppStateInner};
use parley_db::{Database, MemoryStore};

use crate::config::{DEFAULT_LOG_FILTER, ServerConfig, StoreBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let config = ServerConfig::from_env()?;

    // The schema must exist before the listener takes traffic.
    let state = match open_store(&config.store).await {
        Ok(state) => state,
        Err(e) => {
            error!("Error connecting to store: {:#}", e);
            std::process::exit(1);
        }
    };

    let app: Router = parley_api::router(state.clone())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("Parley listening on {}", config.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    drop(state);
    info!("Store session closed, shutting down");

    Ok(())
}

async fn open_store(backend: &StoreBackend) -> anyhow::Result<AppState> {
    let state = match backend {
        StoreBackend::Cassandra(store) => AppStateInner::new(Database::connect(store).await?),
        StoreBackend::Memory => {
            info!("Using in-memory store; nothing will be persisted");
            AppStateInner::new(MemoryStore::new())
        }
    };
    Ok(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
