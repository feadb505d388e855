use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;

use secondbrain_agents::RootAgent;

use crate::error::ServerError;
use crate::routes::{health_routes, ingest_routes, query_routes, source_routes};

const MAX_BODY_SIZE_25MB: usize = 25 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<RootAgent>,
}

impl AppState {
    pub fn new(agent: RootAgent) -> Self {
        Self {
            agent: Arc::new(agent),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(ingest_routes())
        .merge(query_routes())
        .merge(source_routes())
        .with_state(state)
        .merge(health_routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE_25MB))
}

/// Bind and serve until Ctrl+C or SIGTERM.
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<(), ServerError> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| ServerError::Address(format!("{host}:{port}: {e}")))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Serving secondbrain API");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Could not install Ctrl+C handler");
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
                tracing::warn!(error = %e, "Could not install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
