use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{backend::Invoker, metrics, AdapterError, Result};

pub mod read;

/// Per-process state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub region: Arc<str>,
    pub invoker: Arc<dyn Invoker>,
}

impl AppState {
    pub fn new(region: impl Into<Arc<str>>, invoker: Arc<dyn Invoker>) -> Self {
        Self {
            region: region.into(),
            invoker,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/read", post(read::remote_read))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn metrics_handler() -> Result<impl IntoResponse> {
    let body = metrics::render().map_err(|e| AdapterError::Internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}

/// Binds the first of `addrs` that is available.
pub async fn bind(addrs: &[SocketAddr]) -> Result<TcpListener> {
    TcpListener::bind(addrs)
        .await
        .map_err(|e| AdapterError::Internal(format!("Failed to bind to {:?}: {}", addrs, e)))
}

pub async fn start_server(listener: TcpListener, state: AppState) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on {}", addr);
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AdapterError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_skips_unavailable_address() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let taken_addr = taken.local_addr().unwrap();
        let free: SocketAddr = "127.0.0.1:0".parse().unwrap();

        let listener = bind(&[taken_addr, free]).await.unwrap();
        assert_ne!(listener.local_addr().unwrap(), taken_addr);
    }

    #[tokio::test]
    async fn test_bind_fails_when_nothing_is_available() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let taken_addr = taken.local_addr().unwrap();

        let err = bind(&[taken_addr]).await.unwrap_err();
        assert!(matches!(err, AdapterError::Internal(_)));
    }
}
