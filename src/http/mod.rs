use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{commands::DomainLogic, ports::transaction::TransactionPort};

pub mod error;
pub mod handlers;

pub fn router<T>(logic: DomainLogic<T>) -> Router
where
    T: TransactionPort + Send + Sync + 'static,
{
    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/api/rewards", get(handlers::get_rewards::<T>))
        .route(
            "/api/rewards/:year/:month",
            get(handlers::get_rewards_by_month::<T>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(logic)
}

/// Serve the router until ctrl-c is received
pub async fn serve(port: u16, router: Router) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
