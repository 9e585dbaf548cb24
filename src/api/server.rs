use std::future::Future;
use std::net::SocketAddr;

use axum::{Router, routing::get, routing::post};
use tokio::net::TcpListener;
use tracing::info;

use super::{
    services::{dashboard, health, status, trigger_dashboard},
    state::AppState,
};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/dashboard", get(dashboard))
        .route("/trigger/dashboard", post(trigger_dashboard))
        .with_state(state)
}

/// Serve the router on `address` until `shutdown` resolves.
pub async fn run<S>(address: SocketAddr, state: AppState, shutdown: S) -> Result<(), AnyError>
where
    S: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(address).await?;
    info!(%address, "dashstate API listening");

    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
