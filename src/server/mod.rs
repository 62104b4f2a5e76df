//! Servidor HTTP do proxy.
//!
//! Rotas:
//!
//! - `GET /proxy_scores?cpf=...`: score do CPF (via [`ScoreProxy`]);
//! - `GET /stats`: estado do cache e da fila;
//! - `GET /healthcheck`: `ok`.

mod error;
mod handlers;

use std::future::Future;
use std::net::SocketAddr;

use anyhow::Context;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use crate::engine::ScoreProxy;

pub use error::{ApiErrorResponse, ResponseError};

/// Monta o router com o motor como estado.
pub fn create_app(proxy: ScoreProxy) -> Router {
    Router::new()
        .route("/proxy_scores", get(handlers::proxy_scores))
        .route("/stats", get(handlers::stats))
        .with_state(proxy)
        .route("/healthcheck", get(handlers::healthcheck))
}

/// Abre o socket de escuta.
pub async fn bind(addr: &str) -> anyhow::Result<TcpListener> {
    let socket: SocketAddr = addr
        .parse()
        .with_context(|| format!("invalid bind address `{}`", addr))?;
    TcpListener::bind(socket)
        .await
        .with_context(|| format!("unable to bind {}", socket))
}

/// Serve até `shutdown` completar.
pub async fn run<F>(listener: TcpListener, proxy: ScoreProxy, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local = listener.local_addr()?;
    tracing::info!("Starting HTTP server on {}", local);

    axum::serve(listener, create_app(proxy))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Completa no primeiro Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
