//! sc-server: HTTP API and background job execution for slidecast.
//!
//! This crate ties the other sc-* crates into a running server:
//!
//! - Axum-based HTTP API for uploads, status polling, download and reset
//! - SSE stream of job events
//! - Background execution of admitted jobs
//! - Graceful shutdown via signal handling, cancelling the active job

pub mod context;
pub mod error;
pub mod processor;
pub mod router;
pub mod routes;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use sc_core::config::Config;
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;

/// Start the slidecast server.
///
/// Discovers the external tools, builds the [`AppContext`] and serves the
/// API until a shutdown signal arrives or `cancel` is triggered.
pub async fn start(config: Config, cancel: CancellationToken) -> sc_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let tools = Arc::new(sc_av::ToolRegistry::discover(&config.tools));
    for info in tools.check_all() {
        if info.available {
            tracing::info!(
                "Tool found: {} ({})",
                info.name,
                info.version.as_deref().unwrap_or("unknown version")
            );
        } else {
            tracing::warn!("Tool not found: {}", info.name);
        }
    }

    let static_dir: Option<PathBuf> = config.server.static_dir.clone();
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| sc_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let ctx = AppContext::new(config, tools);
    ctx.store.ensure()?;
    tracing::info!("Artifacts under {}", ctx.store.root().display());

    let app = router::build_router(ctx.clone(), static_dir);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| sc_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;
    tracing::info!("Starting server on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel))
        .await?;

    ctx.jobs.cancel_active();
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM) or cancellation.
pub async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
        _ = cancel.cancelled() => {}
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shutdown_signal_returns_on_cancel() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        shutdown_signal(cancel).await;
    }

    #[tokio::test]
    async fn invalid_address_is_rejected() {
        let mut config = Config::default();
        config.server.host = "not an address".into();
        let err = start(config, CancellationToken::new()).await.unwrap_err();
        assert!(err.to_string().contains("Invalid server address"));
    }
}
