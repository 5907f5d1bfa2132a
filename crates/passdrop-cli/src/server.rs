//! Server startup and lifecycle

use crate::{AppState, ServerConfig, routes};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Run the server until Ctrl-C
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    run_server_with_shutdown(config, shutdown_signal()).await
}

/// Run server with graceful shutdown
pub async fn run_server_with_shutdown(
    config: ServerConfig,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(config.clone())?);
    let app = routes::create_router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;

    info!(
        "Passdrop listening on http://{}{}",
        addr,
        config.normalized_base_path()
    );

    serve(listener, app, shutdown_signal).await?;

    info!("Server shutdown complete");

    Ok(())
}

/// Serve a router on a bound listener, exposing peer addresses to handlers
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Cannot listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
