//! Portal backend server binary.

use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tower::limit::ConcurrencyLimitLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use riise_backend::config::ServerConfig;
use riise_backend::handlers::{build_protected_routes, build_public_routes, PortalState};
use riise_backend::{auth, metrics, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    metrics::register_metrics().expect("failed to register metrics");
    info!("metrics registered at /metrics");

    info!("starting riise-backend server...");

    let server_config = ServerConfig::from_env();
    server_config.log();

    let state = Arc::new(PortalState::new(server_config.clone())?);

    let cors = server_config.cors.to_layer();

    // Auth wraps only the protected routes; health, metrics and signup stay
    // reachable without a credential.
    let protected = build_protected_routes(state.clone()).layer(
        axum::middleware::from_fn_with_state(state.clone(), auth::auth_middleware),
    );
    let public = build_public_routes(state.clone());

    let app = axum::Router::new()
        .merge(public)
        .merge(protected)
        .layer(axum::middleware::from_fn(middleware::track_metrics))
        .layer(cors)
        .layer(ConcurrencyLimitLayer::new(
            server_config.max_concurrent_requests,
        ));

    let addr = format!("{}:{}", server_config.host, server_config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
