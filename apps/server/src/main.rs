//! # Quillsync Session Gateway
//!
//! HTTP server binary: loads configuration, opens the credential store,
//! and serves the auth + sync routes until shutdown.

use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use quill_auth::{AuthService, TokenConfig, TokenKeeper};
use quill_db::{Database, DbConfig};
use quill_server::config::ServerConfig;
use quill_server::{app, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Quillsync session gateway...");

    // Load configuration
    let config = ServerConfig::load()?;
    info!(
        port = config.http_port,
        db_path = %config.database_path,
        "Configuration loaded"
    );

    // Open the credential store (runs migrations)
    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Credential store ready");

    // Build the token service
    let tokens = TokenKeeper::new(
        TokenConfig::new(&config.access_token_secret, &config.refresh_token_secret)
            .access_ttl_secs(config.access_token_ttl_secs)
            .refresh_ttl_secs(config.refresh_token_ttl_secs),
    );
    let auth = AuthService::new(db.clone(), tokens);

    // Opportunistic housekeeping; validity never depends on this.
    let swept = auth.sweep_expired().await?;
    if swept > 0 {
        info!(swept, "Removed expired refresh tokens");
    }

    let state = AppState::new(db, auth);

    // Start server
    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
