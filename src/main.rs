//! Tic-Tac-Toe server binary - loads configuration, wires the coordinator
//! into the WebSocket router and serves until Ctrl-C.

use std::process::ExitCode;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tictactoe_server::adapters::websocket::{build_router, WebSocketState};
use tictactoe_server::application::{GameCoordinator, SessionRegistry};
use tictactoe_server::config::AppConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config);

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        return ExitCode::FAILURE;
    }

    let addr = match config.server.socket_addr() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(host = %config.server.host, error = %e, "Invalid bind address");
            return ExitCode::FAILURE;
        }
    };

    let coordinator = GameCoordinator::new(Arc::new(SessionRegistry::new()));
    let app = build_router(WebSocketState::new(coordinator, config.game.clone()));

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        read_timeout = ?config.game.read_timeout(),
        write_timeout = ?config.game.write_timeout(),
        keepalive_interval = ?config.game.keepalive_interval(),
        "Tic-tac-toe server listening"
    );

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    tracing::info!("Server stopped");
    ExitCode::SUCCESS
}

/// Installs the global subscriber: JSON in production, human-readable
/// otherwise. `RUST_LOG` wins over the configured filter.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
