mod config;
mod error;
mod routes;
mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use config::ServerConfig;
use state::AppState;

#[tokio::main]
async fn main() {
    let config = ServerConfig::from_env();

    // Initialize logging
    init_logging(config.json_logs);

    info!(
        bybit = config.providers.has_bybit_credentials(),
        http_timeout = ?config.providers.http_timeout,
        "Starting trader-data server"
    );

    let state = match AppState::new(&config) {
        Ok(state) => state,
        Err(error) => {
            error!(%error, "failed to build HTTP client");
            std::process::exit(1);
        }
    };

    let app = Router::new()
        .merge(routes::api_router())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(error) => {
            error!(%addr, %error, "failed to bind");
            std::process::exit(1);
        }
    };

    info!("Trader data API listening on http://{addr}");

    if let Err(error) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(%error, "server error");
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, gracefully stopping");
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
