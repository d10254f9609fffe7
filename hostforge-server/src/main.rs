mod api;
mod checkout;
mod config;
mod db;
mod error;
mod monitor;
mod payments;
mod session;
mod state;
mod whmcs;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hostforge_server=info,tower_http=info")),
        )
        .init();

    tracing::info!("HostForge server starting...");

    // Load .env file if present (non-fatal if missing).
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("no .env file loaded: {e}");
    }

    // Load configuration.
    let config = Config::from_env();
    tracing::info!(
        port = config.port,
        origins = config.allowed_origins.len(),
        whmcs_live = config.whmcs.is_some(),
        "configuration loaded"
    );

    // Create the database pool for the status subsystem, when configured.
    let pool = match &config.database_url {
        Some(url) => match db::pool::create_pool(url).await {
            Ok(pool) => {
                if let Err(e) = db::pool::run_migrations(&pool).await {
                    tracing::error!(error = %e, "failed to run database migrations");
                    std::process::exit(1);
                }
                Some(pool)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to create database pool");
                std::process::exit(1);
            }
        },
        None => {
            tracing::warn!("DATABASE_URL not set, status monitoring disabled");
            None
        }
    };

    // Build shared application state.
    let state = Arc::new(AppState::new(config, pool));

    // Background status checker; also sweeps the in-memory stores.
    tokio::spawn(monitor::checker::run(state.clone()));

    // Build the router and serve.
    let app = api::build_router(state.clone());
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind listener");
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, "HTTP API listening");
    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        tracing::error!(error = %e, "server exited with error");
        std::process::exit(1);
    }
}
