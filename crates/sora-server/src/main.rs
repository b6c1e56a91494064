//! SORA Server - risk classification backend for UAS operation assessments

use anyhow::Result;
use axum::{middleware, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sora_server::api;
use sora_server::config::Config;
use sora_server::persistence;
use sora_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sora_server=debug".parse()?),
        )
        .init();

    tracing::info!("Starting SORA Server...");

    let config = Config::from_env();
    let tables = config.load_tables()?;
    tracing::info!("Using {} reference tables", tables.edition);

    let db = persistence::init_database(&config.database_path, config.database_max_connections)
        .await?;
    let state = Arc::new(AppState::with_database(tables, db));
    state.load_from_database().await?;

    if config.allow_admin_reset {
        tracing::warn!("Admin reset endpoint is enabled");
    }

    // Build the app
    let app = api::routes(&config)
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(middleware::from_fn(api::request_id::ensure_request_id))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Run server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
