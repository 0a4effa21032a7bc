//! Sleep Tracker API - Main entry point
//!
//! This is the server that:
//! - Records wake/sleep events, one row per KST calendar day
//! - Persists records to a Supabase table over PostgREST
//! - Serves history lookups and a static landing page

mod api;
mod clock;
mod config;
mod db;
mod error;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::db::SleepStore;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub store: SleepStore,
}

#[tokio::main]
async fn main() -> Result<()> {
    if dotenvy::dotenv().is_ok() {
        println!("Loaded .env file");
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sleep_tracker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Sleep Tracker API");

    // Load configuration; missing Supabase credentials are fatal
    let config = AppConfig::from_env().context("failed to load configuration")?;

    let store = SleepStore::new(&config.supabase_url, &config.supabase_key);
    tracing::info!("Supabase store initialized");

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
    });

    let app = Router::new()
        .route("/record", post(api::record_time))
        .route("/records", get(api::list_records))
        .route("/records/{date}", get(api::get_record_by_date))
        .route("/health", get(api::health_check))
        .route_service("/", ServeFile::new(config.static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited")?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        tracing::info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
