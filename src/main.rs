//! Affiliate Registration Service - Main Application Entry Point
//!
//! This is a REST API server for registering event sales affiliates. Each
//! registration derives a unique promotional code from the affiliate's name
//! and description, builds the tracking link for that code, and persists the
//! record in a Firestore collection keyed by the code.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Store**: Firestore REST API via reqwest (async requests)
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables (Firebase credentials
//!    are mandatory; startup aborts without them)
//! 2. Build the shared Firestore client handle
//! 3. Build HTTP router with routes and middleware
//! 4. Start server on configured port

mod config;
mod error;
mod firestore;
mod format;
mod handlers;
mod models;
mod services;

use tracing_subscriber::EnvFilter;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration; missing Firebase credentials abort startup here,
    // before any store operation can be attempted
    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Build the store client once; every handler shares this handle
    let store = firestore::FirestoreClient::new(&config)?;
    tracing::info!(project = %config.firebase_project_id, "Firestore client ready");

    // The registration and listing pages run in a browser on another
    // origin, so the API answers preflight requests for any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        // Health check
        .route("/health", get(handlers::health::health_check))
        // Affiliate routes
        .route(
            "/api/v1/affiliates",
            post(handlers::affiliates::register_affiliate),
        )
        .route(
            "/api/v1/affiliates",
            get(handlers::affiliates::list_affiliates),
        )
        .route(
            "/api/v1/affiliates/{codigo}",
            get(handlers::affiliates::get_affiliate),
        )
        .route(
            "/api/v1/affiliates/{codigo}",
            delete(handlers::affiliates::delete_affiliate),
        )
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Share the store client with all handlers via State extraction
        .with_state(store);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Start serving HTTP requests
    // This blocks forever, handling requests concurrently with tokio
    axum::serve(listener, app).await?;

    Ok(())
}
