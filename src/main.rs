//! Swift Node - GPU job tracking and analytics service

mod analytics;
mod error;
mod export;
mod filter;
mod models;
mod query;
mod routes;
mod services;
mod state;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::routes::{analytics as analytics_routes, export as export_routes, health, jobs, metrics};
use crate::services::provider::ProviderClient;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "swiftnode=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration
    let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()
        .expect("Invalid LISTEN_ADDR");

    let provider_base_url = std::env::var("PROVIDER_BASE_URL")
        .unwrap_or_else(|_| "https://console.vast.ai".to_string());

    let api_key = std::env::var("PROVIDER_API_KEY").ok().filter(|k| !k.is_empty());

    let use_fixtures = std::env::var("USE_FIXTURES")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    // Create provider client
    let provider = match ProviderClient::new(provider_base_url.clone(), api_key.clone(), use_fixtures)
    {
        Ok(provider) => provider,
        Err(e) => {
            error!(error = %e, "Failed to create provider client");
            std::process::exit(1);
        }
    };

    // Create application state
    let state = AppState::new(provider);

    // Build router
    let app = Router::new()
        // Health and metrics (Kubernetes probes + Prometheus)
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/metrics", get(metrics::prometheus_metrics))
        // Job query & passthrough
        .route("/api/v1/jobs", get(jobs::list_jobs))
        .route("/api/v1/jobs/raw", get(jobs::raw_jobs))
        // Export download
        .route("/api/v1/jobs/export", get(export_routes::export_jobs))
        // Analytics
        .route("/api/v1/analytics", get(analytics_routes::get_analytics))
        .route(
            "/api/v1/analytics/rollup",
            get(analytics_routes::get_rollup),
        )
        // State and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    info!(
        "Swift Node v{} starting on {}",
        env!("CARGO_PKG_VERSION"),
        listen_addr
    );
    info!("Provider: {}", provider_base_url);
    if use_fixtures {
        info!("Fixture mode forced via USE_FIXTURES");
    } else if api_key.is_none() {
        info!("PROVIDER_API_KEY not set, serving fixture data");
    }

    // Start server
    let listener = tokio::net::TcpListener::bind(listen_addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
