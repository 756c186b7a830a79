//! Virtual Try-On Backend
//!
//! Pairs a user's default model photo with a garment photo, drives an
//! external AI fitting provider to completion, post-processes the result and
//! records it for later retrieval.

pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use app_state::AppState;

/// Upper bound on uploaded images.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Build the HTTP router.
pub fn router(state: AppState, prometheus: Arc<PrometheusHandle>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/v1/models", post(routes::models::create_model))
        .route("/api/v1/models/{model_id}", get(routes::models::get_model))
        .route(
            "/api/v1/models/{model_id}/try-on",
            post(routes::try_on::try_on),
        )
        .route(
            "/api/v1/models/{model_id}/fittings",
            get(routes::models::list_fittings),
        )
        .with_state(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus),
        )
        .fallback(|| async { routes::error::ApiError::not_found("No such route").into_response() })
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(axum::extract::DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES))
}
