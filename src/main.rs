use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use fitting_room::app_state::AppState;
use fitting_room::config::AppConfig;
use fitting_room::db::{self, PgFittingStore};
use fitting_room::services::{
    background::BackgroundClient,
    classifier::ClassifierClient,
    fitting::FittingClient,
    orchestrator::{TryOnOrchestrator, TryOnSettings},
    storage::R2Client,
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");
    let poll_policy = config.poll_policy().expect("Invalid fitting poll settings");

    tracing::info!(
        max_wait_ms = config.fitting_max_wait_ms,
        poll_interval_ms = config.fitting_poll_interval_ms,
        "Initializing fitting-room server"
    );

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    metrics::describe_counter!("tryon_requests_total", "Total try-on requests started");
    metrics::describe_counter!(
        "tryon_failures_total",
        "Try-on requests that ended in an error, by error code"
    );
    metrics::describe_histogram!(
        "tryon_processing_seconds",
        "End-to-end duration of successful try-on requests"
    );
    metrics::describe_counter!(
        "fitting_status_polls_total",
        "Status requests sent to the fitting provider"
    );

    // Initialize database connection pool
    tracing::info!("Connecting to PostgreSQL database");
    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Running database migrations");
    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Initializing R2 storage client");
    let storage = Arc::new(
        R2Client::new(
            &config.r2_bucket,
            &config.r2_endpoint,
            &config.r2_access_key,
            &config.r2_secret_key,
            &config.r2_public_url,
        )
        .expect("Failed to initialize R2 client"),
    );

    tracing::info!("Initializing external API clients");
    let fitting = FittingClient::new(
        &config.fitting_api_url,
        &config.fitting_api_key,
        config.request_timeout(),
    )
    .expect("Failed to initialize fitting client");
    let classifier = ClassifierClient::new(&config.classifier_api_url, config.request_timeout())
        .expect("Failed to initialize classifier client");
    let background = BackgroundClient::new(
        &config.background_api_url,
        config.background_api_key.clone(),
        config.request_timeout(),
    )
    .expect("Failed to initialize background removal client");

    let try_on = TryOnOrchestrator::new(
        Arc::new(classifier),
        storage.clone(),
        Arc::new(fitting),
        Arc::new(background),
        Arc::new(PgFittingStore::new(db_pool.clone())),
        TryOnSettings {
            model_name: config.fitting_model_name.clone(),
            poll_policy,
        },
    );

    let shutdown = CancellationToken::new();
    let state = AppState::new(db_pool, storage, try_on, shutdown.clone());
    let app = fitting_room::router(state, prometheus_handle);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .expect("Server error");

    tracing::info!("Server stopped");
}

/// Resolve on Ctrl-C, cancelling in-flight fitting waits first.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown requested, cancelling in-flight fittings");
    shutdown.cancel();
}
