use sqlx::PgPool;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::services::{orchestrator::TryOnOrchestrator, storage::ObjectStore};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub storage: Arc<dyn ObjectStore>,
    pub try_on: Arc<TryOnOrchestrator>,
    /// Cancelled when the server shuts down; in-flight fitting waits observe it.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        db: PgPool,
        storage: Arc<dyn ObjectStore>,
        try_on: TryOnOrchestrator,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            db,
            storage,
            try_on: Arc::new(try_on),
            shutdown,
        }
    }
}
