use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use uuid::Uuid;

use crate::models::fitting::{FittingModel, FittingRecord};

pub mod queries;

/// Initialize PostgreSQL connection pool
pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| sqlx::Error::Migrate(Box::new(e)))
}

/// Persistence boundary used by the try-on flow.
#[async_trait]
pub trait FittingStore: Send + Sync {
    /// Look up a model owned by `owner_id`.
    async fn find_model(&self, owner_id: &str, model_id: Uuid)
        -> Result<Option<FittingModel>, sqlx::Error>;

    /// Store the garment and result, and point the model at the new image, atomically.
    async fn save_fitting(&self, record: &FittingRecord) -> Result<(), sqlx::Error>;
}

/// [`FittingStore`] backed by PostgreSQL.
pub struct PgFittingStore {
    pool: PgPool,
}

impl PgFittingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FittingStore for PgFittingStore {
    async fn find_model(
        &self,
        owner_id: &str,
        model_id: Uuid,
    ) -> Result<Option<FittingModel>, sqlx::Error> {
        queries::get_model(&self.pool, owner_id, model_id).await
    }

    async fn save_fitting(&self, record: &FittingRecord) -> Result<(), sqlx::Error> {
        queries::save_fitting(&self.pool, record).await.map(|_| ())
    }
}
