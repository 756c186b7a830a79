use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::fitting::{Fitting, FittingModel, FittingRecord};

fn model_from_row(row: &PgRow) -> Result<FittingModel, sqlx::Error> {
    Ok(FittingModel {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        name: row.try_get("name")?,
        image_url: row.try_get("image_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Register a new default model photo
pub async fn create_model(
    pool: &PgPool,
    owner_id: &str,
    name: &str,
    image_url: &str,
) -> Result<FittingModel, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO fitting_models (owner_id, name, image_url)
        VALUES ($1, $2, $3)
        RETURNING id, owner_id, name, image_url, created_at, updated_at
        "#,
    )
    .bind(owner_id)
    .bind(name)
    .bind(image_url)
    .fetch_one(pool)
    .await?;

    model_from_row(&row)
}

/// Get a model by ID, scoped to its owner
pub async fn get_model(
    pool: &PgPool,
    owner_id: &str,
    model_id: Uuid,
) -> Result<Option<FittingModel>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, owner_id, name, image_url, created_at, updated_at
        FROM fitting_models
        WHERE id = $1 AND owner_id = $2
        "#,
    )
    .bind(model_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(model_from_row).transpose()
}

/// Persist a successful fitting.
///
/// Inserts the garment and the result, then moves the model's image to the
/// result, all in one transaction. Returns the new fitting ID.
pub async fn save_fitting(pool: &PgPool, record: &FittingRecord) -> Result<Uuid, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let cloth_id: Uuid = sqlx::query(
        r#"
        INSERT INTO clothes (model_id, owner_id, category, image_url, product_url)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(record.model_id)
    .bind(&record.owner_id)
    .bind(record.category.to_string())
    .bind(&record.garment_url)
    .bind(record.product_url.as_deref())
    .fetch_one(&mut *tx)
    .await?
    .try_get("id")?;

    let fitting_id: Uuid = sqlx::query(
        r#"
        INSERT INTO fittings (model_id, cloth_id, provider_job_id, result_url)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(record.model_id)
    .bind(cloth_id)
    .bind(&record.provider_job_id)
    .bind(&record.result_url)
    .fetch_one(&mut *tx)
    .await?
    .try_get("id")?;

    let updated = sqlx::query(
        r#"
        UPDATE fitting_models
        SET image_url = $1,
            updated_at = NOW()
        WHERE id = $2 AND owner_id = $3
        "#,
    )
    .bind(&record.result_url)
    .bind(record.model_id)
    .bind(&record.owner_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(sqlx::Error::RowNotFound);
    }

    tx.commit().await?;
    Ok(fitting_id)
}

/// List fittings for a model, newest first
pub async fn list_fittings(
    pool: &PgPool,
    owner_id: &str,
    model_id: Uuid,
    limit: i64,
) -> Result<Vec<Fitting>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT f.id, f.model_id, f.cloth_id, c.category, c.image_url AS garment_url,
               c.product_url, f.provider_job_id, f.result_url, f.created_at
        FROM fittings f
        JOIN clothes c ON c.id = f.cloth_id
        WHERE f.model_id = $1 AND c.owner_id = $2
        ORDER BY f.created_at DESC
        LIMIT $3
        "#,
    )
    .bind(model_id)
    .bind(owner_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|r| {
            Ok(Fitting {
                id: r.try_get("id")?,
                model_id: r.try_get("model_id")?,
                cloth_id: r.try_get("cloth_id")?,
                category: r.try_get("category")?,
                garment_url: r.try_get("garment_url")?,
                product_url: r.try_get("product_url")?,
                provider_job_id: r.try_get("provider_job_id")?,
                result_url: r.try_get("result_url")?,
                created_at: r.try_get("created_at")?,
            })
        })
        .collect()
}
