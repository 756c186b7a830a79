use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use garde::Validate;
use serde::Deserialize;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::queries;
use crate::models::fitting::{Fitting, FittingModel, ModelForm};
use crate::routes::error::{ApiError, ApiResult};
use crate::routes::{owner_id, ImageUpload};
use crate::services::storage::folders;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// POST /api/v1/models — Register a default model photo.
pub async fn create_model(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<FittingModel>)> {
    let owner_id = owner_id(&headers)?;
    let mut upload = ImageUpload::from_multipart(multipart).await?;

    let form = ModelForm {
        name: upload.take_field("name").unwrap_or_default(),
    };
    form.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let image_url = state
        .storage
        .upload(&upload.image, folders::MODELS)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Model image upload failed");
            ApiError::internal()
        })?;

    let model = queries::create_model(&state.db, &owner_id, &form.name, &image_url).await?;
    tracing::info!(model_id = %model.id, owner_id = %owner_id, "Model registered");

    Ok((StatusCode::CREATED, Json(model)))
}

/// GET /api/v1/models/{model_id}
pub async fn get_model(
    State(state): State<AppState>,
    Path(model_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<FittingModel>> {
    let owner_id = owner_id(&headers)?;
    queries::get_model(&state.db, &owner_id, model_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Model {} not found", model_id)))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

/// GET /api/v1/models/{model_id}/fittings — Past results, newest first.
pub async fn list_fittings(
    State(state): State<AppState>,
    Path(model_id): Path<Uuid>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Fitting>>> {
    let owner_id = owner_id(&headers)?;
    if queries::get_model(&state.db, &owner_id, model_id).await?.is_none() {
        return Err(ApiError::not_found(format!("Model {} not found", model_id)));
    }

    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let fittings = queries::list_fittings(&state.db, &owner_id, model_id, limit).await?;
    Ok(Json(fittings))
}
