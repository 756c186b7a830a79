use axum::extract::{Multipart, Path, State};
use axum::http::HeaderMap;
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::fitting::{ModelReference, TryOnForm, TryOnRequest, TryOnResult};
use crate::routes::error::{ApiError, ApiResult};
use crate::routes::{owner_id, ImageUpload};

/// POST /api/v1/models/{model_id}/try-on — Dress a model in an uploaded garment.
///
/// Held open until the fitting provider finishes or the wait budget runs out.
pub async fn try_on(
    State(state): State<AppState>,
    Path(model_id): Path<Uuid>,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<Json<TryOnResult>> {
    let owner_id = owner_id(&headers)?;
    let mut upload = ImageUpload::from_multipart(multipart).await?;

    let form = TryOnForm {
        product_url: upload.take_field("product_url"),
    };
    form.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let request = TryOnRequest {
        garment_image: upload.image,
        model: ModelReference { owner_id, model_id },
        product_url: form.product_url,
    };

    let cancel = state.shutdown.child_token();
    let result = state.try_on.run_try_on(request, &cancel).await?;
    Ok(Json(result))
}
