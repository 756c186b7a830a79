//! JSON error responses for the HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::TryOnError;
use crate::services::error_translator::FailureClassification;

/// Error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<FailureClassification>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub classification: Option<FailureClassification>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            classification: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message)
    }

    pub fn unsupported_media(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, "INVALID_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Internal error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorResponse {
            code: self.code,
            message: self.message,
            classification: self.classification,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<TryOnError> for ApiError {
    fn from(err: TryOnError) -> Self {
        let status = match &err {
            TryOnError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            TryOnError::NotFound(_) => StatusCode::NOT_FOUND,
            TryOnError::VirtualFittingFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TryOnError::VirtualFittingTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            TryOnError::CategoryPredictionFailed
            | TryOnError::BackgroundRemovalFailed
            | TryOnError::VirtualFittingApiError { .. } => StatusCode::BAD_GATEWAY,
            TryOnError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            TryOnError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        Self {
            status,
            code: err.code().to_string(),
            message: err.to_string(),
            classification: err.classification(),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = %err, "Database error");
        ApiError::internal()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::ProviderError;
    use crate::services::error_translator::translate;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (TryOnError::InvalidRequest("bad".to_string()), StatusCode::BAD_REQUEST),
            (TryOnError::NotFound("gone".to_string()), StatusCode::NOT_FOUND),
            (TryOnError::CategoryPredictionFailed, StatusCode::BAD_GATEWAY),
            (TryOnError::BackgroundRemovalFailed, StatusCode::BAD_GATEWAY),
            (
                TryOnError::VirtualFittingTimeout {
                    job_id: "j1".to_string(),
                    waited: Duration::from_secs(60),
                },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                TryOnError::VirtualFittingApiError {
                    message: "down".to_string(),
                    provider_fault: true,
                },
                StatusCode::BAD_GATEWAY,
            ),
            (TryOnError::Cancelled, StatusCode::SERVICE_UNAVAILABLE),
            (TryOnError::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            let code = err.code();
            let api: ApiError = err.into();
            assert_eq!(api.status, expected, "{code}");
            assert_eq!(api.code, code);
            assert!(api.classification.is_none());
        }
    }

    #[test]
    fn test_failed_fitting_carries_classification() {
        let translated = translate(Some(&ProviderError {
            name: "PoseError".to_string(),
            message: "no pose detected".to_string(),
        }));
        let api: ApiError = TryOnError::VirtualFittingFailed(translated).into();
        assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(api.code, "VIRTUAL_FITTING_FAILED");
        assert_eq!(api.classification, Some(FailureClassification::Pose));
        assert!(api.message.contains("no pose detected"));

        let body = serde_json::to_value(ApiErrorResponse {
            code: api.code,
            message: api.message,
            classification: api.classification,
        })
        .unwrap();
        assert_eq!(body["classification"], "POSE");
    }

    #[test]
    fn test_database_error_is_internal() {
        let api: ApiError = sqlx::Error::RowNotFound.into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.code, "INTERNAL_ERROR");
        assert_eq!(api.message, "Internal error");
        assert!(api.classification.is_none());
    }
}
