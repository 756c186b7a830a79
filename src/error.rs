//! Errors raised at the try-on boundary.
//!
//! Every variant carries a message that is safe to show to end users; raw
//! provider and infrastructure detail is logged where the error is created.

use std::time::Duration;

use crate::services::error_translator::{FailureClassification, TranslatedError};

#[derive(Debug, thiserror::Error)]
pub enum TryOnError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Garment category prediction failed")]
    CategoryPredictionFailed,

    #[error("Background removal failed")]
    BackgroundRemovalFailed,

    #[error("Virtual fitting did not finish within {} seconds", .waited.as_secs())]
    VirtualFittingTimeout { job_id: String, waited: Duration },

    #[error("{message}")]
    VirtualFittingApiError { message: String, provider_fault: bool },

    #[error("{}", .0.user_message)]
    VirtualFittingFailed(TranslatedError),

    #[error("{0}")]
    NotFound(String),

    #[error("Try-on request was cancelled")]
    Cancelled,

    #[error("Internal error")]
    Internal,
}

impl TryOnError {
    /// Stable code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            TryOnError::InvalidRequest(_) => "INVALID_REQUEST",
            TryOnError::CategoryPredictionFailed => "CATEGORY_PREDICTION_FAILED",
            TryOnError::BackgroundRemovalFailed => "BACKGROUND_REMOVAL_FAILED",
            TryOnError::VirtualFittingTimeout { .. } => "VIRTUAL_FITTING_TIMEOUT",
            TryOnError::VirtualFittingApiError { .. } => "VIRTUAL_FITTING_API_ERROR",
            TryOnError::VirtualFittingFailed(_) => "VIRTUAL_FITTING_FAILED",
            TryOnError::NotFound(_) => "NOT_FOUND",
            TryOnError::Cancelled => "CANCELLED",
            TryOnError::Internal => "INTERNAL_ERROR",
        }
    }

    /// Sub-classification of a failed fitting job.
    pub fn classification(&self) -> Option<FailureClassification> {
        match self {
            TryOnError::VirtualFittingFailed(translated) => Some(translated.classification),
            _ => None,
        }
    }
}
