//! Translation of fitting-provider error names into the internal taxonomy.
//!
//! Callers only ever see [`FailureClassification`]; the provider's own error
//! vocabulary stays confined to the table below.

use serde::Serialize;
use strum::{Display, IntoStaticStr};

use crate::models::job::ProviderError;

/// Provider-agnostic category of a failed fitting job.
#[derive(Debug, Clone, Copy, Serialize, Display, IntoStaticStr, PartialEq, Eq)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureClassification {
    ImageLoad,
    ContentModeration,
    PhotoType,
    Pose,
    Pipeline,
    Unknown,
}

impl FailureClassification {
    pub fn description(self) -> &'static str {
        match self {
            FailureClassification::ImageLoad => "The model or garment image could not be loaded",
            FailureClassification::ContentModeration => {
                "The image was rejected by content moderation"
            }
            FailureClassification::PhotoType => "The garment photo type could not be detected",
            FailureClassification::Pose => "No usable pose was detected in the model image",
            FailureClassification::Pipeline => "The fitting pipeline hit an internal error",
            FailureClassification::Unknown => "Virtual fitting failed for an unknown reason",
        }
    }
}

/// Provider error names, matched exactly.
const PROVIDER_ERROR_TABLE: &[(&str, FailureClassification)] = &[
    ("ImageLoadError", FailureClassification::ImageLoad),
    ("ContentModerationError", FailureClassification::ContentModeration),
    ("PhotoTypeError", FailureClassification::PhotoType),
    ("PoseError", FailureClassification::Pose),
    ("PipelineError", FailureClassification::Pipeline),
];

/// A terminal fitting failure expressed in internal terms.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TranslatedError {
    pub classification: FailureClassification,
    pub provider_error_name: String,
    pub provider_message: String,
    pub user_message: String,
}

impl TranslatedError {
    fn new(
        classification: FailureClassification,
        provider_error_name: String,
        provider_message: String,
    ) -> Self {
        let detail = provider_message.trim();
        let user_message = if detail.is_empty() {
            classification.description().to_string()
        } else {
            format!("{}: {}", classification.description(), detail)
        };

        Self {
            classification,
            provider_error_name,
            provider_message,
            user_message,
        }
    }

    /// A job the provider reported as completed but that carried no image.
    pub fn missing_output() -> Self {
        Self::new(
            FailureClassification::Pipeline,
            String::new(),
            "virtual fitting completed without a result image".to_string(),
        )
    }
}

/// Map a provider error to its internal classification.
///
/// Total over its input: an absent error object or an unrecognised name
/// yields [`FailureClassification::Unknown`].
pub fn translate(error: Option<&ProviderError>) -> TranslatedError {
    let Some(error) = error else {
        return TranslatedError::new(FailureClassification::Unknown, String::new(), String::new());
    };

    let classification = PROVIDER_ERROR_TABLE
        .iter()
        .find(|(name, _)| *name == error.name)
        .map(|(_, classification)| *classification)
        .unwrap_or(FailureClassification::Unknown);

    if classification == FailureClassification::Unknown {
        tracing::warn!(
            provider_error = %error.name,
            provider_message = %error.message,
            "Unrecognised fitting provider error"
        );
    }

    TranslatedError::new(classification, error.name.clone(), error.message.clone())
}
