use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::garment::GarmentCategory;

/// A user's default model photo, the base image garments are fitted onto.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FittingModel {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Acting user and the model they want to dress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReference {
    pub owner_id: String,
    pub model_id: Uuid,
}

/// Input of one try-on run.
#[derive(Debug, Clone)]
pub struct TryOnRequest {
    pub garment_image: Vec<u8>,
    pub model: ModelReference,
    pub product_url: Option<String>,
}

/// Everything the persistence boundary stores for a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct FittingRecord {
    pub model_id: Uuid,
    pub owner_id: String,
    pub category: GarmentCategory,
    pub garment_url: String,
    pub product_url: Option<String>,
    pub provider_job_id: String,
    pub result_url: String,
}

/// A persisted try-on result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fitting {
    pub id: Uuid,
    pub model_id: Uuid,
    pub cloth_id: Uuid,
    pub category: String,
    pub garment_url: String,
    pub product_url: Option<String>,
    pub provider_job_id: String,
    pub result_url: String,
    pub created_at: DateTime<Utc>,
}

/// Result returned to the caller of a try-on run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TryOnResult {
    /// Processed result in our object store.
    pub result_image_url: String,
    /// Output image as returned by the fitting provider.
    pub provider_result_url: String,
    pub model_id: Uuid,
    pub model_name: String,
}

/// Metadata submitted alongside a garment image.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TryOnForm {
    #[garde(length(min = 1, max = 2048))]
    pub product_url: Option<String>,
}

/// Metadata submitted alongside a new model photo.
#[derive(Debug, Deserialize, Validate)]
pub struct ModelForm {
    #[garde(length(min = 1, max = 100))]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_on_form_validation() {
        assert!(TryOnForm { product_url: None }.validate().is_ok());
        assert!(TryOnForm {
            product_url: Some("https://shop.example/item/1".to_string())
        }
        .validate()
        .is_ok());
        assert!(TryOnForm {
            product_url: Some(String::new())
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_model_form_validation() {
        assert!(ModelForm { name: "Summer look".to_string() }.validate().is_ok());
        assert!(ModelForm { name: String::new() }.validate().is_err());
        assert!(ModelForm { name: "x".repeat(101) }.validate().is_err());
    }
}
