use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;

use crate::models::garment::CategoryPrediction;

/// Garment category prediction.
#[async_trait]
pub trait CategoryPredictor: Send + Sync {
    async fn predict_category(&self, image_bytes: &[u8]) -> Result<CategoryPrediction, ClassifierError>;
}

/// Client for the garment category classifier service.
pub struct ClassifierClient {
    http: Client,
    predict_url: String,
}

impl ClassifierClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, ClassifierError> {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(ClassifierError::Http)?;

        Ok(Self {
            http,
            predict_url: format!("{}/predict", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl CategoryPredictor for ClassifierClient {
    /// Send a garment image to the classifier and return its top class.
    async fn predict_category(&self, image_bytes: &[u8]) -> Result<CategoryPrediction, ClassifierError> {
        let request_body = serde_json::json!({
            "image": base64::engine::general_purpose::STANDARD.encode(image_bytes),
        });

        let response = self
            .http
            .post(&self.predict_url)
            .json(&request_body)
            .send()
            .await
            .map_err(ClassifierError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Status(status.as_u16(), body));
        }

        response.json().await.map_err(ClassifierError::Http)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Classifier returned HTTP {0}: {1}")]
    Status(u16, String),
}
