use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

/// Background removal for fitting results.
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// Return the image at `image_url` with its background removed.
    async fn remove_background(&self, image_url: &str) -> Result<Vec<u8>, BackgroundError>;
}

/// Client for the background-removal service.
pub struct BackgroundClient {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl BackgroundClient {
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, BackgroundError> {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(BackgroundError::Http)?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl BackgroundRemover for BackgroundClient {
    async fn remove_background(&self, image_url: &str) -> Result<Vec<u8>, BackgroundError> {
        let mut request = self
            .http
            .post(&self.endpoint)
            .json(&serde_json::json!({ "image_url": image_url }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(BackgroundError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackgroundError::Status(status.as_u16(), body));
        }

        let bytes = response.bytes().await.map_err(BackgroundError::Http)?;
        if bytes.is_empty() {
            return Err(BackgroundError::EmptyImage);
        }
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BackgroundError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Background removal returned HTTP {0}: {1}")]
    Status(u16, String),

    #[error("Background removal returned an empty image")]
    EmptyImage,
}
