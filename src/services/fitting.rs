use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::models::job::{FittingRequest, ProviderError, TryOnJob};

/// Transport to the virtual-fitting provider.
///
/// Implementations perform exactly one request per call and never retry.
#[async_trait]
pub trait RemoteJobClient: Send + Sync {
    /// Start a try-on job and return the provider-assigned job id.
    async fn submit(&self, request: &FittingRequest) -> Result<String, FittingApiError>;

    /// Fetch the current state of a job.
    async fn fetch_status(&self, job_id: &str) -> Result<TryOnJob, FittingApiError>;
}

/// HTTP client for the provider's `/run` and `/status/{id}` endpoints.
pub struct FittingClient {
    http: Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct RunRequest<'a> {
    model_name: &'a str,
    inputs: RunInputs<'a>,
}

#[derive(Serialize)]
struct RunInputs<'a> {
    model_image: &'a str,
    garment_image: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    garment_photo_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_samples: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Deserialize)]
struct RunResponse {
    id: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl FittingClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        request_timeout: Duration,
    ) -> Result<Self, FittingApiError> {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(FittingApiError::Transport)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Turn a non-2xx response into an error carrying the provider's body.
    async fn check_status(response: Response) -> Result<Response, FittingApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = %status, body = %body, "Fitting provider returned an error response");

        if status.is_server_error() {
            Err(FittingApiError::ProviderFault { status, body })
        } else {
            Err(FittingApiError::Rejected { status, body })
        }
    }
}

#[async_trait]
impl RemoteJobClient for FittingClient {
    async fn submit(&self, request: &FittingRequest) -> Result<String, FittingApiError> {
        let url = format!("{}/run", self.base_url);
        let body = RunRequest {
            model_name: &request.model_name,
            inputs: RunInputs {
                model_image: &request.model_image,
                garment_image: &request.garment_image,
                category: request.category.as_deref(),
                mode: request.mode.as_deref(),
                garment_photo_type: request.garment_photo_type.as_deref(),
                num_samples: request.num_samples,
                seed: request.seed,
            },
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(FittingApiError::Transport)?;

        let run: RunResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(FittingApiError::Decode)?;

        match (run.id, run.error) {
            (Some(id), None) if !id.is_empty() => Ok(id),
            (_, error) => {
                let body = error
                    .map(|e| describe_run_error(&e))
                    .unwrap_or_else(|| "provider returned no job id".to_string());
                tracing::warn!(body = %body, "Fitting provider refused the job");
                Err(FittingApiError::Rejected {
                    status: StatusCode::OK,
                    body,
                })
            }
        }
    }

    async fn fetch_status(&self, job_id: &str) -> Result<TryOnJob, FittingApiError> {
        let url = format!("{}/status/{}", self.base_url, job_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(FittingApiError::Transport)?;

        Self::check_status(response)
            .await?
            .json::<TryOnJob>()
            .await
            .map_err(FittingApiError::Decode)
    }
}

/// The run endpoint reports errors either as a string or as `{name, message}`.
fn describe_run_error(error: &serde_json::Value) -> String {
    match ProviderError::from_value(error) {
        Some(ProviderError { name, message }) if !name.is_empty() => {
            format!("{}: {}", name, message)
        }
        _ => match error {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FittingApiError {
    #[error("Fitting provider rejected the request ({status}): {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("Fitting provider failed ({status}): {body}")]
    ProviderFault { status: StatusCode, body: String },

    #[error("HTTP request to fitting provider failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to decode fitting provider response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl FittingApiError {
    /// True when the fault lies on the provider's side (HTTP 5xx).
    pub fn is_provider_fault(&self) -> bool {
        matches!(self, FittingApiError::ProviderFault { .. })
    }

    /// Message safe to show to end users.
    ///
    /// Client-side rejections embed the provider body so operators can act on
    /// it; transport problems stay generic and are only logged in detail.
    pub fn user_message(&self) -> String {
        match self {
            FittingApiError::Rejected { body, .. } => {
                format!("Virtual fitting request was rejected: {}", body)
            }
            FittingApiError::ProviderFault { body, .. } => {
                format!("Virtual fitting provider is failing: {}", body)
            }
            FittingApiError::Transport(_) | FittingApiError::Decode(_) => {
                "Virtual fitting service is unavailable".to_string()
            }
        }
    }
}
