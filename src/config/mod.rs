use serde::Deserialize;
use std::time::Duration;

use crate::services::poller::{PollError, PollPolicy};

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000")
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// R2 bucket name
    pub r2_bucket: String,

    /// R2 access key ID (S3-compatible)
    pub r2_access_key: String,

    /// R2 secret access key (S3-compatible)
    pub r2_secret_key: String,

    /// R2 endpoint URL
    pub r2_endpoint: String,

    /// Public base URL stored objects are served from
    pub r2_public_url: String,

    /// Virtual fitting provider base URL
    #[serde(default = "default_fitting_api_url")]
    pub fitting_api_url: String,

    /// Virtual fitting provider API key
    pub fitting_api_key: String,

    /// Provider model version used for every job
    #[serde(default = "default_fitting_model_name")]
    pub fitting_model_name: String,

    /// Longest time to wait for a fitting job, in milliseconds
    #[serde(default = "default_fitting_max_wait_ms")]
    pub fitting_max_wait_ms: u64,

    /// Delay between status polls, in milliseconds
    #[serde(default = "default_fitting_poll_interval_ms")]
    pub fitting_poll_interval_ms: u64,

    /// Timeout for a single outbound HTTP request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub fitting_request_timeout_secs: u64,

    /// Garment category classifier base URL
    pub classifier_api_url: String,

    /// Background removal endpoint
    pub background_api_url: String,

    /// Background removal API key, if the service requires one
    #[serde(default)]
    pub background_api_key: Option<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_fitting_api_url() -> String {
    "https://api.fashn.ai/v1".to_string()
}

fn default_fitting_model_name() -> String {
    "tryon-v1.6".to_string()
}

fn default_fitting_max_wait_ms() -> u64 {
    60_000
}

fn default_fitting_poll_interval_ms() -> u64 {
    1_000
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Poll budget for fitting jobs; rejects zero durations.
    pub fn poll_policy(&self) -> Result<PollPolicy, PollError> {
        PollPolicy::new(
            Duration::from_millis(self.fitting_max_wait_ms),
            Duration::from_millis(self.fitting_poll_interval_ms),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.fitting_request_timeout_secs)
    }
}
