use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status reported by the fitting provider for a try-on job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Starting,
    InQueue,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed and failed jobs never transition again.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Error object attached to a failed provider job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderError {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
}

impl ProviderError {
    /// Read whatever the provider put in an `error` field.
    ///
    /// Objects contribute their string `name` and `message`, a bare string is
    /// taken as the message, and any other non-null value is kept as text.
    pub fn from_value(value: &Value) -> Option<Self> {
        let text = |field: &str| {
            value
                .get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        match value {
            Value::Null => None,
            Value::Object(_) => Some(Self {
                name: text("name"),
                message: text("message"),
            }),
            Value::String(message) => Some(Self {
                name: String::new(),
                message: message.clone(),
            }),
            other => Some(Self {
                name: String::new(),
                message: other.to_string(),
            }),
        }
    }
}

/// Snapshot of a remote try-on job as returned by `GET /status/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TryOnJob {
    #[serde(rename = "id")]
    pub job_id: String,
    pub status: JobStatus,
    #[serde(rename = "output", default, deserialize_with = "null_as_empty")]
    pub output_urls: Vec<String>,
    #[serde(default, deserialize_with = "lenient_provider_error")]
    pub error: Option<ProviderError>,
}

impl TryOnJob {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A failed job must still decode when its `error` payload is malformed.
fn lenient_provider_error<'de, D>(deserializer: D) -> Result<Option<ProviderError>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(ProviderError::from_value))
}

/// Parameters for `POST /run`.
#[derive(Debug, Clone, PartialEq)]
pub struct FittingRequest {
    pub model_name: String,
    pub model_image: String,
    pub garment_image: String,
    pub category: Option<String>,
    pub mode: Option<String>,
    pub garment_photo_type: Option<String>,
    pub num_samples: Option<u32>,
    pub seed: Option<u64>,
}

impl FittingRequest {
    pub fn new(
        model_name: impl Into<String>,
        model_image: impl Into<String>,
        garment_image: impl Into<String>,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            model_image: model_image.into(),
            garment_image: garment_image.into(),
            category: None,
            mode: None,
            garment_photo_type: None,
            num_samples: None,
            seed: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}
