use async_trait::async_trait;
use image::ImageFormat;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use uuid::Uuid;

/// Logical folders images are stored under.
pub mod folders {
    pub const MODELS: &str = "models";
    pub const GARMENTS: &str = "garments";
    pub const RESULTS: &str = "fitting-results";
}

/// Durable image storage addressed by public URL.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under a fresh unique key in `folder` and return its URL.
    async fn upload(&self, data: &[u8], folder: &str) -> Result<String, StorageError>;
}

/// Client for Cloudflare R2 object storage (S3-compatible).
pub struct R2Client {
    bucket: Box<Bucket>,
    public_url: String,
}

impl R2Client {
    pub fn new(
        bucket_name: &str,
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
        public_url: &str,
    ) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: "auto".to_string(),
            endpoint: endpoint.to_string(),
        };

        let credentials =
            Credentials::new(Some(access_key), Some(secret_key), None, None, None)
                .map_err(|e| StorageError::Config(e.to_string()))?;

        let bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| StorageError::Config(e.to_string()))?;

        Ok(Self {
            bucket,
            public_url: public_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ObjectStore for R2Client {
    async fn upload(&self, data: &[u8], folder: &str) -> Result<String, StorageError> {
        let (extension, content_type) = describe_image(data);
        let key = object_key(folder, extension);

        let response = self
            .bucket
            .put_object_with_content_type(&key, data, content_type)
            .await
            .map_err(StorageError::S3)?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Rejected(status));
        }

        tracing::debug!(key = %key, bytes = data.len(), "Stored object");
        Ok(format!("{}/{}", self.public_url, key))
    }
}

/// Unique key for a new object, so concurrent uploads never collide.
fn object_key(folder: &str, extension: &str) -> String {
    format!("{}/{}.{}", folder.trim_matches('/'), Uuid::new_v4(), extension)
}

fn describe_image(data: &[u8]) -> (&'static str, &'static str) {
    match image::guess_format(data) {
        Ok(format @ (ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP)) => (
            format.extensions_str().first().copied().unwrap_or("bin"),
            format.to_mime_type(),
        ),
        _ => ("bin", "application/octet-stream"),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("S3 operation failed: {0}")]
    S3(#[from] s3::error::S3Error),

    #[error("Object store rejected upload with HTTP {0}")]
    Rejected(u16),

    #[error("Storage configuration error: {0}")]
    Config(String),
}
