use std::collections::HashMap;

use axum::extract::Multipart;
use axum::http::HeaderMap;

use error::ApiError;

pub mod error;
pub mod health;
pub mod metrics;
pub mod models;
pub mod try_on;

/// Header identifying the acting device.
pub const DEVICE_ID_HEADER: &str = "x-device-id";

/// Read the acting owner from the request headers.
pub fn owner_id(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(DEVICE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::bad_request("Missing X-Device-Id header"))
}

/// Multipart upload carrying one `image` part plus text fields.
pub struct ImageUpload {
    pub image: Vec<u8>,
    pub fields: HashMap<String, String>,
}

impl ImageUpload {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut image: Option<Vec<u8>> = None;
        let mut fields = HashMap::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| ApiError::bad_request("Malformed multipart body"))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "image" {
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::bad_request("Could not read image"))?;

                // Validate image format using the `image` crate
                image::guess_format(&data)
                    .map_err(|_| ApiError::unsupported_media("Unsupported image format"))?;

                image = Some(data.to_vec());
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|_| ApiError::bad_request(format!("Could not read field {name}")))?;
                fields.insert(name, value);
            }
        }

        let image = image.ok_or_else(|| ApiError::bad_request("Missing image"))?;
        Ok(Self { image, fields })
    }

    pub fn take_field(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name).filter(|v| !v.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_owner_id_from_header() {
        let mut headers = HeaderMap::new();
        assert!(owner_id(&headers).is_err());

        headers.insert(DEVICE_ID_HEADER, HeaderValue::from_static("   "));
        assert!(owner_id(&headers).is_err());

        headers.insert(DEVICE_ID_HEADER, HeaderValue::from_static(" device-1 "));
        assert_eq!(owner_id(&headers).unwrap(), "device-1");
    }
}
