//! Cloudinary upload client over the REST API.

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

use super::{AssetError, AssetUploader, ImageUpload};

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Uploads images with signed requests to `api.cloudinary.com`.
pub struct CloudinaryUploader {
    client: reqwest::Client,
    upload_url: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryUploader {
    pub fn new(
        cloud_name: &str,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AssetError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            upload_url: format!("https://api.cloudinary.com/v1_1/{cloud_name}/image/upload"),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        })
    }

    /// SHA-256 request signature over the signed parameters followed by the
    /// API secret. `timestamp` is the only signed parameter we send.
    fn sign(&self, timestamp: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("timestamp={timestamp}{}", self.api_secret));
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl AssetUploader for CloudinaryUploader {
    async fn upload_image(&self, image: ImageUpload) -> Result<String, AssetError> {
        let timestamp = chrono::Utc::now().timestamp();
        let signature = self.sign(timestamp);
        let timestamp = timestamp.to_string();
        let file = image.to_data_uri();

        let resp = self
            .client
            .post(&self.upload_url)
            .form(&[
                ("file", file.as_str()),
                ("api_key", self.api_key.as_str()),
                ("timestamp", timestamp.as_str()),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<ErrorResponse>()
                .await
                .map(|e| e.error.message)
                .unwrap_or_else(|_| "unreadable error body".to_string());
            return Err(AssetError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = resp.json().await?;
        let url = body.secure_url.or(body.url).ok_or(AssetError::MissingUrl)?;

        tracing::debug!(url = %url, bytes = image.bytes.len(), "Image uploaded");
        Ok(url)
    }
}
