//! Image storage on the external asset host.

mod cloudinary;

pub use cloudinary::CloudinaryUploader;

use async_trait::async_trait;

/// An image received from a client, ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    /// MIME type as declared by the client, e.g. `image/png`.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Encodes the image as a `data:` URI with a base64 payload.
    pub fn to_data_uri(&self) -> String {
        use base64::Engine;

        let payload = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.content_type, payload)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset host request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("asset host rejected the upload ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("asset host response has no URL")]
    MissingUrl,
}

/// Stores images and returns their public URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetUploader: Send + Sync {
    async fn upload_image(&self, image: ImageUpload) -> Result<String, AssetError>;
}
