// Review image storage (S3-compatible)

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::config::StorageConfig;
use crate::types::{AppError, AppResult};

pub mod s3_client;

pub use s3_client::*;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const KEY_PREFIX: &str = "reviews";
const RANDOM_SUFFIX_LEN: usize = 13;
const FALLBACK_EXTENSION: &str = "jpg";

/// An image received from the admin dashboard.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Served from the bucket's public URL
    S3,
    /// Inlined as a data URL because no public URL is configured
    Base64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub url: String,
    pub file_name: String,
    pub storage: StorageKind,
}

pub struct Storage {
    client: S3Client,
    public_base_url: Option<String>,
}

impl Storage {
    pub fn new(config: &StorageConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: S3Client::new(config)?,
            public_base_url: config.public_base_url.clone(),
        })
    }

    pub async fn upload_image(&self, upload: ImageUpload) -> AppResult<UploadedImage> {
        validate_image(&upload)?;

        let key = object_key(
            chrono::Utc::now().timestamp_millis(),
            &random_suffix(),
            &extension_for(&upload),
        );

        self.client
            .put_object(&key, &upload.data, &upload.content_type)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        info!(key = %key, bucket = %self.client.bucket_name(), "Uploaded review image");

        Ok(resolve_url(self.public_base_url.as_deref(), key, &upload))
    }
}

pub fn validate_image(upload: &ImageUpload) -> AppResult<()> {
    if upload.data.is_empty() {
        return Err(AppError::InvalidRequest("Image file is required".to_string()));
    }
    if upload.data.len() > MAX_IMAGE_BYTES {
        return Err(AppError::InvalidRequest("Image must be 5MB or smaller".to_string()));
    }
    if !upload.content_type.starts_with("image/") {
        return Err(AppError::InvalidRequest("Only image files can be uploaded".to_string()));
    }
    Ok(())
}

pub fn object_key(unix_millis: i64, suffix: &str, extension: &str) -> String {
    format!("{}/{}-{}.{}", KEY_PREFIX, unix_millis, suffix, extension)
}

fn random_suffix() -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..RANDOM_SUFFIX_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// Original file extension, else one registered for the content type.
pub fn extension_for(upload: &ImageUpload) -> String {
    let from_name = upload
        .file_name
        .as_deref()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    from_name
        .or_else(|| {
            mime_guess::get_mime_extensions_str(&upload.content_type)
                .and_then(|exts| exts.first())
                .map(|ext| ext.to_string())
        })
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

fn resolve_url(public_base_url: Option<&str>, key: String, upload: &ImageUpload) -> UploadedImage {
    match public_base_url {
        Some(base) => UploadedImage {
            url: format!("{}/{}", base.trim_end_matches('/'), key),
            file_name: key,
            storage: StorageKind::S3,
        },
        None => UploadedImage {
            url: format!("data:{};base64,{}", upload.content_type, BASE64.encode(&upload.data)),
            file_name: key,
            storage: StorageKind::Base64,
        },
    }
}
