//! Remote media host client
//!
//! Uploads and deletes binary assets on the external media-hosting
//! provider. The provider is an HTTP API authenticated with an API
//! key/secret pair; uploads return a stable public URL plus metadata
//! (duration for video assets).
//!
//! Upload input is a spooled temporary file; the file is consumed by the
//! call and removed whether the upload succeeds or fails. Deletion is a
//! cleanup side-effect: callers treat failures as observations, not as
//! failures of the primary operation.

use serde::Deserialize;
use tempfile::NamedTempFile;

use crate::config::MediaHostConfig;
use crate::error::AppError;
use crate::metrics::{MEDIA_DELETES_TOTAL, MEDIA_UPLOADS_TOTAL};

/// What is being uploaded; the provider transcodes and reports duration
/// for videos only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Video,
    Image,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Image => "image",
        }
    }
}

/// A successfully uploaded remote asset
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedAsset {
    /// Provider-side asset identifier, used for deletion
    pub asset_id: String,
    /// Stable public URL (forced to https)
    pub url: String,
    /// Duration in seconds, reported for video assets
    pub duration: Option<f64>,
}

/// Media host client
pub struct MediaHost {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl MediaHost {
    /// Create a new media host client.
    ///
    /// Every call is bounded by the configured timeout; a hung provider
    /// surfaces as a distinct upstream failure instead of blocking the
    /// request forever.
    pub fn new(config: &MediaHostConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent("Clipnest/0.1.0")
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(e.into()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    /// Upload a spooled temporary asset.
    ///
    /// The temp file is consumed and removed after the attempt, success
    /// or failure.
    ///
    /// # Arguments
    /// * `file` - Spooled upload, deleted when this call returns
    /// * `file_name` - Client-supplied file name, for the provider's benefit
    /// * `content_type` - MIME type
    /// * `kind` - Video or image
    pub async fn upload(
        &self,
        file: NamedTempFile,
        file_name: &str,
        content_type: &str,
        kind: AssetKind,
    ) -> Result<UploadedAsset, AppError> {
        let result = self
            .upload_inner(file.path(), file_name, content_type, kind)
            .await;

        // Temp file removal must not depend on the upload outcome
        if let Err(error) = file.close() {
            tracing::warn!(%error, "Failed to remove spooled upload file");
        }

        let status = if result.is_ok() { "success" } else { "error" };
        MEDIA_UPLOADS_TOTAL
            .with_label_values(&[kind.as_str(), status])
            .inc();

        result
    }

    async fn upload_inner(
        &self,
        path: &std::path::Path,
        file_name: &str,
        content_type: &str,
        kind: AssetKind,
    ) -> Result<UploadedAsset, AppError> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to read upload: {}", e)))?;

        let part = reqwest::multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|_| {
                AppError::Validation(format!("invalid content type: {}", content_type))
            })?;
        let form = reqwest::multipart::Form::new()
            .text("kind", kind.as_str())
            .part("file", part);

        let response = self
            .client
            .post(format!("{}/v1/assets", self.base_url))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(AppError::MediaHost(format!(
                "media host upload failed with status {}",
                response.status()
            )));
        }

        let mut asset: UploadedAsset = response.json().await.map_err(map_transport_error)?;
        asset.url = force_https(&asset.url);
        Ok(asset)
    }

    /// Delete a remote asset by its provider id.
    ///
    /// # Errors
    /// Callers decide whether the failure matters; most log and move on.
    pub async fn delete(&self, asset_id: &str) -> Result<(), AppError> {
        let result = self.delete_inner(asset_id).await;

        let status = if result.is_ok() { "success" } else { "error" };
        MEDIA_DELETES_TOTAL.with_label_values(&[status]).inc();

        result
    }

    async fn delete_inner(&self, asset_id: &str) -> Result<(), AppError> {
        let response = self
            .client
            .delete(format!("{}/v1/assets/{}", self.base_url, asset_id))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(AppError::MediaHost(format!(
                "media host delete failed with status {}",
                response.status()
            )));
        }

        Ok(())
    }
}

/// Derive the provider asset id from a stored public URL.
///
/// Asset URLs end in `/{asset_id}.{ext}`; records store URLs only, so
/// deletion works backwards from them.
pub fn asset_id_from_url(url: &str) -> Option<String> {
    let last_segment = url.trim_end_matches('/').rsplit('/').next()?;
    let id = last_segment
        .split_once('.')
        .map(|(stem, _ext)| stem)
        .unwrap_or(last_segment);

    (!id.is_empty()).then(|| id.to_string())
}

fn force_https(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}

fn map_transport_error(error: reqwest::Error) -> AppError {
    if error.is_timeout() {
        AppError::MediaHost("media host request timed out".to_string())
    } else {
        AppError::HttpClient(error)
    }
}
