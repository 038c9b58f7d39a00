//! Multipart form collection
//!
//! Upload endpoints receive multipart forms mixing text fields and file
//! fields. Files are spooled to temp files which the media host client
//! consumes and removes; unclaimed spools are removed when the form is
//! dropped.

use std::collections::HashMap;
use std::io::Write;

use axum::extract::Multipart;
use tempfile::NamedTempFile;

use crate::error::AppError;

const MAX_IMAGE_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const MAX_VIDEO_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

/// A spooled file field
#[derive(Debug)]
pub struct FileField {
    pub file: NamedTempFile,
    pub file_name: String,
    pub content_type: String,
}

/// Collected multipart form: text fields plus spooled file fields
#[derive(Debug, Default)]
pub struct FormData {
    texts: HashMap<String, String>,
    files: HashMap<String, FileField>,
}

impl FormData {
    /// Drain an axum multipart stream into memory/temp files.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("failed to parse multipart: {}", e)))?
        {
            let field_name = field.name().unwrap_or("").to_string();

            match field.file_name().map(ToOwned::to_owned) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .map(ToOwned::to_owned)
                        .ok_or_else(|| {
                            AppError::Validation(format!(
                                "missing content type for field {}",
                                field_name
                            ))
                        })?;

                    let max_bytes = if content_type.starts_with("video/") {
                        MAX_VIDEO_UPLOAD_BYTES
                    } else if content_type.starts_with("image/") {
                        MAX_IMAGE_UPLOAD_BYTES
                    } else {
                        return Err(AppError::Validation(format!(
                            "unsupported media type: {}",
                            content_type
                        )));
                    };

                    let mut file = NamedTempFile::new().map_err(|e| {
                        AppError::Internal(anyhow::anyhow!("failed to spool upload: {}", e))
                    })?;
                    let mut written = 0usize;
                    while let Some(chunk) = field.chunk().await.map_err(|e| {
                        AppError::Validation(format!("failed to read upload: {}", e))
                    })? {
                        written += chunk.len();
                        if written > max_bytes {
                            return Err(AppError::Validation(format!(
                                "file too large: exceeds {} bytes",
                                max_bytes
                            )));
                        }
                        file.write_all(&chunk).map_err(|e| {
                            AppError::Internal(anyhow::anyhow!("failed to spool upload: {}", e))
                        })?;
                    }

                    form.files.insert(
                        field_name,
                        FileField {
                            file,
                            file_name,
                            content_type,
                        },
                    );
                }
                None => {
                    let value = field.text().await.map_err(|e| {
                        AppError::Validation(format!("failed to read field: {}", e))
                    })?;
                    form.texts.insert(field_name, value);
                }
            }
        }

        Ok(form)
    }

    /// A text field, trimmed; None if absent or blank
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// A required text field; blank counts as missing
    pub fn require_text(&self, name: &str) -> Result<&str, AppError> {
        self.text(name)
            .ok_or_else(|| AppError::Validation(format!("{} is required", name)))
    }

    /// Take a file field out of the form
    pub fn take_file(&mut self, name: &str) -> Option<FileField> {
        self.files.remove(name)
    }

    /// Take a required file field out of the form
    pub fn require_file(&mut self, name: &str) -> Result<FileField, AppError> {
        self.take_file(name)
            .ok_or_else(|| AppError::Validation(format!("{} file is required", name)))
    }
}
