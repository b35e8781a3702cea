//! Multipart upload parsing shared by the OCR and prescription handlers.

use axum::extract::Multipart;
use tracing::debug;

use crate::server::error::ApiError;
use crate::utils::{is_allowed_image_type, ImageKind, ALLOWED_IMAGE_TYPES};

/// An image plus the optional form fields sent with it.
#[derive(Debug)]
pub struct UploadForm {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: String,
    pub file_id: Option<String>,
    pub phone: Option<String>,
}

impl UploadForm {
    /// Canonical content type for storage, e.g. `image/jpg` becomes `image/jpeg`.
    pub fn storage_content_type(&self) -> &'static str {
        ImageKind::from_content_type(&self.content_type)
            .unwrap_or(ImageKind::Jpeg)
            .content_type()
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Read the `file` field (and `file_id` / `phone` if present), enforcing the
/// allowed image types and the size limit.
pub async fn read_upload(mut multipart: Multipart, max_bytes: usize) -> Result<UploadForm, ApiError> {
    let mut file: Option<(Vec<u8>, Option<String>, String)> = None;
    let mut file_id = None;
    let mut phone = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Could not read file: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let content_type = field.content_type().unwrap_or("none").to_string();
                if !is_allowed_image_type(&content_type) {
                    return Err(ApiError::BadRequest(format!(
                        "Invalid file type: {}. Allowed: {}",
                        content_type,
                        ALLOWED_IMAGE_TYPES.join(", ")
                    )));
                }
                let filename = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Could not read file: {}", e)))?;
                file = Some((bytes.to_vec(), filename, content_type));
            }
            "file_id" => {
                file_id = field.text().await.ok().and_then(non_empty);
            }
            "phone" => {
                phone = field.text().await.ok().and_then(non_empty);
            }
            other => debug!("ignoring multipart field '{}'", other),
        }
    }

    let (bytes, filename, content_type) =
        file.ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;

    if bytes.len() > max_bytes {
        return Err(ApiError::BadRequest(format!(
            "File too large. Maximum size is {}MB",
            max_bytes / (1024 * 1024)
        )));
    }

    Ok(UploadForm {
        bytes,
        filename,
        content_type,
        file_id,
        phone,
    })
}
