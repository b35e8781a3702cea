//! OCR-only endpoints: nothing is stored.

use axum::extract::{Multipart, State};
use axum::Json;
use tracing::debug;

use super::api_types::{ApiResponse, TextResponse};
use super::helpers::read_upload;
use crate::extraction::{extract_patient_name, ExtractionResult};
use crate::server::error::ApiError;
use crate::server::AppState;

/// `POST /api/ocr/extract-name`
pub async fn extract_name(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ExtractionResult>>, ApiError> {
    let form = read_upload(multipart, state.max_upload_bytes).await?;
    let ocr = state.ocr.recognize(&form.bytes).await?;
    debug!(
        "{} OCR took {}ms ({} chars)",
        ocr.backend,
        ocr.processing_time_ms,
        ocr.text.len()
    );
    Ok(ApiResponse::ok(extract_patient_name(&ocr.text)))
}

/// `POST /api/ocr/extract-text`
pub async fn extract_text(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<TextResponse>>, ApiError> {
    let form = read_upload(multipart, state.max_upload_bytes).await?;
    let ocr = state.ocr.recognize(&form.bytes).await?;
    Ok(ApiResponse::ok(TextResponse { text: ocr.text }))
}
