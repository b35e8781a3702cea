//! Serves blobs through the signed links handed out by the local store.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::server::error::ApiError;
use crate::server::AppState;
use crate::storage::validate_blob_name;
use crate::utils::content_type_for_path;

#[derive(Debug, Deserialize)]
pub struct SignedParams {
    pub expires: Option<i64>,
    pub signature: Option<String>,
}

/// `GET /files/*blob?expires=..&signature=..`
pub async fn serve_file(
    State(state): State<AppState>,
    Path(blob_name): Path<String>,
    Query(params): Query<SignedParams>,
) -> Result<Response, ApiError> {
    let (Some(expires), Some(signature)) = (params.expires, params.signature) else {
        return Err(ApiError::Forbidden("Missing URL signature".to_string()));
    };
    state
        .signer
        .verify(&blob_name, expires, &signature)
        .map_err(|e| ApiError::Forbidden(e.to_string()))?;
    validate_blob_name(&blob_name)?;

    let content = state
        .blobs
        .fetch(&blob_name)
        .await?
        .ok_or_else(|| ApiError::NotFound("File not found".to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for_path(&blob_name)),
            (header::CACHE_CONTROL, "private, max-age=3600".to_string()),
        ],
        content,
    )
        .into_response())
}
