//! Login and token verification.

use axum::extract::State;
use axum::{Extension, Json};
use tracing::info;

use super::api_types::{ApiResponse, LoginRequest, LoginResponse, VerifyResponse};
use crate::auth::{AuthError, Claims};
use crate::server::error::ApiError;
use crate::server::AppState;

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let user = state
        .auth
        .authenticate(&credentials.username, &credentials.password)
        .ok_or(AuthError::InvalidCredentials)?;
    let access_token = state.auth.create_access_token(user)?;
    info!("User '{}' logged in", user.username);

    Ok(ApiResponse::ok(LoginResponse {
        access_token,
        token_type: "bearer",
        username: user.username.clone(),
    }))
}

/// `GET /api/auth/verify`, behind the bearer guard.
pub async fn verify(Extension(claims): Extension<Claims>) -> Json<ApiResponse<VerifyResponse>> {
    ApiResponse::ok(VerifyResponse {
        valid: true,
        username: claims.sub,
        role: claims.role,
    })
}
