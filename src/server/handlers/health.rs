//! Liveness endpoints.

use axum::Json;

use super::api_types::{HealthStatus, RootStatus};

pub async fn root() -> Json<RootStatus> {
    Json(RootStatus {
        status: "healthy",
        message: "Polyclinic prescription API is running",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus { status: "healthy" })
}
