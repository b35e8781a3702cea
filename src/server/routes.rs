//! Router configuration for the API server.

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::auth::require_auth;
use super::handlers;
use super::AppState;

/// Multipart framing on top of the image itself.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/auth/verify", get(handlers::verify))
        .route("/api/prescriptions/upload", post(handlers::upload))
        .route(
            "/api/prescriptions/patients",
            get(handlers::list_patient_folders),
        )
        .route(
            "/api/prescriptions/patients/:patient_name",
            get(handlers::patient_prescriptions),
        )
        .route("/api/records/patients", get(handlers::list_patients))
        .route("/api/records/patients/review", get(handlers::review_queue))
        .route(
            "/api/records/patients/:patient_id",
            get(handlers::get_patient).patch(handlers::update_patient),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let mut router = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/ocr/extract-name", post(handlers::extract_name))
        .route("/api/ocr/extract-text", post(handlers::extract_text))
        .route("/files/*blob_name", get(handlers::serve_file))
        .merge(protected);

    if let Some(dir) = &state.static_dir {
        router = router.nest_service("/static", ServeDir::new(dir));
    }

    router
        .layer(DefaultBodyLimit::max(
            state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
