//! HTTP API for prescription uploads and patient records.
//!
//! Provides:
//! - OCR endpoints that only read an image
//! - Authenticated upload, which stores the image and links it to a patient
//! - Patient views over both the blob store and the record store
//! - Signed `/files` links for locally stored images

mod auth;
pub mod error;
mod handlers;
mod routes;

pub use error::ApiError;
pub use handlers::ApiResponse;
pub use routes::create_router;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::AuthService;
use crate::config::Settings;
use crate::ocr::{create_backend, OcrBackend};
use crate::repository::{create_record_store, RecordStore};
use crate::storage::{create_blob_store, BlobStore, UrlSigner};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub ocr: Arc<dyn OcrBackend>,
    pub blobs: Arc<dyn BlobStore>,
    pub records: Arc<dyn RecordStore>,
    pub auth: Arc<AuthService>,
    /// Verifies `/files` links.
    pub signer: Arc<UrlSigner>,
    pub max_upload_bytes: usize,
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    /// Construct every collaborator from settings.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        settings.ensure_directories()?;

        let auth = AuthService::new(&settings.auth);
        let signer = match settings.storage.signing_secret.as_deref().filter(|s| !s.is_empty()) {
            Some(secret) => UrlSigner::new(secret, settings.public_base_url()),
            None => UrlSigner::new(auth.secret(), settings.public_base_url()),
        };

        let blobs = create_blob_store(&settings.storage, signer.clone())?;
        let records = create_record_store(&settings.records)?;
        let ocr = create_backend(&settings.ocr);

        let static_dir = settings.static_dir.clone().filter(|dir| {
            let exists = dir.is_dir();
            if !exists {
                warn!("Static directory {} not found; not serving /static", dir.display());
            }
            exists
        });

        Ok(Self {
            ocr,
            blobs,
            records,
            auth: Arc::new(auth),
            signer: Arc::new(signer),
            max_upload_bytes: settings.max_upload_bytes,
            static_dir,
        })
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::from_settings(settings)?;
    info!(
        "OCR: {}, storage: {}, records: {}",
        settings.ocr.backend, settings.storage.backend, settings.records.backend
    );
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tempfile::tempdir;
    use tower::ServiceExt;

    use crate::auth::hash_password;
    use crate::config::UserEntry;
    use crate::storage::StorageBackendType;

    const BOUNDARY: &str = "polyclinic-test-boundary";
    const BASE_URL: &str = "http://testserver";

    fn test_settings() -> Settings {
        let mut settings = Settings::mock();
        settings.public_base_url = Some(BASE_URL.to_string());
        settings.auth.jwt_secret = Some("router-test-secret".to_string());
        settings.auth.users = vec![UserEntry {
            username: "admin".to_string(),
            password_hash: hash_password("admin123"),
            role: "admin".to_string(),
        }];
        settings
    }

    fn app(settings: &Settings) -> axum::Router {
        create_router(AppState::from_settings(settings).unwrap())
    }

    struct Part<'a> {
        name: &'a str,
        filename: Option<&'a str>,
        content_type: Option<&'a str>,
        data: &'a [u8],
    }

    fn image(content_type: &'static str) -> Part<'static> {
        Part {
            name: "file",
            filename: Some("rx.jpg"),
            content_type: Some(content_type),
            data: b"\xff\xd8\xff\xe0fake-jpeg",
        }
    }

    fn text_field<'a>(name: &'a str, value: &'a str) -> Part<'a> {
        Part {
            name,
            filename: None,
            content_type: None,
            data: value.as_bytes(),
        }
    }

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
            if let Some(filename) = part.filename {
                disposition.push_str(&format!("; filename=\"{}\"", filename));
            }
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(b"\r\n");
            if let Some(content_type) = part.content_type {
                body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
            }
            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn multipart_request(uri: &str, token: Option<&str>, parts: &[Part<'_>]) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(multipart_body(parts))).unwrap()
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    async fn login(app: &axum::Router) -> String {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"username":"admin","password":"admin123"}"#))
            .unwrap();
        let (status, json) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        json["data"]["access_token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(&test_settings());
        let (status, json) = send(&app, get("/", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));

        let (status, json) = send(&app, get("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn test_login_and_verify() {
        let app = app(&test_settings());
        let token = login(&app).await;

        let (status, json) = send(&app, get("/api/auth/verify", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["valid"], true);
        assert_eq!(json["data"]["username"], "admin");
        assert_eq!(json["data"]["role"], "admin");
    }

    #[tokio::test]
    async fn test_login_rejects_bad_password() {
        let app = app(&test_settings());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"username":"admin","password":"nope"}"#))
            .unwrap();
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Incorrect username or password");
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = app(&test_settings());
        for uri in [
            "/api/auth/verify",
            "/api/prescriptions/patients",
            "/api/records/patients",
            "/api/records/patients/review",
        ] {
            let (status, json) = send(&app, get(uri, None)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
            assert_eq!(json["success"], false);
        }
        let (status, _) = send(&app, get("/api/records/patients", Some("not.a.token"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let request = multipart_request("/api/prescriptions/upload", None, &[image("image/jpeg")]);
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_extract_name_with_mock_ocr() {
        let app = app(&test_settings());
        let request = multipart_request("/api/ocr/extract-name", None, &[image("image/jpeg")]);
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["patient_name"], "Mock Patient");
        assert_eq!(json["data"]["confidence"], "high");

        let request = multipart_request("/api/ocr/extract-text", None, &[image("image/png")]);
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["data"]["text"].as_str().unwrap().contains("Mock Patient"));
    }

    #[tokio::test]
    async fn test_upload_validation() {
        let mut settings = test_settings();
        settings.max_upload_bytes = 8;
        let app = app(&settings);

        let request = multipart_request("/api/ocr/extract-name", None, &[image("text/plain")]);
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().starts_with("Invalid file type: text/plain"));

        let request = multipart_request("/api/ocr/extract-name", None, &[image("image/jpeg")]);
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().starts_with("File too large"));

        let request = multipart_request(
            "/api/ocr/extract-name",
            None,
            &[text_field("note", "no image here")],
        );
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No file provided");
    }

    #[tokio::test]
    async fn test_upload_links_records() {
        let app = app(&test_settings());
        let token = login(&app).await;

        let request = multipart_request(
            "/api/prescriptions/upload",
            Some(&token),
            &[image("image/jpeg"), text_field("file_id", "F-100")],
        );
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK, "{}", json);
        let data = &json["data"];
        assert_eq!(data["ocr"]["patient_name"], "Mock Patient");
        assert_eq!(data["details"]["age"], 30);
        assert_eq!(data["details"]["sex"], "M");
        assert_eq!(data["storage"]["clean_name"], "mock_patient");
        assert_eq!(data["storage"]["bucket"], "mock-bucket");
        assert!(data["storage"]["blob_name"]
            .as_str()
            .unwrap()
            .starts_with("prescriptions/mock_patient/"));
        assert!(data["storage"]["blob_name"].as_str().unwrap().ends_with(".jpg"));
        assert_eq!(data["new_patient"], true);
        let patient_id = data["patient_id"].as_str().unwrap().to_string();

        // same file id links to the same patient
        let request = multipart_request(
            "/api/prescriptions/upload",
            Some(&token),
            &[image("image/jpeg"), text_field("file_id", "F-100")],
        );
        let (_, json) = send(&app, request).await;
        assert_eq!(json["data"]["new_patient"], false);
        assert_eq!(json["data"]["patient_id"], patient_id.as_str());

        let (status, json) = send(&app, get("/api/prescriptions/patients", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["count"], 1);
        assert_eq!(json["data"]["patients"][0], "mock_patient");

        let (status, json) = send(
            &app,
            get("/api/prescriptions/patients/Mock%20Patient", Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["patient_name"], "Mock Patient");
        assert_eq!(json["data"]["count"], 2);
        assert!(json["data"]["prescriptions"][0]["url"]
            .as_str()
            .unwrap()
            .starts_with("https://mock-storage.local/prescriptions/mock_patient/"));

        let uri = format!("/api/records/patients/{}", patient_id);
        let (status, json) = send(&app, get(&uri, Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["patient"]["file_id"], "F-100");
        assert_eq!(json["data"]["patient"]["needs_review"], false);
        assert_eq!(json["data"]["prescriptions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_upload_without_identifiers_needs_review() {
        let app = app(&test_settings());
        let token = login(&app).await;

        let request = multipart_request("/api/prescriptions/upload", Some(&token), &[image("image/webp")]);
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        let patient_id = json["data"]["patient_id"].as_str().unwrap().to_string();

        let (_, json) = send(&app, get("/api/records/patients/review", Some(&token))).await;
        assert_eq!(json["data"]["count"], 1);
        assert_eq!(json["data"]["patients"][0]["patient_id"], patient_id.as_str());

        // adding a file id clears review and relinks prescriptions
        let request = Request::builder()
            .method(Method::PATCH)
            .uri(format!("/api/records/patients/{}", patient_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"file_id":"F-7"}"#))
            .unwrap();
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["patient"]["file_id"], "F-7");
        assert_eq!(json["data"]["patient"]["needs_review"], false);
        assert_eq!(json["data"]["prescriptions_updated"], 1);

        let (_, json) = send(&app, get("/api/records/patients/review", Some(&token))).await;
        assert_eq!(json["data"]["count"], 0);

        let uri = format!("/api/records/patients/{}", patient_id);
        let (_, json) = send(&app, get(&uri, Some(&token))).await;
        assert_eq!(json["data"]["prescriptions"][0]["file_id"], "F-7");
    }

    #[tokio::test]
    async fn test_upload_without_name_is_rejected() {
        let mut settings = test_settings();
        settings.ocr.mock_text = Some("Rx: Amoxicillin 500mg".to_string());
        let app = app(&settings);
        let token = login(&app).await;

        let request = multipart_request("/api/prescriptions/upload", Some(&token), &[image("image/jpeg")]);
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Could not extract patient name from prescription");

        let (_, json) = send(&app, get("/api/prescriptions/patients", Some(&token))).await;
        assert_eq!(json["data"]["count"], 0);
    }

    #[tokio::test]
    async fn test_upload_with_digit_only_name_is_rejected() {
        let mut settings = test_settings();
        settings.ocr.mock_text = Some("Patient Name: 12345\nDate: 2024-01-01".to_string());
        let app = app(&settings);
        let token = login(&app).await;

        let request = multipart_request("/api/prescriptions/upload", Some(&token), &[image("image/jpeg")]);
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Could not extract patient name from prescription");

        let (_, json) = send(&app, get("/api/prescriptions/patients", Some(&token))).await;
        assert_eq!(json["data"]["count"], 0);
        let (_, json) = send(&app, get("/api/records/patients", Some(&token))).await;
        assert_eq!(json["data"]["count"], 0);
    }

    #[tokio::test]
    async fn test_records_list_order_and_missing() {
        let app = app(&test_settings());
        let token = login(&app).await;

        let (status, json) = send(&app, get("/api/records/patients?order=created_at", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["count"], 0);

        let (status, _) = send(&app, get("/api/records/patients?order=age", Some(&token))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, json) = send(&app, get("/api/records/patients/nope", Some(&token))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["success"], false);

        let request = Request::builder()
            .method(Method::PATCH)
            .uri("/api/records/patients/nope")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"phone":"555"}"#))
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_signed_file_links_for_local_storage() {
        let dir = tempdir().unwrap();
        let mut settings = test_settings();
        settings.storage.backend = StorageBackendType::Local;
        settings.storage.root = dir.path().join("blobs");
        let app = app(&settings);
        let token = login(&app).await;

        let request = multipart_request("/api/prescriptions/upload", Some(&token), &[image("image/jpeg")]);
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        let url = json["data"]["storage"]["signed_url"].as_str().unwrap().to_string();
        let path = url.strip_prefix(BASE_URL).unwrap();
        assert!(path.starts_with("/files/prescriptions/mock_patient/"));

        let response = app.clone().oneshot(get(path, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"\xff\xd8\xff\xe0fake-jpeg");

        let tampered = format!("{}00", path);
        let (status, json) = send(&app, get(&tampered, None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["success"], false);

        let unsigned = path.split('?').next().unwrap();
        let (status, _) = send(&app, get(unsigned, None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
