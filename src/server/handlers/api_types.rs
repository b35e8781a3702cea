//! Response envelope and typed payloads for the JSON API.

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::extraction::{ExtractionResult, PrescriptionDetails};
use crate::models::{Patient, Prescription};
use crate::storage::StoredBlob;

/// Standard API response envelope.
///
/// ```json
/// { "success": true, "data": { ... } }
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<ApiResponse<T>> {
        Json(ApiResponse {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct RootStatus {
    pub status: &'static str,
    pub message: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub username: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct TextResponse {
    pub text: String,
}

/// Result of `POST /api/prescriptions/upload`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub ocr: ExtractionResult,
    pub details: PrescriptionDetails,
    pub storage: StoredBlob,
    pub patient_id: String,
    pub prescription_id: String,
    /// A patient record was created for this upload.
    pub new_patient: bool,
}

#[derive(Debug, Serialize)]
pub struct PatientFolders {
    pub count: usize,
    pub patients: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BlobLink {
    pub blob_name: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct PatientBlobs {
    pub patient_name: String,
    pub count: usize,
    pub prescriptions: Vec<BlobLink>,
}

#[derive(Debug, Serialize)]
pub struct PatientList {
    pub count: usize,
    pub patients: Vec<Patient>,
}

#[derive(Debug, Serialize)]
pub struct PatientDetail {
    pub patient: Patient,
    pub prescriptions: Vec<Prescription>,
}

/// Result of `PATCH /api/records/patients/:id`.
#[derive(Debug, Serialize)]
pub struct PatientUpdated {
    pub patient: Patient,
    /// Prescriptions whose file id was rewritten.
    pub prescriptions_updated: usize,
}
