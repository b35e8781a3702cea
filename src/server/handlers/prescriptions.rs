//! Prescription upload and the blob-store views of stored images.

use axum::extract::{Multipart, Path, State};
use axum::{Extension, Json};
use tracing::{debug, info};

use super::api_types::{ApiResponse, BlobLink, PatientBlobs, PatientFolders, UploadResponse};
use super::helpers::{read_upload, UploadForm};
use crate::auth::Claims;
use crate::extraction::{extract_details, extract_patient_name, Confidence};
use crate::models::{NewPatient, NewPrescription};
use crate::repository::{RecordResult, RecordStore};
use crate::server::error::ApiError;
use crate::server::AppState;
use crate::utils::upload_extension;

/// Patient a new prescription is attached to.
struct LinkedPatient {
    patient_id: String,
    file_id: Option<String>,
    needs_review: bool,
    created: bool,
}

/// Find the patient by file id, else by phone; create one if neither matches.
async fn link_patient(
    records: &dyn RecordStore,
    name: &str,
    file_id: Option<String>,
    phone: Option<String>,
) -> RecordResult<LinkedPatient> {
    let existing = match (&file_id, &phone) {
        (Some(file_id), _) => records.find_patient_by_file_id(file_id).await?,
        (None, Some(phone)) => records.find_patient_by_phone(phone).await?,
        (None, None) => None,
    };

    if let Some(patient) = existing {
        debug!("linked upload to existing patient {}", patient.patient_id);
        return Ok(LinkedPatient {
            patient_id: patient.patient_id,
            file_id: patient.file_id,
            needs_review: patient.needs_review,
            created: false,
        });
    }

    let new = NewPatient::from_upload(name, file_id, phone);
    let needs_review = new.needs_review;
    let file_id = new.file_id.clone();
    let patient_id = records.create_patient(new).await?;
    info!("Created patient {} ({})", patient_id, name);
    Ok(LinkedPatient {
        patient_id,
        file_id,
        needs_review,
        created: true,
    })
}

/// `POST /api/prescriptions/upload`
pub async fn upload(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<UploadResponse>>, ApiError> {
    let form = read_upload(multipart, state.max_upload_bytes).await?;
    let content_type = form.storage_content_type();
    let extension = upload_extension(form.filename.as_deref(), &form.bytes);
    let UploadForm {
        bytes,
        file_id,
        phone,
        ..
    } = form;

    let ocr = state.ocr.recognize(&bytes).await?;
    let extraction = extract_patient_name(&ocr.text);
    let patient_name = extraction
        .patient_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| {
            ApiError::BadRequest("Could not extract patient name from prescription".to_string())
        })?;
    let details = extract_details(&extraction.full_text);

    let stored = state
        .blobs
        .upload(bytes, &patient_name, &extension, content_type)
        .await?;

    let linked = link_patient(state.records.as_ref(), &patient_name, file_id, phone).await?;
    let prescription_id = state
        .records
        .create_prescription(NewPrescription {
            patient_id: linked.patient_id.clone(),
            file_id: linked.file_id.clone(),
            patient_name: patient_name.clone(),
            details: details.clone(),
            image_url: stored.signed_url.clone(),
            blob_name: stored.blob_name.clone(),
            ocr_confidence: extraction.confidence,
            needs_review: linked.needs_review || extraction.confidence == Confidence::Low,
        })
        .await?;

    info!(
        "{} uploaded prescription {} for '{}' ({})",
        claims.sub, prescription_id, patient_name, stored.blob_name
    );

    Ok(ApiResponse::ok(UploadResponse {
        message: "Prescription uploaded successfully",
        ocr: extraction,
        details,
        storage: stored,
        patient_id: linked.patient_id,
        prescription_id,
        new_patient: linked.created,
    }))
}

/// `GET /api/prescriptions/patients`
pub async fn list_patients(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PatientFolders>>, ApiError> {
    let patients = state.blobs.list_patients().await?;
    Ok(ApiResponse::ok(PatientFolders {
        count: patients.len(),
        patients,
    }))
}

/// `GET /api/prescriptions/patients/:name`
pub async fn patient_prescriptions(
    State(state): State<AppState>,
    Path(patient_name): Path<String>,
) -> Result<Json<ApiResponse<PatientBlobs>>, ApiError> {
    let blob_names = state.blobs.list_for_patient(&patient_name).await?;
    let mut prescriptions = Vec::with_capacity(blob_names.len());
    for blob_name in blob_names {
        let url = state.blobs.signed_url(&blob_name).await?;
        prescriptions.push(BlobLink { blob_name, url });
    }

    Ok(ApiResponse::ok(PatientBlobs {
        patient_name,
        count: prescriptions.len(),
        prescriptions,
    }))
}
