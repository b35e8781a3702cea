//! Patient records from the record store.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use super::api_types::{ApiResponse, PatientDetail, PatientList, PatientUpdated};
use crate::models::{PatientOrder, PatientUpdate};
use crate::server::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub order: Option<String>,
}

/// `GET /api/records/patients?order=name|created_at`
pub async fn list_patients(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<PatientList>>, ApiError> {
    let order = match params.order.as_deref() {
        None => PatientOrder::default(),
        Some(order) => PatientOrder::from_str(order).ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Invalid order '{}'. Use 'name' or 'created_at'",
                order
            ))
        })?,
    };
    let patients = state.records.list_patients(order).await?;
    Ok(ApiResponse::ok(PatientList {
        count: patients.len(),
        patients,
    }))
}

/// `GET /api/records/patients/review`
pub async fn review_queue(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PatientList>>, ApiError> {
    let patients = state.records.list_patients_needing_review().await?;
    Ok(ApiResponse::ok(PatientList {
        count: patients.len(),
        patients,
    }))
}

/// `GET /api/records/patients/:id`
pub async fn get_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<ApiResponse<PatientDetail>>, ApiError> {
    let patient = state
        .records
        .get_patient(&patient_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Patient not found: {}", patient_id)))?;
    let prescriptions = state.records.prescriptions_for_patient(&patient_id).await?;
    Ok(ApiResponse::ok(PatientDetail {
        patient,
        prescriptions,
    }))
}

/// `PATCH /api/records/patients/:id`
///
/// A new file id is copied onto every prescription of the patient. Once a
/// file id or phone is known the patient no longer needs review, unless the
/// request says otherwise.
pub async fn update_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    Json(mut update): Json<PatientUpdate>,
) -> Result<Json<ApiResponse<PatientUpdated>>, ApiError> {
    if update.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }
    if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::BadRequest("Name cannot be empty".to_string()));
    }
    if update.needs_review.is_none() && (update.file_id.is_some() || update.phone.is_some()) {
        update.needs_review = Some(false);
    }

    let new_file_id = update.file_id.clone();
    if !state.records.update_patient(&patient_id, update).await? {
        return Err(ApiError::NotFound(format!("Patient not found: {}", patient_id)));
    }

    let prescriptions_updated = match &new_file_id {
        Some(file_id) => {
            state
                .records
                .update_prescriptions_file_id(&patient_id, file_id)
                .await?
        }
        None => 0,
    };
    info!(
        "Updated patient {} ({} prescriptions relinked)",
        patient_id, prescriptions_updated
    );

    let patient = state
        .records
        .get_patient(&patient_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Patient not found: {}", patient_id)))?;
    Ok(ApiResponse::ok(PatientUpdated {
        patient,
        prescriptions_updated,
    }))
}
