//! Prescription records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extraction::{Confidence, PrescriptionDetails};

/// One uploaded prescription image and what was read from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescription {
    pub prescription_id: String,
    pub patient_id: String,
    pub file_id: Option<String>,
    pub patient_name: String,
    pub date: Option<String>,
    pub age: Option<u32>,
    pub sex: Option<String>,
    pub weight: Option<String>,
    pub image_url: String,
    pub blob_name: String,
    pub ocr_confidence: Confidence,
    pub needs_review: bool,
    pub uploaded_at: DateTime<Utc>,
}

impl Prescription {
    pub fn from_new(new: NewPrescription) -> Self {
        Self {
            prescription_id: uuid::Uuid::new_v4().to_string(),
            patient_id: new.patient_id,
            file_id: new.file_id,
            patient_name: new.patient_name,
            date: new.details.date,
            age: new.details.age,
            sex: new.details.sex,
            weight: new.details.weight,
            image_url: new.image_url,
            blob_name: new.blob_name,
            ocr_confidence: new.ocr_confidence,
            needs_review: new.needs_review,
            uploaded_at: Utc::now(),
        }
    }
}

/// Fields for creating a prescription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrescription {
    pub patient_id: String,
    pub file_id: Option<String>,
    pub patient_name: String,
    pub details: PrescriptionDetails,
    pub image_url: String,
    pub blob_name: String,
    pub ocr_confidence: Confidence,
    pub needs_review: bool,
}
