//! Pluggable record store for patients and prescriptions.
//!
//! Allows swapping between in-memory (development, tests) and SQLite
//! (persistent) storage.

use async_trait::async_trait;

use crate::models::{NewPatient, NewPrescription, Patient, PatientOrder, PatientUpdate, Prescription};

/// Result type for record store operations.
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors from record store operations.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Corrupt record: {0}")]
    Corrupt(String),
    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for RecordError {
    fn from(e: rusqlite::Error) -> Self {
        RecordError::Database(e.to_string())
    }
}

/// Storage for patient and prescription records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_patient_by_file_id(&self, file_id: &str) -> RecordResult<Option<Patient>>;

    async fn find_patient_by_phone(&self, phone: &str) -> RecordResult<Option<Patient>>;

    async fn get_patient(&self, patient_id: &str) -> RecordResult<Option<Patient>>;

    /// Create a patient and return its generated id.
    async fn create_patient(&self, patient: NewPatient) -> RecordResult<String>;

    /// Apply a partial update. Returns `false` if the patient does not exist.
    async fn update_patient(&self, patient_id: &str, update: PatientUpdate) -> RecordResult<bool>;

    async fn list_patients(&self, order: PatientOrder) -> RecordResult<Vec<Patient>>;

    async fn list_patients_needing_review(&self) -> RecordResult<Vec<Patient>>;

    /// Create a prescription and return its generated id.
    async fn create_prescription(&self, prescription: NewPrescription) -> RecordResult<String>;

    /// A patient's prescriptions, newest first.
    async fn prescriptions_for_patient(&self, patient_id: &str) -> RecordResult<Vec<Prescription>>;

    /// Set the file id on every prescription of a patient. Returns the number
    /// of prescriptions changed.
    async fn update_prescriptions_file_id(&self, patient_id: &str, file_id: &str) -> RecordResult<usize>;
}
