//! In-memory record store for single-process operation.
//!
//! State is not persisted across restarts.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::backend::{RecordResult, RecordStore};
use crate::models::{NewPatient, NewPrescription, Patient, PatientOrder, PatientUpdate, Prescription};

#[derive(Debug, Default)]
struct Tables {
    patients: HashMap<String, Patient>,
    prescriptions: HashMap<String, Prescription>,
}

/// Record store backed by shared hash maps.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_patients(patients: &mut [Patient], order: PatientOrder) {
    match order {
        PatientOrder::Name => patients.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.created_at.cmp(&b.created_at))
        }),
        PatientOrder::CreatedAt => patients.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn find_patient_by_file_id(&self, file_id: &str) -> RecordResult<Option<Patient>> {
        let tables = self.tables.read().await;
        Ok(tables
            .patients
            .values()
            .find(|p| p.file_id.as_deref() == Some(file_id))
            .cloned())
    }

    async fn find_patient_by_phone(&self, phone: &str) -> RecordResult<Option<Patient>> {
        let tables = self.tables.read().await;
        Ok(tables
            .patients
            .values()
            .find(|p| p.phone.as_deref() == Some(phone))
            .cloned())
    }

    async fn get_patient(&self, patient_id: &str) -> RecordResult<Option<Patient>> {
        Ok(self.tables.read().await.patients.get(patient_id).cloned())
    }

    async fn create_patient(&self, patient: NewPatient) -> RecordResult<String> {
        let patient = Patient::from_new(patient);
        let id = patient.patient_id.clone();
        self.tables.write().await.patients.insert(id.clone(), patient);
        Ok(id)
    }

    async fn update_patient(&self, patient_id: &str, update: PatientUpdate) -> RecordResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.patients.get_mut(patient_id) {
            Some(patient) => {
                patient.apply(&update);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_patients(&self, order: PatientOrder) -> RecordResult<Vec<Patient>> {
        let mut patients: Vec<Patient> = self.tables.read().await.patients.values().cloned().collect();
        sort_patients(&mut patients, order);
        Ok(patients)
    }

    async fn list_patients_needing_review(&self) -> RecordResult<Vec<Patient>> {
        let mut patients: Vec<Patient> = self
            .tables
            .read()
            .await
            .patients
            .values()
            .filter(|p| p.needs_review)
            .cloned()
            .collect();
        sort_patients(&mut patients, PatientOrder::CreatedAt);
        Ok(patients)
    }

    async fn create_prescription(&self, prescription: NewPrescription) -> RecordResult<String> {
        let prescription = Prescription::from_new(prescription);
        let id = prescription.prescription_id.clone();
        self.tables
            .write()
            .await
            .prescriptions
            .insert(id.clone(), prescription);
        Ok(id)
    }

    async fn prescriptions_for_patient(&self, patient_id: &str) -> RecordResult<Vec<Prescription>> {
        let mut prescriptions: Vec<Prescription> = self
            .tables
            .read()
            .await
            .prescriptions
            .values()
            .filter(|p| p.patient_id == patient_id)
            .cloned()
            .collect();
        prescriptions.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(prescriptions)
    }

    async fn update_prescriptions_file_id(&self, patient_id: &str, file_id: &str) -> RecordResult<usize> {
        let mut tables = self.tables.write().await;
        let mut changed = 0;
        for prescription in tables
            .prescriptions
            .values_mut()
            .filter(|p| p.patient_id == patient_id)
        {
            prescription.file_id = Some(file_id.to_string());
            changed += 1;
        }
        Ok(changed)
    }
}
