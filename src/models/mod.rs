//! Data models for patients and prescriptions.

mod patient;
mod prescription;

pub use patient::{NewPatient, Patient, PatientOrder, PatientUpdate};
pub use prescription::{NewPrescription, Prescription};
