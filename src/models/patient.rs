//! Patient records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A patient as held in the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub patient_id: String,
    pub name: String,
    /// Clinic file number, when known.
    pub file_id: Option<String>,
    pub phone: Option<String>,
    /// Created without a file id or phone; a clinician needs to fill them in.
    pub needs_review: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Materialize a new record with a fresh id and timestamps.
    pub fn from_new(new: NewPatient) -> Self {
        let now = Utc::now();
        Self {
            patient_id: uuid::Uuid::new_v4().to_string(),
            name: new.name,
            file_id: new.file_id,
            phone: new.phone,
            needs_review: new.needs_review,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update in place. Always refreshes `updated_at`.
    pub fn apply(&mut self, update: &PatientUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(file_id) = &update.file_id {
            self.file_id = Some(file_id.clone());
        }
        if let Some(phone) = &update.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(needs_review) = update.needs_review {
            self.needs_review = needs_review;
        }
        self.updated_at = Utc::now();
    }
}

/// Fields for creating a patient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub file_id: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub needs_review: bool,
}

impl NewPatient {
    /// A patient from an upload. Flagged for review when neither a file id
    /// nor a phone number was supplied.
    pub fn from_upload(name: impl Into<String>, file_id: Option<String>, phone: Option<String>) -> Self {
        let needs_review = file_id.is_none() && phone.is_none();
        Self {
            name: name.into(),
            file_id,
            phone,
            needs_review,
        }
    }
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub needs_review: Option<bool>,
}

impl PatientUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.file_id.is_none()
            && self.phone.is_none()
            && self.needs_review.is_none()
    }
}

/// Sort order for patient listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientOrder {
    /// Alphabetical by name.
    #[default]
    Name,
    /// Newest first.
    CreatedAt,
}

impl PatientOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::CreatedAt => "created_at",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "name" => Some(Self::Name),
            "created_at" | "created" => Some(Self::CreatedAt),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_without_identifiers_needs_review() {
        assert!(NewPatient::from_upload("A", None, None).needs_review);
        assert!(!NewPatient::from_upload("A", Some("F1".into()), None).needs_review);
        assert!(!NewPatient::from_upload("A", None, Some("555".into())).needs_review);
    }

    #[test]
    fn test_apply_update() {
        let mut patient = Patient::from_new(NewPatient::from_upload("Jane", None, None));
        let before = patient.updated_at;
        patient.apply(&PatientUpdate {
            file_id: Some("F-9".into()),
            needs_review: Some(false),
            ..PatientUpdate::default()
        });
        assert_eq!(patient.name, "Jane");
        assert_eq!(patient.file_id.as_deref(), Some("F-9"));
        assert!(!patient.needs_review);
        assert!(patient.updated_at >= before);
    }

    #[test]
    fn test_order_names() {
        assert_eq!(PatientOrder::from_str("created_at"), Some(PatientOrder::CreatedAt));
        assert_eq!(PatientOrder::from_str("bogus"), None);
        assert_eq!(PatientOrder::default().as_str(), "name");
    }
}
