//! SQLite-backed record store.
//!
//! A single connection guarded by a mutex; every query runs on tokio's
//! blocking pool. Timestamps are stored as RFC 3339 strings with fixed
//! nanosecond precision so they sort lexically.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use super::backend::{RecordError, RecordResult, RecordStore};
use crate::extraction::Confidence;
use crate::models::{NewPatient, NewPrescription, Patient, PatientOrder, PatientUpdate, Prescription};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS patients (
        patient_id   TEXT PRIMARY KEY,
        name         TEXT NOT NULL,
        file_id      TEXT,
        phone        TEXT,
        needs_review INTEGER NOT NULL DEFAULT 0,
        created_at   TEXT NOT NULL,
        updated_at   TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_patients_file_id ON patients(file_id);
    CREATE INDEX IF NOT EXISTS idx_patients_phone ON patients(phone);

    CREATE TABLE IF NOT EXISTS prescriptions (
        prescription_id TEXT PRIMARY KEY,
        patient_id      TEXT NOT NULL REFERENCES patients(patient_id),
        file_id         TEXT,
        patient_name    TEXT NOT NULL,
        date            TEXT,
        age             INTEGER,
        sex             TEXT,
        weight          TEXT,
        image_url       TEXT NOT NULL,
        blob_name       TEXT NOT NULL,
        ocr_confidence  TEXT NOT NULL,
        needs_review    INTEGER NOT NULL DEFAULT 0,
        uploaded_at     TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_prescriptions_patient ON prescriptions(patient_id);
";

const PATIENT_COLUMNS: &str =
    "patient_id, name, file_id, phone, needs_review, created_at, updated_at";

const PRESCRIPTION_COLUMNS: &str = "prescription_id, patient_id, file_id, patient_name, date, \
     age, sex, weight, image_url, blob_name, ocr_confidence, needs_review, uploaded_at";

/// Persistent record store in a SQLite file.
#[derive(Clone)]
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// Open (creating if needed) a database file.
    pub fn open(path: impl AsRef<Path>) -> RecordResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| RecordError::Unavailable(e.to_string()))?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let store = Self::init(conn)?;
        info!("Record store opened at {}", path.display());
        Ok(store)
    }

    /// Open a private in-memory database.
    pub fn in_memory() -> RecordResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> RecordResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> RecordResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> RecordResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| RecordError::Unavailable("connection lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| RecordError::Unavailable(format!("database task failed: {}", e)))?
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e)))
}

fn row_to_patient(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        patient_id: row.get(0)?,
        name: row.get(1)?,
        file_id: row.get(2)?,
        phone: row.get(3)?,
        needs_review: row.get::<_, i64>(4)? != 0,
        created_at: parse_timestamp(&row.get::<_, String>(5)?)?,
        updated_at: parse_timestamp(&row.get::<_, String>(6)?)?,
    })
}

fn row_to_prescription(row: &Row<'_>) -> rusqlite::Result<Prescription> {
    let confidence: String = row.get(10)?;
    Ok(Prescription {
        prescription_id: row.get(0)?,
        patient_id: row.get(1)?,
        file_id: row.get(2)?,
        patient_name: row.get(3)?,
        date: row.get(4)?,
        age: row.get::<_, Option<i64>>(5)?.and_then(|a| u32::try_from(a).ok()),
        sex: row.get(6)?,
        weight: row.get(7)?,
        image_url: row.get(8)?,
        blob_name: row.get(9)?,
        ocr_confidence: Confidence::from_str(&confidence).unwrap_or(Confidence::Low),
        needs_review: row.get::<_, i64>(11)? != 0,
        uploaded_at: parse_timestamp(&row.get::<_, String>(12)?)?,
    })
}

fn find_patient_where(conn: &Connection, column: &str, value: &str) -> RecordResult<Option<Patient>> {
    let sql = format!(
        "SELECT {} FROM patients WHERE {} = ?1 ORDER BY created_at LIMIT 1",
        PATIENT_COLUMNS, column
    );
    Ok(conn.query_row(&sql, params![value], row_to_patient).optional()?)
}

fn query_patients(conn: &Connection, sql: &str) -> RecordResult<Vec<Patient>> {
    let mut stmt = conn.prepare(sql)?;
    let patients = stmt
        .query_map([], row_to_patient)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(patients)
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn find_patient_by_file_id(&self, file_id: &str) -> RecordResult<Option<Patient>> {
        let file_id = file_id.to_string();
        self.with_conn(move |conn| find_patient_where(conn, "file_id", &file_id))
            .await
    }

    async fn find_patient_by_phone(&self, phone: &str) -> RecordResult<Option<Patient>> {
        let phone = phone.to_string();
        self.with_conn(move |conn| find_patient_where(conn, "phone", &phone))
            .await
    }

    async fn get_patient(&self, patient_id: &str) -> RecordResult<Option<Patient>> {
        let patient_id = patient_id.to_string();
        self.with_conn(move |conn| find_patient_where(conn, "patient_id", &patient_id))
            .await
    }

    async fn create_patient(&self, patient: NewPatient) -> RecordResult<String> {
        let patient = Patient::from_new(patient);
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO patients (patient_id, name, file_id, phone, needs_review, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    patient.patient_id,
                    patient.name,
                    patient.file_id,
                    patient.phone,
                    i64::from(patient.needs_review),
                    timestamp(&patient.created_at),
                    timestamp(&patient.updated_at),
                ],
            )?;
            Ok(patient.patient_id)
        })
        .await
    }

    async fn update_patient(&self, patient_id: &str, update: PatientUpdate) -> RecordResult<bool> {
        let patient_id = patient_id.to_string();
        self.with_conn(move |conn| {
            let Some(mut patient) = find_patient_where(conn, "patient_id", &patient_id)? else {
                return Ok(false);
            };
            patient.apply(&update);
            conn.execute(
                "UPDATE patients SET name = ?2, file_id = ?3, phone = ?4, needs_review = ?5, updated_at = ?6
                 WHERE patient_id = ?1",
                params![
                    patient.patient_id,
                    patient.name,
                    patient.file_id,
                    patient.phone,
                    i64::from(patient.needs_review),
                    timestamp(&patient.updated_at),
                ],
            )?;
            Ok(true)
        })
        .await
    }

    async fn list_patients(&self, order: PatientOrder) -> RecordResult<Vec<Patient>> {
        let order_by = match order {
            PatientOrder::Name => "name COLLATE NOCASE ASC, created_at ASC",
            PatientOrder::CreatedAt => "created_at DESC",
        };
        let sql = format!("SELECT {} FROM patients ORDER BY {}", PATIENT_COLUMNS, order_by);
        self.with_conn(move |conn| query_patients(conn, &sql)).await
    }

    async fn list_patients_needing_review(&self) -> RecordResult<Vec<Patient>> {
        let sql = format!(
            "SELECT {} FROM patients WHERE needs_review = 1 ORDER BY created_at DESC",
            PATIENT_COLUMNS
        );
        self.with_conn(move |conn| query_patients(conn, &sql)).await
    }

    async fn create_prescription(&self, prescription: NewPrescription) -> RecordResult<String> {
        let p = Prescription::from_new(prescription);
        self.with_conn(move |conn| {
            let sql = format!(
                "INSERT INTO prescriptions ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                PRESCRIPTION_COLUMNS
            );
            conn.execute(
                &sql,
                params![
                    p.prescription_id,
                    p.patient_id,
                    p.file_id,
                    p.patient_name,
                    p.date,
                    p.age.map(i64::from),
                    p.sex,
                    p.weight,
                    p.image_url,
                    p.blob_name,
                    p.ocr_confidence.as_str(),
                    i64::from(p.needs_review),
                    timestamp(&p.uploaded_at),
                ],
            )?;
            Ok(p.prescription_id)
        })
        .await
    }

    async fn prescriptions_for_patient(&self, patient_id: &str) -> RecordResult<Vec<Prescription>> {
        let patient_id = patient_id.to_string();
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {} FROM prescriptions WHERE patient_id = ?1 ORDER BY uploaded_at DESC",
                PRESCRIPTION_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![patient_id], row_to_prescription)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
    }

    async fn update_prescriptions_file_id(&self, patient_id: &str, file_id: &str) -> RecordResult<usize> {
        let patient_id = patient_id.to_string();
        let file_id = file_id.to_string();
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE prescriptions SET file_id = ?2 WHERE patient_id = ?1",
                params![patient_id, file_id],
            )?;
            Ok(changed)
        })
        .await
    }
}
