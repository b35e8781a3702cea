//! Record store for patients and prescriptions.
//!
//! Backends:
//! - In-memory (development, tests)
//! - SQLite (persistent, single instance)
//!
//! The backend is chosen once from configuration; handlers only see
//! `Arc<dyn RecordStore>`.

mod backend;
mod memory;
mod sqlite;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::RecordsSettings;

pub use backend::{RecordError, RecordResult, RecordStore};
pub use memory::InMemoryRecordStore;
pub use sqlite::SqliteRecordStore;

/// Which record store to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordsBackendType {
    #[default]
    Sqlite,
    Memory,
}

impl RecordsBackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordsBackendType::Sqlite => "sqlite",
            RecordsBackendType::Memory => "memory",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Some(RecordsBackendType::Sqlite),
            "memory" | "mock" => Some(RecordsBackendType::Memory),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordsBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Build the configured record store.
pub fn create_record_store(settings: &RecordsSettings) -> RecordResult<Arc<dyn RecordStore>> {
    match settings.backend {
        RecordsBackendType::Memory => {
            info!("Record store: in-memory (records are lost on restart)");
            Ok(Arc::new(InMemoryRecordStore::new()))
        }
        RecordsBackendType::Sqlite => Ok(Arc::new(SqliteRecordStore::open(&settings.database_path)?)),
    }
}
