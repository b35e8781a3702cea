//! Blob storage for prescription images.
//!
//! Images are grouped by sanitized patient name under `prescriptions/`.
//! Backends:
//! - In-memory (development, tests)
//! - Local directory with HMAC-signed `/files` links
//! - Google Cloud Storage

mod backend;
mod gcs;
mod local;
mod memory;
mod signing;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::StorageSettings;

pub use backend::{
    new_blob_name, patient_key, patient_prefix, validate_blob_name, BlobStore, StorageError,
    StorageResult, StoredBlob, BLOB_PREFIX, DEFAULT_URL_TTL,
};
pub use gcs::{GcsBlobStore, GCS_API_BASE};
pub use local::LocalBlobStore;
pub use memory::{MemoryBlobStore, MOCK_BUCKET, MOCK_URL_BASE};
pub use signing::{SignatureError, UrlSigner};

/// Which blob store to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendType {
    #[default]
    Local,
    Memory,
    Gcs,
}

impl StorageBackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackendType::Local => "local",
            StorageBackendType::Memory => "memory",
            StorageBackendType::Gcs => "gcs",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" | "disk" => Some(StorageBackendType::Local),
            "memory" | "mock" => Some(StorageBackendType::Memory),
            "gcs" | "google" => Some(StorageBackendType::Gcs),
            _ => None,
        }
    }
}

impl std::fmt::Display for StorageBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Build the configured blob store. `signer` is used by the local backend.
pub fn create_blob_store(
    settings: &StorageSettings,
    signer: UrlSigner,
) -> StorageResult<Arc<dyn BlobStore>> {
    let ttl = Duration::from_secs(settings.url_ttl_secs);
    let store: Arc<dyn BlobStore> = match settings.backend {
        StorageBackendType::Memory => Arc::new(MemoryBlobStore::new()),
        StorageBackendType::Local => {
            Arc::new(LocalBlobStore::new(settings.root.clone(), signer).with_url_ttl(ttl))
        }
        StorageBackendType::Gcs => {
            let bucket = settings
                .bucket
                .clone()
                .filter(|b| !b.trim().is_empty())
                .ok_or_else(|| StorageError::Config("GCS backend requires a bucket name".into()))?;
            let mut store = GcsBlobStore::new(bucket, settings.access_token.clone());
            if let Some(base) = &settings.api_base {
                store = store.with_api_base(base);
            }
            Arc::new(store)
        }
    };
    info!(
        "Blob storage: {} (bucket: {})",
        settings.backend,
        store.bucket()
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_type_names() {
        assert_eq!(StorageBackendType::from_str("MOCK"), Some(StorageBackendType::Memory));
        assert_eq!(StorageBackendType::from_str("gcs"), Some(StorageBackendType::Gcs));
        assert_eq!(StorageBackendType::from_str("s3"), None);
        assert_eq!(StorageBackendType::Local.to_string(), "local");
    }

    #[test]
    fn test_gcs_requires_bucket() {
        let settings = StorageSettings {
            backend: StorageBackendType::Gcs,
            bucket: None,
            ..StorageSettings::default()
        };
        let result = create_blob_store(&settings, UrlSigner::new("k", "http://x"));
        assert!(matches!(result, Err(StorageError::Config(_))));
    }

    #[test]
    fn test_memory_store_selected() {
        let settings = StorageSettings {
            backend: StorageBackendType::Memory,
            ..StorageSettings::default()
        };
        let store = create_blob_store(&settings, UrlSigner::new("k", "http://x")).unwrap();
        assert_eq!(store.bucket(), MOCK_BUCKET);
    }
}
