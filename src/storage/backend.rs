//! Pluggable blob storage for prescription images.
//!
//! Allows swapping between in-memory (development, tests), local disk, and
//! Google Cloud Storage.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors from blob storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Storage service error ({status}): {message}")]
    Service { status: u16, message: String },
    #[error("Invalid blob name: {0}")]
    InvalidBlobName(String),
    #[error("Storage misconfigured: {0}")]
    Config(String),
}

/// Top-level prefix for all prescription blobs.
pub const BLOB_PREFIX: &str = "prescriptions";

/// Lifetime of generated read URLs.
pub const DEFAULT_URL_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Fresh blob name `prescriptions/{clean_name}/{id8}.{ext}`.
pub fn new_blob_name(clean_name: &str, extension: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}/{}/{}.{}", BLOB_PREFIX, clean_name, &id[..8], extension)
}

/// Listing prefix for one patient's folder.
pub fn patient_prefix(clean_name: &str) -> String {
    format!("{}/{}/", BLOB_PREFIX, clean_name)
}

/// Patient folder key of a blob name, if it sits in a patient folder.
pub fn patient_key(blob_name: &str) -> Option<&str> {
    let rest = blob_name.strip_prefix(BLOB_PREFIX)?.strip_prefix('/')?;
    let (key, file) = rest.split_once('/')?;
    (!key.is_empty() && !file.is_empty()).then_some(key)
}

/// Reject names that could escape the storage root.
pub fn validate_blob_name(blob_name: &str) -> StorageResult<()> {
    let bad = blob_name.is_empty()
        || blob_name.starts_with('/')
        || blob_name.contains('\\')
        || blob_name
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if bad {
        return Err(StorageError::InvalidBlobName(blob_name.to_string()));
    }
    Ok(())
}

/// Where an uploaded image ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBlob {
    /// Full object path, `prescriptions/{clean_name}/{id8}.{ext}`.
    pub blob_name: String,
    /// Display name as extracted.
    pub patient_name: String,
    /// Sanitized name used as the folder key.
    pub clean_name: String,
    /// Time-limited read URL.
    pub signed_url: String,
    pub bucket: String,
}

/// Storage backend for prescription images.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Bucket (or root) identifier reported back to clients.
    fn bucket(&self) -> &str;

    /// Store an image under the patient's folder and return its location.
    async fn upload(
        &self,
        image: Vec<u8>,
        patient_name: &str,
        extension: &str,
        content_type: &str,
    ) -> StorageResult<StoredBlob>;

    /// Produce a read URL for an existing blob.
    async fn signed_url(&self, blob_name: &str) -> StorageResult<String>;

    /// Blob names stored for a patient. The name is sanitized first.
    async fn list_for_patient(&self, patient_name: &str) -> StorageResult<Vec<String>>;

    /// Distinct patient folder keys, sorted ascending.
    async fn list_patients(&self) -> StorageResult<Vec<String>>;

    /// Read a blob's bytes, `None` if it does not exist.
    async fn fetch(&self, blob_name: &str) -> StorageResult<Option<Vec<u8>>>;
}
