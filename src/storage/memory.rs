//! In-memory blob store for development and tests.
//!
//! Blobs live for the lifetime of the process. URLs point at a fake host and
//! are not fetchable over HTTP; use [`BlobStore::fetch`] instead.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::backend::{
    new_blob_name, patient_key, patient_prefix, BlobStore, StorageResult, StoredBlob,
};
use crate::utils::sanitize_filename;

pub const MOCK_BUCKET: &str = "mock-bucket";
pub const MOCK_URL_BASE: &str = "https://mock-storage.local";

/// Blob store backed by a shared map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    fn url_for(blob_name: &str) -> String {
        format!("{}/{}", MOCK_URL_BASE, blob_name)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn bucket(&self) -> &str {
        MOCK_BUCKET
    }

    async fn upload(
        &self,
        image: Vec<u8>,
        patient_name: &str,
        extension: &str,
        _content_type: &str,
    ) -> StorageResult<StoredBlob> {
        let clean_name = sanitize_filename(patient_name);
        let blob_name = new_blob_name(&clean_name, extension);

        debug!("memory store: {} ({} bytes)", blob_name, image.len());
        self.blobs.write().await.insert(blob_name.clone(), image);

        Ok(StoredBlob {
            signed_url: Self::url_for(&blob_name),
            blob_name,
            patient_name: patient_name.to_string(),
            clean_name,
            bucket: MOCK_BUCKET.to_string(),
        })
    }

    async fn signed_url(&self, blob_name: &str) -> StorageResult<String> {
        Ok(Self::url_for(blob_name))
    }

    async fn list_for_patient(&self, patient_name: &str) -> StorageResult<Vec<String>> {
        let prefix = patient_prefix(&sanitize_filename(patient_name));
        let blobs = self.blobs.read().await;
        Ok(blobs
            .keys()
            .filter(|name| name.starts_with(&prefix))
            .cloned()
            .collect())
    }

    async fn list_patients(&self) -> StorageResult<Vec<String>> {
        let blobs = self.blobs.read().await;
        let mut keys: Vec<String> = blobs
            .keys()
            .filter_map(|name| patient_key(name))
            .map(str::to_string)
            .collect();
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    async fn fetch(&self, blob_name: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.blobs.read().await.get(blob_name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_and_fetch() {
        let store = MemoryBlobStore::new();
        let stored = store
            .upload(b"img".to_vec(), "Jane Doe", "jpg", "image/jpeg")
            .await
            .unwrap();

        assert_eq!(stored.clean_name, "jane_doe");
        assert_eq!(stored.patient_name, "Jane Doe");
        assert_eq!(stored.bucket, MOCK_BUCKET);
        assert!(stored.blob_name.starts_with("prescriptions/jane_doe/"));
        assert_eq!(
            stored.signed_url,
            format!("https://mock-storage.local/{}", stored.blob_name)
        );
        assert_eq!(store.fetch(&stored.blob_name).await.unwrap(), Some(b"img".to_vec()));
        assert_eq!(store.fetch("prescriptions/nobody/x.jpg").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_for_patient_sanitizes() {
        let store = MemoryBlobStore::new();
        store.upload(vec![1], "Jane Doe", "jpg", "image/jpeg").await.unwrap();
        store.upload(vec![2], "Jane Doe", "png", "image/png").await.unwrap();
        store.upload(vec![3], "Jane Doer", "png", "image/png").await.unwrap();

        let blobs = store.list_for_patient("JANE DOE").await.unwrap();
        assert_eq!(blobs.len(), 2);
        assert!(blobs.iter().all(|b| b.starts_with("prescriptions/jane_doe/")));
    }

    #[tokio::test]
    async fn test_list_patients_sorted_unique() {
        let store = MemoryBlobStore::new();
        for name in ["Zed", "alice", "Zed", "Bob"] {
            store.upload(vec![0], name, "jpg", "image/jpeg").await.unwrap();
        }
        assert_eq!(store.len().await, 4);
        assert_eq!(
            store.list_patients().await.unwrap(),
            vec!["alice".to_string(), "bob".to_string(), "zed".to_string()]
        );
    }

    #[tokio::test]
    async fn test_empty_name_goes_to_unknown() {
        let store = MemoryBlobStore::new();
        let stored = store.upload(vec![0], "!!!", "jpg", "image/jpeg").await.unwrap();
        assert_eq!(stored.clean_name, "unknown");
    }
}
