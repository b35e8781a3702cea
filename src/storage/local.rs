//! Local filesystem blob store.
//!
//! Blobs are written under `{root}/prescriptions/{clean_name}/`. Read URLs
//! are HMAC-signed links served by the HTTP layer's `/files` route.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::backend::{
    new_blob_name, patient_prefix, validate_blob_name, BlobStore, StorageResult, StoredBlob,
    BLOB_PREFIX, DEFAULT_URL_TTL,
};
use super::signing::UrlSigner;
use crate::utils::sanitize_filename;

/// Blob store writing into a directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    bucket: String,
    signer: UrlSigner,
    url_ttl: Duration,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, signer: UrlSigner) -> Self {
        let root = root.into();
        Self {
            bucket: root.display().to_string(),
            root,
            signer,
            url_ttl: DEFAULT_URL_TTL,
        }
    }

    pub fn with_url_ttl(mut self, ttl: Duration) -> Self {
        self.url_ttl = ttl;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, blob_name: &str) -> StorageResult<PathBuf> {
        validate_blob_name(blob_name)?;
        Ok(blob_name
            .split('/')
            .fold(self.root.clone(), |path, segment| path.join(segment)))
    }

    async fn file_names(dir: &Path) -> StorageResult<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                names.push((name.to_string(), entry.file_type().await?.is_dir()));
            }
        }
        Ok(names
            .into_iter()
            .map(|(name, is_dir)| if is_dir { format!("{}/", name) } else { name })
            .collect())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn bucket(&self) -> &str {
        &self.bucket
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
        let path = self.path_for(&blob_name)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &image).await?;
        debug!("stored {} bytes at {}", image.len(), path.display());

        Ok(StoredBlob {
            signed_url: self.signer.sign(&blob_name, self.url_ttl),
            blob_name,
            patient_name: patient_name.to_string(),
            clean_name,
            bucket: self.bucket.clone(),
        })
    }

    async fn signed_url(&self, blob_name: &str) -> StorageResult<String> {
        validate_blob_name(blob_name)?;
        Ok(self.signer.sign(blob_name, self.url_ttl))
    }

    async fn list_for_patient(&self, patient_name: &str) -> StorageResult<Vec<String>> {
        let prefix = patient_prefix(&sanitize_filename(patient_name));
        let dir = self.path_for(prefix.trim_end_matches('/'))?;
        let mut blobs: Vec<String> = Self::file_names(&dir)
            .await?
            .into_iter()
            .filter(|name| !name.ends_with('/'))
            .map(|name| format!("{}{}", prefix, name))
            .collect();
        blobs.sort();
        Ok(blobs)
    }

    async fn list_patients(&self) -> StorageResult<Vec<String>> {
        let mut keys: Vec<String> = Self::file_names(&self.root.join(BLOB_PREFIX))
            .await?
            .into_iter()
            .filter_map(|name| name.strip_suffix('/').map(str::to_string))
            .collect();
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    async fn fetch(&self, blob_name: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.path_for(blob_name)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
