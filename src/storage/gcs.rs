//! Google Cloud Storage blob store over the JSON API.
//!
//! Authenticates with an OAuth bearer token (e.g. from
//! `gcloud auth print-access-token` or the metadata server). Read URLs are
//! public object URLs; the bucket must grant read access to whoever follows
//! them.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};

use super::backend::{
    new_blob_name, patient_prefix, validate_blob_name, BlobStore, StorageError, StorageResult,
    StoredBlob, BLOB_PREFIX,
};
use crate::utils::sanitize_filename;

/// Default API host.
pub const GCS_API_BASE: &str = "https://storage.googleapis.com";

/// Blob store backed by a GCS bucket.
pub struct GcsBlobStore {
    bucket: String,
    access_token: Option<String>,
    api_base: String,
    client: reqwest::Client,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectList {
    #[serde(default)]
    items: Vec<ObjectItem>,
    #[serde(default)]
    prefixes: Vec<String>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectItem {
    name: String,
}

impl GcsBlobStore {
    pub fn new(bucket: impl Into<String>, access_token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();
        Self {
            bucket: bucket.into(),
            access_token: access_token.filter(|t| !t.trim().is_empty()),
            api_base: GCS_API_BASE.to_string(),
            client,
        }
    }

    /// Use a different API host (e.g. a local GCS emulator).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn public_url(&self, blob_name: &str) -> String {
        format!("{}/{}/{}", GCS_API_BASE, self.bucket, blob_name)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: reqwest::Response) -> StorageResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or(body);
        Err(StorageError::Service {
            status: status.as_u16(),
            message,
        })
    }

    /// Page through an object listing.
    async fn list(&self, prefix: &str, delimiter: Option<&str>) -> StorageResult<ObjectList> {
        let url = format!("{}/storage/v1/b/{}/o", self.api_base, self.bucket);
        let mut all = ObjectList::default();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("prefix", prefix.to_string())];
            if let Some(d) = delimiter {
                query.push(("delimiter", d.to_string()));
            }
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let response = self
                .authorized(self.client.get(&url).query(&query))
                .send()
                .await?;
            let page: ObjectList = Self::check(response).await?.json().await?;

            all.items.extend(page.items);
            all.prefixes.extend(page.prefixes);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(all)
    }
}

#[async_trait]
impl BlobStore for GcsBlobStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload(
        &self,
        image: Vec<u8>,
        patient_name: &str,
        extension: &str,
        content_type: &str,
    ) -> StorageResult<StoredBlob> {
        let clean_name = sanitize_filename(patient_name);
        let blob_name = new_blob_name(&clean_name, extension);

        let url = format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.api_base,
            self.bucket,
            urlencoding::encode(&blob_name)
        );
        let size = image.len();
        let response = self
            .authorized(self.client.post(&url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(image)
            .send()
            .await?;
        Self::check(response).await?;
        info!("uploaded gs://{}/{} ({} bytes)", self.bucket, blob_name, size);

        Ok(StoredBlob {
            signed_url: self.public_url(&blob_name),
            blob_name,
            patient_name: patient_name.to_string(),
            clean_name,
            bucket: self.bucket.clone(),
        })
    }

    async fn signed_url(&self, blob_name: &str) -> StorageResult<String> {
        validate_blob_name(blob_name)?;
        Ok(self.public_url(blob_name))
    }

    async fn list_for_patient(&self, patient_name: &str) -> StorageResult<Vec<String>> {
        let prefix = patient_prefix(&sanitize_filename(patient_name));
        let listing = self.list(&prefix, None).await?;
        debug!("{} blobs under {}", listing.items.len(), prefix);
        Ok(listing.items.into_iter().map(|item| item.name).collect())
    }

    async fn list_patients(&self) -> StorageResult<Vec<String>> {
        let root = format!("{}/", BLOB_PREFIX);
        let listing = self.list(&root, Some("/")).await?;
        Ok(folder_keys(&root, listing.prefixes))
    }

    async fn fetch(&self, blob_name: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_blob_name(blob_name)?;
        let url = format!(
            "{}/storage/v1/b/{}/o/{}?alt=media",
            self.api_base,
            self.bucket,
            urlencoding::encode(blob_name)
        );
        let response = self.authorized(self.client.get(&url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let bytes = Self::check(response).await?.bytes().await?;
        Ok(Some(bytes.to_vec()))
    }
}

/// Turn `prescriptions/{key}/` listing prefixes into sorted, unique keys.
fn folder_keys(root: &str, prefixes: Vec<String>) -> Vec<String> {
    let mut keys: Vec<String> = prefixes
        .iter()
        .filter_map(|p| p.strip_prefix(root))
        .map(|p| p.trim_end_matches('/'))
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();
    keys.sort();
    keys.dedup();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url() {
        let store = GcsBlobStore::new("rx-images", None);
        assert_eq!(
            store.public_url("prescriptions/jane/ab12cd34.jpg"),
            "https://storage.googleapis.com/rx-images/prescriptions/jane/ab12cd34.jpg"
        );
        assert_eq!(store.bucket(), "rx-images");
    }

    #[test]
    fn test_blank_token_dropped() {
        let store = GcsBlobStore::new("b", Some(" ".to_string()));
        assert!(store.access_token.is_none());
    }

    #[test]
    fn test_listing_parses() {
        let listing: ObjectList = serde_json::from_str(
            r#"{"items":[{"name":"prescriptions/jane/a.jpg"}],
                "prefixes":["prescriptions/zoe/","prescriptions/adam/"],
                "nextPageToken":"t1"}"#,
        )
        .unwrap();
        assert_eq!(listing.items[0].name, "prescriptions/jane/a.jpg");
        assert_eq!(listing.next_page_token.as_deref(), Some("t1"));
        assert_eq!(
            folder_keys("prescriptions/", listing.prefixes),
            vec!["adam".to_string(), "zoe".to_string()]
        );
    }

    #[test]
    fn test_empty_listing_parses() {
        let listing: ObjectList = serde_json::from_str("{}").unwrap();
        assert!(listing.items.is_empty());
        assert!(listing.next_page_token.is_none());
    }
}
