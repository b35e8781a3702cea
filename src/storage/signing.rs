//! HMAC-signed, time-limited URLs for locally stored blobs.

use std::time::Duration;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Reasons a signed URL is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("URL has expired")]
    Expired,
    #[error("Invalid signature")]
    Invalid,
}

/// Signs and verifies `/files/{blob}` links.
#[derive(Clone)]
pub struct UrlSigner {
    secret: Vec<u8>,
    base_url: String,
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl UrlSigner {
    pub fn new(secret: impl AsRef<[u8]>, base_url: impl Into<String>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn mac(&self, blob_name: &str, expires: i64) -> HmacSha256 {
        // new_from_slice accepts keys of any length for HMAC
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .unwrap_or_else(|_| unreachable!("HMAC accepts any key length"));
        mac.update(blob_name.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        mac
    }

    /// Hex signature for a blob and expiry (unix seconds).
    pub fn signature(&self, blob_name: &str, expires: i64) -> String {
        hex::encode(self.mac(blob_name, expires).finalize().into_bytes())
    }

    /// Build a URL valid for `ttl` from now.
    pub fn sign(&self, blob_name: &str, ttl: Duration) -> String {
        let expires = chrono::Utc::now().timestamp() + ttl.as_secs() as i64;
        self.sign_until(blob_name, expires)
    }

    /// Build a URL valid until `expires` (unix seconds).
    pub fn sign_until(&self, blob_name: &str, expires: i64) -> String {
        let path = blob_name
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/files/{}?expires={}&signature={}",
            self.base_url,
            path,
            expires,
            self.signature(blob_name, expires)
        )
    }

    /// Check a signature against the current time.
    pub fn verify(&self, blob_name: &str, expires: i64, signature: &str) -> Result<(), SignatureError> {
        self.verify_at(blob_name, expires, signature, chrono::Utc::now().timestamp())
    }

    pub fn verify_at(
        &self,
        blob_name: &str,
        expires: i64,
        signature: &str,
        now: i64,
    ) -> Result<(), SignatureError> {
        let provided = hex::decode(signature).map_err(|_| SignatureError::Invalid)?;
        self.mac(blob_name, expires)
            .verify_slice(&provided)
            .map_err(|_| SignatureError::Invalid)?;
        if now > expires {
            return Err(SignatureError::Expired);
        }
        Ok(())
    }
}
