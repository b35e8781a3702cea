//! OCR backend abstraction.
//!
//! Backends turn raw image bytes into text. Which one runs is decided once
//! from configuration by [`create_backend`](super::create_backend).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    /// The remote service answered but reported an error.
    #[error("{0}")]
    Api(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result of OCR processing.
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Extracted text content. Empty when the image has no readable text.
    pub text: String,
    /// Which backend produced this result.
    pub backend: OcrBackendType,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Available OCR backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackendType {
    /// Tesseract OCR via command-line.
    #[default]
    Tesseract,
    /// Google Cloud Vision text detection.
    Vision,
    /// Canned text, for development and tests.
    Mock,
}

impl OcrBackendType {
    pub const ALL: [OcrBackendType; 3] = [
        OcrBackendType::Tesseract,
        OcrBackendType::Vision,
        OcrBackendType::Mock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OcrBackendType::Tesseract => "tesseract",
            OcrBackendType::Vision => "vision",
            OcrBackendType::Mock => "mock",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "tesseract" => Some(OcrBackendType::Tesseract),
            "vision" | "google" | "google-vision" => Some(OcrBackendType::Vision),
            "mock" => Some(OcrBackendType::Mock),
            _ => None,
        }
    }
}

impl std::fmt::Display for OcrBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trait for OCR backends.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Get the backend type.
    fn backend_type(&self) -> OcrBackendType;

    /// Check if this backend can run (binary installed, credentials present).
    fn is_available(&self) -> bool;

    /// Describe what is needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Run OCR on an encoded image (JPEG, PNG, WebP).
    async fn recognize(&self, image: &[u8]) -> Result<OcrResult, OcrError>;
}
