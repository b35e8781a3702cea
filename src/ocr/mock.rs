//! Mock OCR backend returning canned text.

use async_trait::async_trait;

use super::backend::{OcrBackend, OcrBackendType, OcrError, OcrResult};

/// Text returned when no override is configured.
pub const DEFAULT_MOCK_TEXT: &str =
    "Patient Name: Mock Patient\nDate: 2024-01-01\nAge: 30\nSex: M\nWeight: 70kg";

/// Backend that ignores the image and returns fixed text.
pub struct MockBackend {
    text: String,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_text(DEFAULT_MOCK_TEXT)
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcrBackend for MockBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Mock
    }

    fn is_available(&self) -> bool {
        true
    }

    fn availability_hint(&self) -> String {
        "Mock OCR is always available".to_string()
    }

    async fn recognize(&self, _image: &[u8]) -> Result<OcrResult, OcrError> {
        Ok(OcrResult {
            text: self.text.clone(),
            backend: OcrBackendType::Mock,
            processing_time_ms: 0,
        })
    }
}
