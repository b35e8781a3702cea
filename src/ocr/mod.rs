//! OCR gateway.
//!
//! Converts prescription photographs into raw text. Backends:
//!
//! - **Tesseract**: local `tesseract` binary (default)
//! - **Vision**: Google Cloud Vision `TEXT_DETECTION` over REST
//! - **Mock**: canned text for development and tests

mod backend;
mod mock;
mod tesseract;
mod vision;

use std::sync::Arc;

use tracing::warn;

use crate::config::OcrSettings;

pub use backend::{OcrBackend, OcrBackendType, OcrError, OcrResult};
pub use mock::{MockBackend, DEFAULT_MOCK_TEXT};
pub use tesseract::TesseractBackend;
pub use vision::{VisionBackend, VISION_ENDPOINT};

/// Build a single backend of the given type from settings.
pub fn build_backend(backend_type: OcrBackendType, settings: &OcrSettings) -> Arc<dyn OcrBackend> {
    match backend_type {
        OcrBackendType::Tesseract => Arc::new(TesseractBackend::with_language(&settings.language)),
        OcrBackendType::Vision => {
            let mut backend = VisionBackend::new(settings.vision_api_key.clone());
            if let Some(endpoint) = &settings.vision_endpoint {
                backend = backend.with_endpoint(endpoint);
            }
            Arc::new(backend)
        }
        OcrBackendType::Mock => match &settings.mock_text {
            Some(text) => Arc::new(MockBackend::with_text(text)),
            None => Arc::new(MockBackend::new()),
        },
    }
}

/// Build the configured backend.
///
/// An unavailable backend is still returned so that requests fail with a
/// descriptive error rather than the service refusing to start.
pub fn create_backend(settings: &OcrSettings) -> Arc<dyn OcrBackend> {
    let backend = build_backend(settings.backend, settings);
    if !backend.is_available() {
        warn!(
            "OCR backend '{}' is not available: {}",
            backend.backend_type(),
            backend.availability_hint()
        );
    }
    backend
}

/// Build one instance of every backend, for availability reporting.
pub fn all_backends(settings: &OcrSettings) -> Vec<Arc<dyn OcrBackend>> {
    OcrBackendType::ALL
        .iter()
        .map(|t| build_backend(*t, settings))
        .collect()
}
