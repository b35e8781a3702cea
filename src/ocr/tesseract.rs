//! Tesseract OCR backend implementation.
//!
//! Shells out to the `tesseract` binary. The image is written to a temporary
//! file and the process runs on tokio's blocking pool.

use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::debug;

use super::backend::{OcrBackend, OcrBackendType, OcrError, OcrResult};

/// Tesseract OCR backend.
pub struct TesseractBackend {
    language: String,
}

impl TesseractBackend {
    /// Create a backend reading English text.
    pub fn new() -> Self {
        Self::with_language("eng")
    }

    /// Create a backend for a Tesseract language code (e.g. `eng`, `hin`).
    pub fn with_language(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    fn run_tesseract(image_path: &Path, language: &str) -> Result<String, OcrError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", language])
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(OcrError::OcrFailed(format!("tesseract failed: {}", stderr.trim())))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                OcrError::BackendNotAvailable("tesseract not found (install tesseract-ocr)".into()),
            ),
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcrBackend for TesseractBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Tesseract
    }

    fn is_available(&self) -> bool {
        which::which("tesseract").is_ok()
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            format!("Tesseract is available (language: {})", self.language)
        } else {
            "Tesseract not installed. Install with: apt install tesseract-ocr".to_string()
        }
    }

    async fn recognize(&self, image: &[u8]) -> Result<OcrResult, OcrError> {
        let start = Instant::now();

        let mut file = NamedTempFile::new()?;
        file.write_all(image)?;
        file.flush()?;

        let language = self.language.clone();
        let text = tokio::task::spawn_blocking(move || {
            // The temp file must outlive the tesseract process.
            let result = Self::run_tesseract(file.path(), &language);
            drop(file);
            result
        })
        .await
        .map_err(|e| OcrError::OcrFailed(format!("tesseract task failed: {}", e)))??;

        let elapsed = start.elapsed();
        debug!(
            "tesseract recognized {} chars in {:?}",
            text.len(),
            elapsed
        );

        Ok(OcrResult {
            text,
            backend: OcrBackendType::Tesseract,
            processing_time_ms: elapsed.as_millis() as u64,
        })
    }
}
