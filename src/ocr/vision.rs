//! Google Cloud Vision OCR backend.
//!
//! Sends the image inline (base64) to the `images:annotate` endpoint with a
//! `TEXT_DETECTION` feature and an API key. The first text annotation holds
//! the full detected text.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::backend::{OcrBackend, OcrBackendType, OcrError, OcrResult};

/// Default REST endpoint.
pub const VISION_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Google Cloud Vision backend.
pub struct VisionBackend {
    api_key: Option<String>,
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<ImageRequest>,
}

#[derive(Debug, Serialize)]
struct ImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    message: String,
}

impl VisionBackend {
    /// Create a backend. Without an API key the backend reports itself
    /// unavailable and every call fails.
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            endpoint: VISION_ENDPOINT.to_string(),
            client,
        }
    }

    /// Point the backend at a different endpoint (proxies, emulators).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn build_request(image: &[u8]) -> AnnotateRequest {
        AnnotateRequest {
            requests: vec![ImageRequest {
                image: ImageContent {
                    content: base64::engine::general_purpose::STANDARD.encode(image),
                },
                features: vec![Feature {
                    kind: "TEXT_DETECTION",
                }],
            }],
        }
    }

    fn text_from_response(response: AnnotateResponse) -> Result<String, OcrError> {
        let Some(first) = response.responses.into_iter().next() else {
            return Ok(String::new());
        };

        if let Some(error) = first.error.filter(|e| !e.message.is_empty()) {
            return Err(OcrError::Api(format!("Vision API Error: {}", error.message)));
        }

        Ok(first
            .text_annotations
            .into_iter()
            .next()
            .map(|a| a.description)
            .unwrap_or_default())
    }
}

#[async_trait]
impl OcrBackend for VisionBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Vision
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn availability_hint(&self) -> String {
        if self.api_key.is_none() {
            "GOOGLE_VISION_API_KEY not set. Create a key in the Google Cloud console".to_string()
        } else {
            "Google Cloud Vision is available".to_string()
        }
    }

    async fn recognize(&self, image: &[u8]) -> Result<OcrResult, OcrError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            OcrError::BackendNotAvailable("GOOGLE_VISION_API_KEY not set".to_string())
        })?;

        let start = Instant::now();
        let url = format!("{}?key={}", self.endpoint, urlencoding::encode(api_key));

        let response = self
            .client
            .post(&url)
            .json(&Self::build_request(image))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Google wraps request-level errors in {"error": {"message": ...}}
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .unwrap_or(body);
            return Err(OcrError::Api(format!(
                "Vision API Error: {} ({})",
                message, status
            )));
        }

        let parsed: AnnotateResponse = response.json().await?;
        let text = Self::text_from_response(parsed)?;

        let elapsed = start.elapsed();
        debug!("vision recognized {} chars in {:?}", text.len(), elapsed);

        Ok(OcrResult {
            text,
            backend: OcrBackendType::Vision,
            processing_time_ms: elapsed.as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AnnotateResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_request_shape() {
        let request = VisionBackend::build_request(b"abc");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["requests"][0]["image"]["content"], "YWJj");
        assert_eq!(json["requests"][0]["features"][0]["type"], "TEXT_DETECTION");
    }

    #[test]
    fn test_first_annotation_is_full_text() {
        let response = parse(
            r#"{"responses":[{"textAnnotations":[
                {"description":"Patient Name: Jane Doe\nAge: 30"},
                {"description":"Patient"}
            ]}]}"#,
        );
        let text = VisionBackend::text_from_response(response).unwrap();
        assert_eq!(text, "Patient Name: Jane Doe\nAge: 30");
    }

    #[test]
    fn test_no_annotations_is_empty_text() {
        let text = VisionBackend::text_from_response(parse(r#"{"responses":[{}]}"#)).unwrap();
        assert_eq!(text, "");
        let text = VisionBackend::text_from_response(parse("{}")).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn test_error_message_surfaces() {
        let response = parse(r#"{"responses":[{"error":{"code":3,"message":"Bad image data."}}]}"#);
        let err = VisionBackend::text_from_response(response).unwrap_err();
        assert!(matches!(err, OcrError::Api(_)));
        assert_eq!(err.to_string(), "Vision API Error: Bad image data.");
    }

    #[tokio::test]
    async fn test_missing_key_is_unavailable() {
        let backend = VisionBackend::new(Some("  ".to_string()));
        assert!(!backend.is_available());
        let err = backend.recognize(b"img").await.unwrap_err();
        assert!(matches!(err, OcrError::BackendNotAvailable(_)));
    }
}
