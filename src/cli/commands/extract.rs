//! Run OCR and extraction on a local image.

use std::path::Path;

use anyhow::Context;
use console::style;
use serde::Serialize;

use crate::config::Settings;
use crate::extraction::{extract_details, extract_patient_name, ExtractionResult, PrescriptionDetails};
use crate::ocr::create_backend;

#[derive(Debug, Serialize)]
struct ExtractOutput {
    #[serde(flatten)]
    result: ExtractionResult,
    details: PrescriptionDetails,
    backend: String,
    processing_time_ms: u64,
}

/// Print the extraction result (or the raw OCR text) for an image.
pub async fn cmd_extract(settings: &Settings, image: &Path, raw_text: bool) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("Failed to read {}", image.display()))?;
    if !infer::get(&bytes).is_some_and(|kind| kind.mime_type().starts_with("image/")) {
        eprintln!(
            "{} {} does not look like an image",
            style("!").yellow(),
            image.display()
        );
    }

    let backend = create_backend(&settings.ocr);
    let ocr = backend.recognize(&bytes).await?;

    if raw_text {
        println!("{}", ocr.text);
        return Ok(());
    }

    let result = extract_patient_name(&ocr.text);
    let output = ExtractOutput {
        details: extract_details(&result.full_text),
        result,
        backend: ocr.backend.to_string(),
        processing_time_ms: ocr.processing_time_ms,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
