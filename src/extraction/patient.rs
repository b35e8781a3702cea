//! Patient name extraction from prescription OCR text.
//!
//! Prescriptions label the patient in a handful of ways ("Patient Name:",
//! "Pt. Name -", "Name:", ...). The labels are tried from most to least
//! specific; the first one that matches decides both the name and how much
//! we trust it.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::normalize::normalize_name;

/// Message returned when OCR produced no text at all.
pub const MSG_NO_TEXT: &str = "No text detected in image";
/// Message returned when a patient name was found.
pub const MSG_SUCCESS: &str = "Patient name extracted successfully";
/// Message returned when text was present but no label matched.
pub const MSG_NO_MATCH: &str = "Could not find patient name pattern";

/// Rules before this index are label-specific and yield high confidence.
const HIGH_CONFIDENCE_RULES: usize = 2;

/// Confidence tier for an extracted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "high" => Some(Confidence::High),
            "medium" => Some(Confidence::Medium),
            "low" => Some(Confidence::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of running name extraction over one image's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Cleaned patient name, if any label matched.
    pub patient_name: Option<String>,
    /// Unmodified OCR output.
    pub full_text: String,
    pub confidence: Confidence,
    pub message: String,
}

/// One entry of the extraction policy.
struct PatternRule {
    pattern: Regex,
    confidence: Confidence,
}

/// Label patterns, most specific first. Each captures the value after a
/// `:` or `-` separator up to a line break, end of line, or the next field.
const NAME_PATTERNS: [&str; 5] = [
    r"(?im)Patient\s*Name\s*[:-]\s*([A-Za-z0-9\s.]+?)(?:\n|$|Date|Age|DOB|Gender|Address|Phone)",
    r"(?im)Pt\.?\s*Name\s*[:-]\s*([A-Za-z0-9\s.]+?)(?:\n|$|Date|Age|DOB|Gender|Address|Phone)",
    r"(?im)Patient\s*[:-]\s*([A-Za-z0-9\s.]+?)(?:\n|$|Date|Age|DOB|Gender|Address|Phone)",
    r"(?im)Name\s*[:-]\s*([A-Za-z0-9\s.]+?)(?:\n|$|Date|Age|DOB|Gender|Address|Phone)",
    r"(?im)Name\s+of\s+Patient\s*[:-]\s*([A-Za-z0-9\s.]+?)(?:\n|$|Date|Age|DOB)",
];

static NAME_RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    NAME_PATTERNS
        .iter()
        .enumerate()
        .map(|(index, pattern)| PatternRule {
            pattern: Regex::new(pattern).unwrap(),
            confidence: if index < HIGH_CONFIDENCE_RULES {
                Confidence::High
            } else {
                Confidence::Medium
            },
        })
        .collect()
});

/// Extract the patient name from raw OCR text.
///
/// Never fails: an unmatched text is reported as `patient_name: None` with
/// low confidence, and `full_text` always echoes the input. A label whose
/// value normalizes to nothing (digits or dots only) counts as unmatched.
pub fn extract_patient_name(full_text: &str) -> ExtractionResult {
    if full_text.is_empty() {
        return ExtractionResult {
            patient_name: None,
            full_text: String::new(),
            confidence: Confidence::Low,
            message: MSG_NO_TEXT.to_string(),
        };
    }

    let matched = NAME_RULES.iter().find_map(|rule| {
        rule.pattern
            .captures(full_text)
            .and_then(|caps| caps.get(1))
            .map(|m| (normalize_name(m.as_str()), rule.confidence))
    });

    match matched.filter(|(name, _)| !name.is_empty()) {
        Some((name, confidence)) => ExtractionResult {
            patient_name: Some(name),
            full_text: full_text.to_string(),
            confidence,
            message: MSG_SUCCESS.to_string(),
        },
        None => ExtractionResult {
            patient_name: None,
            full_text: full_text.to_string(),
            confidence: Confidence::Low,
            message: MSG_NO_MATCH.to_string(),
        },
    }
}
