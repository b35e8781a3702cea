//! Secondary prescription fields: date, age, sex and weight.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Fields read off a prescription alongside the patient name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionDetails {
    pub date: Option<String>,
    pub age: Option<u32>,
    pub sex: Option<String>,
    pub weight: Option<String>,
}

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)\bDate\s*[:-][ \t]*([^\n]+?)[ \t]*(?:$|Age|Sex|Gender|Weight|Wt\b)").unwrap()
});

static AGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)\bAge\s*[:-]?\s*(\d{1,3})\b").unwrap());

static SEX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)\b(?:Sex|Gender)\s*[:-]\s*([A-Za-z]+)").unwrap());

static WEIGHT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)\b(?:Weight|Wt\.?)\s*[:-]\s*(\d+(?:\.\d+)?\s*(?:kgs?|lbs?|g)?)").unwrap()
});

/// Pull the secondary fields out of OCR text. Labels that are absent or
/// unreadable are left as `None`.
pub fn extract_details(full_text: &str) -> PrescriptionDetails {
    PrescriptionDetails {
        date: capture(&DATE_PATTERN, full_text),
        age: capture(&AGE_PATTERN, full_text).and_then(|a| a.parse().ok()),
        sex: capture(&SEX_PATTERN, full_text).map(|s| normalize_sex(&s)),
        weight: capture(&WEIGHT_PATTERN, full_text).map(|w| w.replace(' ', "")),
    }
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn normalize_sex(value: &str) -> String {
    match value.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('m') => "M".to_string(),
        Some('f') => "F".to_string(),
        _ => value.to_uppercase(),
    }
}
