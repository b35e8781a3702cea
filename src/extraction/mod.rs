//! Field extraction from raw prescription OCR text.
//!
//! Extraction is deterministic and rule-based:
//! - `patient`: patient name via an ordered table of labelled patterns
//! - `details`: secondary fields (date, age, sex, weight)
//! - `normalize`: display cleanup applied to captured names
//!
//! Everything here is pure and stateless. Compiled patterns live in
//! `LazyLock` statics, so extraction can be called from any task.

mod details;
mod normalize;
mod patient;

pub use details::{extract_details, PrescriptionDetails};
pub use normalize::normalize_name;
pub use patient::{
    extract_patient_name, Confidence, ExtractionResult, MSG_NO_MATCH, MSG_NO_TEXT, MSG_SUCCESS,
};
