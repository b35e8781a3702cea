//! HTTP request handlers.

mod api_types;
mod auth;
mod files;
mod health;
mod helpers;
mod ocr;
mod prescriptions;
mod records;

pub use api_types::ApiResponse;
pub use auth::{login, verify};
pub use files::serve_file;
pub use health::{health, root};
pub use ocr::{extract_name, extract_text};
pub use prescriptions::{list_patients as list_patient_folders, patient_prescriptions, upload};
pub use records::{get_patient, list_patients, review_queue, update_patient};
