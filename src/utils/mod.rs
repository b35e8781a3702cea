//! Shared utility functions.
//!
//! - `mime`: accepted image types and extension selection
//! - `sanitize`: path-safe keys derived from patient names

mod mime;
mod sanitize;

pub use mime::{
    content_type_for_path, is_allowed_image_type, upload_extension, ImageKind,
    ALLOWED_IMAGE_TYPES,
};
pub use sanitize::{sanitize_filename, UNKNOWN_NAME};
