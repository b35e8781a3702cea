//! Subcommand implementations.

pub mod extract;
pub mod ocr_check;
pub mod password;
pub mod serve;
