//! Filename sanitization for storage paths.

/// Token used when a name sanitizes to nothing.
pub const UNKNOWN_NAME: &str = "unknown";

/// Turn a display name into a path-safe key.
///
/// Lower-cases, trims, replaces spaces with underscores, then drops every
/// character that is neither alphanumeric nor an underscore. Returns
/// `"unknown"` when nothing survives.
pub fn sanitize_filename(name: &str) -> String {
    let clean: String = name
        .trim()
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();

    if clean.is_empty() {
        UNKNOWN_NAME.to_string()
    } else {
        clean
    }
}
