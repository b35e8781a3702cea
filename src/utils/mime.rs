//! Image MIME type handling for prescription uploads.

/// Content types accepted for prescription images.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/jpg", "image/webp"];

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
}

impl ImageKind {
    /// Parse a request content type. `image/jpg` is accepted as an alias
    /// because some mobile browsers send it.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Canonical content type used when storing the image.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// Default file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

/// Check whether a content type is accepted for upload.
pub fn is_allowed_image_type(content_type: &str) -> bool {
    ImageKind::from_content_type(content_type).is_some()
}

/// Pick the storage extension for an uploaded image.
///
/// Priority: the uploaded filename's extension, then the format sniffed from
/// the bytes, then `jpg`.
pub fn upload_extension(filename: Option<&str>, content: &[u8]) -> String {
    if let Some(ext) = filename
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.trim().to_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
    {
        return ext;
    }

    infer::get(content)
        .filter(|kind| kind.mime_type().starts_with("image/"))
        .map(|kind| kind.extension().to_string())
        .unwrap_or_else(|| "jpg".to_string())
}

/// Content type to serve a stored blob with, based on its extension.
pub fn content_type_for_path(path: &str) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_types() {
        for ct in ALLOWED_IMAGE_TYPES {
            assert!(is_allowed_image_type(ct), "{}", ct);
        }
        assert!(is_allowed_image_type("IMAGE/PNG"));
        assert!(is_allowed_image_type("image/jpeg; charset=binary"));
        assert!(!is_allowed_image_type("image/gif"));
        assert!(!is_allowed_image_type("application/pdf"));
        assert!(!is_allowed_image_type(""));
    }

    #[test]
    fn test_kind_extensions() {
        assert_eq!(ImageKind::from_content_type("image/jpg"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::Jpeg.extension(), "jpg");
        assert_eq!(ImageKind::Webp.content_type(), "image/webp");
    }

    #[test]
    fn test_upload_extension_from_filename() {
        assert_eq!(upload_extension(Some("scan.PNG"), b""), "png");
        assert_eq!(upload_extension(Some("photo.final.jpeg"), b""), "jpeg");
    }

    #[test]
    fn test_upload_extension_sniffed() {
        let png_header = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert_eq!(upload_extension(Some("camera"), &png_header), "png");
        assert_eq!(upload_extension(None, &png_header), "png");
    }

    #[test]
    fn test_upload_extension_default() {
        assert_eq!(upload_extension(None, b"not an image"), "jpg");
        assert_eq!(upload_extension(Some("noext"), b""), "jpg");
    }

    #[test]
    fn test_content_type_for_path() {
        assert_eq!(content_type_for_path("prescriptions/a/b.png"), "image/png");
        assert_eq!(content_type_for_path("prescriptions/a/b.jpg"), "image/jpeg");
    }
}
