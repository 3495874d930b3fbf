//! Shared data structures for the dashboard state
//!
//! These structs represent the data model that flows between
//! file acquisition, the analysis pipeline and the result view.

use std::path::Path;
use std::sync::Arc;

use image::ImageFormat;

use super::preview::PreviewHandle;

/// The binary side of a selection: what gets uploaded for prediction
///
/// Cloning is cheap (the bytes are shared), so an in-flight submission
/// can hold its own copy while the user keeps browsing.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlob {
    /// Filename only (e.g., "normal_1.jpg")
    pub name: String,
    /// Declared media type (e.g., "image/jpeg"), if one is known
    pub media_type: Option<String>,
    /// File contents
    pub data: Arc<Vec<u8>>,
}

impl ImageBlob {
    pub fn new(name: impl Into<String>, media_type: Option<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type,
            data: Arc::new(data),
        }
    }

    /// Size of the file in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The currently active image: its bytes plus the preview it owns
///
/// Not `Clone`: the preview handle has exactly one owner.
#[derive(Debug)]
pub struct SelectedImage {
    pub blob: ImageBlob,
    pub preview: PreviewHandle,
}

impl SelectedImage {
    pub fn name(&self) -> &str {
        &self.blob.name
    }
}

/// Class label and confidence returned by the inference service
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticResult {
    /// Class label, e.g. "Normal" or "Viral Pneumonia"
    pub predicted_class: String,
    /// Confidence score in [0, 1]
    pub confidence: f64,
}

impl DiagnosticResult {
    /// Whether a confidence score is usable for display
    pub fn is_valid_confidence(confidence: f64) -> bool {
        confidence.is_finite() && (0.0..=1.0).contains(&confidence)
    }
}

/// Media type declared by a file's extension ("image/png" for `scan.png`)
///
/// Returns `None` for anything the image crate does not recognise as an
/// image format.
pub fn declared_media_type(path: &Path) -> Option<&'static str> {
    ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type())
}

/// Media type sniffed from the leading bytes of a file
pub fn sniffed_media_type(data: &[u8]) -> Option<&'static str> {
    image::guess_format(data)
        .ok()
        .map(|format| format.to_mime_type())
}

/// Whether a declared media type belongs to the image category
pub fn is_image_media_type(media_type: &str) -> bool {
    media_type.starts_with("image/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_declared_media_type_from_extension() {
        assert_eq!(declared_media_type(&PathBuf::from("scan.png")), Some("image/png"));
        assert_eq!(declared_media_type(&PathBuf::from("scan.JPG")), Some("image/jpeg"));
        assert_eq!(declared_media_type(&PathBuf::from("notes.txt")), None);
        assert_eq!(declared_media_type(&PathBuf::from("no_extension")), None);
    }

    #[test]
    fn test_sniffed_media_type() {
        let png_magic = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        assert_eq!(sniffed_media_type(&png_magic), Some("image/png"));
        assert_eq!(sniffed_media_type(b"hello world"), None);
    }

    #[test]
    fn test_confidence_range() {
        assert!(DiagnosticResult::is_valid_confidence(0.0));
        assert!(DiagnosticResult::is_valid_confidence(0.97));
        assert!(DiagnosticResult::is_valid_confidence(1.0));
        assert!(!DiagnosticResult::is_valid_confidence(1.2));
        assert!(!DiagnosticResult::is_valid_confidence(-0.1));
        assert!(!DiagnosticResult::is_valid_confidence(f64::NAN));
    }

    #[test]
    fn test_image_category() {
        assert!(is_image_media_type("image/jpeg"));
        assert!(!is_image_media_type("application/pdf"));
        assert!(!is_image_media_type(""));
    }
}
