//! Intake models for the ingestion pipeline.

use std::ffi::OsStr;
use std::path::Path;

/// Supported artifact formats, derived from the uploaded filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Pdf,
    Jpeg,
    Png,
}

impl ArtifactKind {
    /// Map a lowercase extension to a kind; anything outside
    /// `{pdf, jpg, jpeg, png}` is unsupported.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pdf" => Some(ArtifactKind::Pdf),
            "jpg" | "jpeg" => Some(ArtifactKind::Jpeg),
            "png" => Some(ArtifactKind::Png),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ArtifactKind::Pdf => "application/pdf",
            ArtifactKind::Jpeg => "image/jpeg",
            ArtifactKind::Png => "image/png",
        }
    }
}

/// One uploaded file as read off the request: original name plus full bytes.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Lowercased filename extension, without the dot.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(OsStr::to_str)
            .map(|e| e.to_ascii_lowercase())
    }
}
