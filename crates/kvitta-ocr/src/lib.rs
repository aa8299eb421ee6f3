//! kvitta-ocr — text detection for receipt images and scanned PDFs.
//!
//! - `OcrService`: the trait seam the pipeline calls, one image per call
//! - `vision`: Google Cloud Vision `images:annotate` client
//! - `pdf`: per-page scan-image extraction so multi-page PDFs can be
//!   OCR'd one page at a time

use async_trait::async_trait;
use thiserror::Error;

pub mod pdf;
pub mod vision;

pub use vision::GoogleVisionOcr;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OCR API error [{status}]: {message}")]
    Api { status: u16, message: String },

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("image encode error: {0}")]
    Image(#[from] image::ImageError),
}

/// Single-image text detection.
#[async_trait]
pub trait OcrService: Send + Sync {
    /// Run text detection over one image. Returns `None` when the service
    /// reports no text annotations at all (blank page, unreadable scan).
    async fn detect_text(&self, image: &[u8]) -> Result<Option<String>, OcrError>;
}
