//! Client-side text extraction over uploaded report files.
//!
//! One extractor per media kind (LLM-vision OCR for images, content-stream
//! text for PDFs) plus the batch coordinator that drives a file list
//! sequentially with per-file failure isolation.

pub mod batch;
pub mod image;
pub mod pdf;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{FileKind, UploadedFile};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("OCR failure: {0}")]
    Ocr(String),
    #[error("PDF parse failure: {0}")]
    PdfParse(String),
}

/// Single-file extraction seam. The batch coordinator only sees this trait,
/// which keeps it testable without network or decode work.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, file: &UploadedFile) -> Result<String, ExtractionError>;
}

/// Production extractor: dispatches on the declared media kind.
pub struct ReportExtractor;

#[async_trait]
impl TextExtractor for ReportExtractor {
    async fn extract(&self, file: &UploadedFile) -> Result<String, ExtractionError> {
        match file.kind {
            FileKind::Image => image::extract_image_text(&file.bytes).await,
            FileKind::Pdf => pdf::extract_pdf_text(file.bytes.clone()).await,
        }
    }
}
