//! Document format seam
//!
//! Parsing and slicing are CPU-bound, so the async helpers below move the
//! work onto the blocking pool and hand the owned bytes back afterwards.

use std::sync::Arc;

use planmart_common::{Error, Result};
use planmart_pdf::PdfError;

/// A binary document format the store can count and slice
pub trait DocumentCodec: Send + Sync + 'static {
    /// Media type served for documents and previews
    fn media_type(&self) -> &'static str;

    /// File extension used in download filenames, without the dot
    fn extension(&self) -> &'static str;

    fn page_count(&self, bytes: &[u8]) -> Result<i32>;

    /// Build a standalone document holding `pages` (1-based) in order
    fn extract(&self, bytes: &[u8], pages: &[i32]) -> Result<Vec<u8>>;
}

/// PDF documents, backed by `planmart-pdf`
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfCodec;

impl DocumentCodec for PdfCodec {
    fn media_type(&self) -> &'static str {
        planmart_pdf::PDF_MEDIA_TYPE
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn page_count(&self, bytes: &[u8]) -> Result<i32> {
        let count = planmart_pdf::page_count(bytes).map_err(pdf_error)?;
        i32::try_from(count)
            .map_err(|_| Error::CorruptDocument(format!("implausible page count {}", count)))
    }

    fn extract(&self, bytes: &[u8], pages: &[i32]) -> Result<Vec<u8>> {
        planmart_pdf::extract_pages(bytes, pages).map_err(pdf_error)
    }
}

fn pdf_error(err: PdfError) -> Error {
    match err {
        PdfError::Corrupt(msg) => Error::CorruptDocument(msg),
        PdfError::InvalidPageRange(msg) => Error::InvalidPageRange(msg),
        PdfError::Write(msg) => Error::Internal(msg),
    }
}

/// Count pages on the blocking pool, returning the bytes with the count
pub async fn count_pages(codec: Arc<dyn DocumentCodec>, bytes: Vec<u8>) -> Result<(i32, Vec<u8>)> {
    tokio::task::spawn_blocking(move || codec.page_count(&bytes).map(|count| (count, bytes)))
        .await
        .map_err(|e| Error::Internal(format!("Page counting task failed: {}", e)))?
}

/// Extract pages on the blocking pool
pub async fn extract_pages(
    codec: Arc<dyn DocumentCodec>,
    bytes: Vec<u8>,
    pages: Vec<i32>,
) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || codec.extract(&bytes, &pages))
        .await
        .map_err(|e| Error::Internal(format!("Page extraction task failed: {}", e)))?
}
