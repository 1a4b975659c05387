//! Planmart PDF handling
//!
//! Two operations over in-memory PDF bytes:
//! - [`page_count`]: parse a document and report how many pages it has
//! - [`extract_pages`]: build a new, standalone document holding exactly the
//!   requested pages in the requested order
//!
//! Neither operation touches the source bytes. Both are CPU-bound and should
//! run on a blocking thread when called from async code.

mod error;
mod slice;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use error::PdfError;
pub use slice::{extract_pages, page_count};

/// Media type of every document this crate produces
pub const PDF_MEDIA_TYPE: &str = "application/pdf";
