use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PdfError {
    /// The bytes are not a usable PDF
    #[error("Document could not be parsed: {0}")]
    Corrupt(String),

    /// A requested page number is outside `1..=page_count`, or repeated
    #[error("{0}")]
    InvalidPageRange(String),

    /// The derived document could not be serialised
    #[error("Document could not be written: {0}")]
    Write(String),
}
