//! HCX source-document intake
//!
//! This crate accepts the documents fed to the insurance-plan converter and decides what they
//! are before any parsing happens.
//!
//! ## Classification
//!
//! A document is classified from its **filename extension** and its **declared media type**
//! (the multipart `Content-Type`). Either signal is enough:
//!
//! - `.pdf` or `application/pdf` → [`DocumentKind::Pdf`]
//! - `.xlsx` / `.xls` or a spreadsheet media type → [`DocumentKind::Excel`]
//!
//! Anything else is rejected with [`FilesError::UnsupportedFileType`]. The media type sniffed
//! from magic bytes is recorded in [`DocumentMetadata`] but never used to accept or reject.
//!
//! ## Example Usage
//!
//! ```no_run
//! use hcx_files::{SourceDocument, DEFAULT_MAX_UPLOAD_BYTES};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = SourceDocument::from_path(Path::new("plans.xlsx"), DEFAULT_MAX_UPLOAD_BYTES)?;
//! println!("{} ({} bytes)", doc.metadata().sha256, doc.metadata().size_bytes);
//! # Ok(())
//! # }
//! ```

mod constants;
mod document;

pub use constants::{
    ACCEPTED_EXTENSIONS, DEFAULT_MAX_UPLOAD_BYTES, PDF_MEDIA_TYPE, XLSX_MEDIA_TYPE,
    XLS_MEDIA_TYPE,
};
pub use document::{classify, DocumentKind, DocumentMetadata, SourceDocument};

/// Errors that can occur while accepting a source document
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Neither the extension nor the declared media type names a supported format
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// The upload carried no bytes
    #[error("Uploaded file is empty: {0}")]
    Empty(String),

    /// The upload exceeds the configured limit
    #[error("File too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    /// Filename missing or blank
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
