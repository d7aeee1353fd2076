//! Source document classification and metadata
//!
//! [`SourceDocument`] owns the uploaded bytes together with the [`DocumentMetadata`]
//! computed when it was accepted. Construction is the only place classification happens,
//! so holding a `SourceDocument` means the document is a PDF or a workbook.

use crate::constants::{PDF_MEDIA_TYPE, XLSX_MEDIA_TYPE, XLS_MEDIA_TYPE};
use crate::FilesError;
use chrono::{DateTime, Utc};
use hcx_types::NonEmptyText;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Supported source document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Excel,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Excel => "excel",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata recorded for an accepted document
///
/// Contains no content from the document itself, so it is safe to log and to echo back in
/// API responses.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Filename as supplied by the uploader (path components stripped)
    pub original_filename: NonEmptyText,

    /// Classified format
    pub kind: DocumentKind,

    /// Media type declared by the uploader, if any
    pub declared_media_type: Option<String>,

    /// Media type sniffed from magic bytes
    ///
    /// Best-effort only. `.xlsx` files are ZIP containers and usually sniff as such.
    pub sniffed_media_type: Option<String>,

    /// Size of the document in bytes
    pub size_bytes: u64,

    /// Hexadecimal SHA-256 digest of the content
    pub sha256: String,

    /// UTC timestamp when the document was accepted
    pub received_at: DateTime<Utc>,
}

/// An accepted source document
#[derive(Debug, Clone)]
pub struct SourceDocument {
    metadata: DocumentMetadata,
    bytes: Vec<u8>,
}

/// Classifies a document from its filename and declared media type
///
/// PDF wins when both signals are present but disagree, matching the order the converter
/// checks them in.
pub fn classify(filename: &str, declared_media_type: Option<&str>) -> Option<DocumentKind> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let media_type = declared_media_type
        .map(|m| m.split(';').next().unwrap_or(m).trim().to_ascii_lowercase());

    let ext = extension.as_deref();
    let mime = media_type.as_deref();

    if ext == Some("pdf") || mime == Some(PDF_MEDIA_TYPE) {
        return Some(DocumentKind::Pdf);
    }

    if matches!(ext, Some("xlsx") | Some("xls"))
        || mime == Some(XLSX_MEDIA_TYPE)
        || mime == Some(XLS_MEDIA_TYPE)
    {
        return Some(DocumentKind::Excel);
    }

    None
}

impl SourceDocument {
    /// Accepts an uploaded document
    ///
    /// # Arguments
    ///
    /// * `filename` - Filename supplied with the upload; directory components are dropped
    /// * `declared_media_type` - The part's `Content-Type`, if any
    /// * `bytes` - Document content
    /// * `max_bytes` - Upload size limit
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - the filename is blank
    /// - the document is empty or larger than `max_bytes`
    /// - the document is neither a PDF nor a workbook
    pub fn from_upload(
        filename: &str,
        declared_media_type: Option<&str>,
        bytes: Vec<u8>,
        max_bytes: usize,
    ) -> Result<Self, FilesError> {
        let base_name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(filename);
        let original_filename = NonEmptyText::new(base_name)
            .map_err(|_| FilesError::InvalidFilename(filename.to_string()))?;

        let kind = classify(original_filename.as_str(), declared_media_type).ok_or_else(|| {
            FilesError::UnsupportedFileType(format!(
                "{} ({})",
                original_filename,
                declared_media_type.unwrap_or("no media type")
            ))
        })?;

        if bytes.is_empty() {
            return Err(FilesError::Empty(original_filename.to_string()));
        }

        if bytes.len() > max_bytes {
            return Err(FilesError::TooLarge {
                size: bytes.len(),
                limit: max_bytes,
            });
        }

        let sha256 = hex::encode(Sha256::digest(&bytes));
        let sniffed_media_type = infer::get(&bytes).map(|k| k.mime_type().to_string());

        Ok(Self {
            metadata: DocumentMetadata {
                original_filename,
                kind,
                declared_media_type: declared_media_type.map(str::to_owned),
                sniffed_media_type,
                size_bytes: bytes.len() as u64,
                sha256,
                received_at: Utc::now(),
            },
            bytes,
        })
    }

    /// Reads and accepts a document from disk
    ///
    /// The media type is not known for local files, so classification relies on the
    /// extension alone.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::Io` if the file cannot be read, otherwise the same errors as
    /// [`SourceDocument::from_upload`].
    pub fn from_path(path: &Path, max_bytes: usize) -> Result<Self, FilesError> {
        let bytes = fs::read(path).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read source file {}: {}", path.display(), e),
            ))
        })?;

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FilesError::InvalidFilename(path.display().to_string()))?;

        Self::from_upload(filename, None, bytes, max_bytes)
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn kind(&self) -> DocumentKind {
        self.metadata.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
