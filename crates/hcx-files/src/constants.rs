//! Media types and limits for uploaded source documents.

/// Declared media type of PDF uploads.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Declared media type of `.xlsx` uploads.
pub const XLSX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Declared media type of legacy `.xls` uploads.
pub const XLS_MEDIA_TYPE: &str = "application/vnd.ms-excel";

/// Accepted file extensions, lowercase and without the dot.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "xlsx", "xls"];

/// Upload size limit applied when none is configured.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
