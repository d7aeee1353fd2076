use hcx_files::FilesError;

/// Configuration could not be resolved at start-up.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConverterError {
    #[error(transparent)]
    Files(#[from] FilesError),
    #[error("failed to extract text from PDF: {0}")]
    PdfExtraction(String),
    #[error("failed to read workbook: {0}")]
    Workbook(String),
    #[error("no extractable text found in document")]
    NoContent,

    #[error("AI request failed: {0}")]
    Generation(String),
    #[error("AI provider returned status {status}: {body}")]
    GenerationStatus { status: u16, body: String },
    #[error("AI provider returned an empty response")]
    EmptyGeneration,

    #[error("Failed to parse AI response as JSON: {0}")]
    ReplyParse(String),
    #[error("Unexpected AI output format")]
    UnexpectedOutput,
    #[error("All generated entries reported errors")]
    AllEntriesFailed(Vec<String>),
    #[error("invalid FHIR content: {0}")]
    Fhir(#[from] fhir::FhirError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for ConverterError {
    fn from(err: reqwest::Error) -> Self {
        ConverterError::Generation(err.to_string())
    }
}

pub type ConverterResult<T> = std::result::Result<T, ConverterError>;

#[derive(Debug, thiserror::Error)]
pub enum HcxError {
    #[error("invalid HCX request: {0}")]
    InvalidRequest(String),
    #[error("invalid FHIR payload: {0}")]
    Fhir(#[from] fhir::FhirError),
    #[error("partner request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("partner returned status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

pub type HcxResult<T> = std::result::Result<T, HcxError>;
