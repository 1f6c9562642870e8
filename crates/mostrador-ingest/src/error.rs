//! Error types for document ingestion.

use thiserror::Error;

/// Errors produced while turning a delivery document into records.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The file extension maps to no known document kind.
    #[error("unsupported document type: .{0}")]
    UnsupportedDocument(String),

    /// Neither delimiter convention produced a readable table.
    #[error("document could not be parsed with any known delimiter convention")]
    UnparsableDocument,

    /// The table parsed but its mandatory columns could not be identified.
    #[error("could not identify mandatory columns: {0}")]
    SchemaUnresolved(String),

    /// Vision extraction was requested but no extractor is wired in.
    #[error("vision extraction is not available in this deployment")]
    CapabilityUnavailable,

    /// Vision extraction was requested but no API key is configured.
    #[error("vision extraction requires an API key and none is configured")]
    MissingCredential,

    /// The extraction call itself failed (transport, provider, timeout).
    #[error("vision extraction failed: {0}")]
    ExtractionFailed(String),

    /// The extractor answered, but with output we cannot interpret.
    #[error("extraction output could not be interpreted: {0}")]
    MalformedExtraction(String),
}

/// Convenient result alias for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

impl From<reqwest::Error> for IngestError {
    fn from(err: reqwest::Error) -> Self {
        IngestError::ExtractionFailed(err.to_string())
    }
}
