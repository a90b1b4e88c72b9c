//! Failure taxonomy for lookup requests.
//!
//! A failed lookup always ends the request it belongs to and nothing else.
//! Front-ends turn these into error-flagged payloads: MCP tool results with
//! `isError: true`, or JSON error bodies with a matching HTTP status.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    /// The backing corpus file is missing or unreadable.
    #[error("failed to read corpus '{name}' from {}: {source}", path.display())]
    Read {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corpus not found: {0}")]
    UnknownCorpus(String),

    #[error("invalid parameter: {0}")]
    InvalidParams(String),

    #[error("fetch timed out: {url}")]
    Timeout { url: String },

    #[error("fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("conversion failed: {0}")]
    Conversion(String),
}

impl LookupError {
    /// Machine-readable code used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            LookupError::Read { .. } => "read_error",
            LookupError::UnknownCorpus(_) => "not_found",
            LookupError::InvalidParams(_) => "bad_request",
            LookupError::Timeout { .. } => "timeout",
            LookupError::Fetch { .. } => "fetch_error",
            LookupError::Conversion(_) => "conversion_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;
