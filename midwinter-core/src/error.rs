//! Error types for the search core.

use std::time::Duration;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by retrieval, the relationship graph, the tool dispatcher,
/// the orchestration loop and the job tracker.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Page {page} not found. Valid pages are {first}-{last}.")]
    PageNotFound { page: i64, first: u32, last: u32 },

    #[error("Character '{0}' not found")]
    CharacterNotFound(String),

    #[error("Job '{0}' not found")]
    JobNotFound(String),

    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("Invalid section '{section}'. Valid sections: {valid}")]
    InvalidSection { section: String, valid: String },

    #[error("Missing required argument '{field}' for tool '{tool}'")]
    MissingArgument { tool: String, field: String },

    #[error("Invalid argument '{field}' for tool '{tool}': expected {expected}")]
    InvalidArgument {
        tool: String,
        field: String,
        expected: &'static str,
    },

    #[error("Search index unavailable: {0}")]
    Unavailable(String),

    #[error("Reasoning service error: {0}")]
    Upstream(#[from] claude::Error),

    #[error("Reasoning service did not respond within {0:?}")]
    UpstreamTimeout(Duration),

    #[error("Failed to load reference data: {0}")]
    Load(String),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Unavailable,
    Upstream,
    Load,
}

impl Error {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::PageNotFound { .. } | Error::CharacterNotFound(_) | Error::JobNotFound(_) => {
                ErrorKind::NotFound
            }
            Error::EmptyQuery
            | Error::InvalidSection { .. }
            | Error::MissingArgument { .. }
            | Error::InvalidArgument { .. } => ErrorKind::Validation,
            Error::Unavailable(_) => ErrorKind::Unavailable,
            Error::Upstream(_) | Error::UpstreamTimeout(_) => ErrorKind::Upstream,
            Error::Load(_) => ErrorKind::Load,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Load(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Load(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Load(e.to_string())
    }
}
