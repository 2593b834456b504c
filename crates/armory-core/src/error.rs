//! Error types for Armory.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Upstream errors
    #[error("Failed to fetch catalog from {url}: {reason}")]
    UpstreamFetchFailed { url: String, reason: String },

    #[error("Malformed catalog document: {0}")]
    MalformedDocument(String),

    // Lookup errors
    #[error("Skin with ID {0} not found in any available source")]
    SkinNotFound(String),

    #[error("Crate with ID {0} not found")]
    CrateNotFound(String),

    #[error("Collection with ID {0} not found")]
    CollectionNotFound(String),

    #[error("Cache entry not found for key: {0}")]
    CacheEntryNotFound(String),

    // Input errors
    #[error("{0}")]
    InvalidInput(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    // Infrastructure errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error names a missing catalog record or cache entry.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::SkinNotFound(_)
                | Error::CrateNotFound(_)
                | Error::CollectionNotFound(_)
                | Error::CacheEntryNotFound(_)
        )
    }

    /// Whether the error was caused by caller-supplied input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_) | Error::UnsupportedLanguage(_) | Error::UnknownEndpoint(_)
        )
    }

    /// Whether the error originated upstream of this process.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::UpstreamFetchFailed { .. } | Error::MalformedDocument(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
