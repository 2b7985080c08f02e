//! Error types for the threadfin engine.
//!
//! All fallible operations in the crate return [`Result`], whose error type
//! is the [`ThreadfinError`] enum. The taxonomy follows the engine's
//! degradation policy: validation and corrupt-state problems surface as
//! errors, while "not found" conditions are plain empty results and never
//! reach this type.

use std::io;

use thiserror::Error;

/// The main error type for threadfin operations.
#[derive(Error, Debug)]
pub enum ThreadfinError {
    /// I/O errors (index/trie persistence, document ingestion).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Text analysis errors (tokenization, filtering).
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Inverted-index errors, including invariant violations found in a
    /// persisted snapshot.
    #[error("Index error: {0}")]
    Index(String),

    /// Query processing errors.
    #[error("Query error: {0}")]
    Query(String),

    /// Persistence/storage errors.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid configuration detected at startup validation.
    #[error("Config error: {0}")]
    Config(String),

    /// A bounded resource (e.g. the document store) is full.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with [`ThreadfinError`].
pub type Result<T> = std::result::Result<T, ThreadfinError>;

impl ThreadfinError {
    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        ThreadfinError::Analysis(msg.into())
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        ThreadfinError::Index(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        ThreadfinError::Query(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        ThreadfinError::Storage(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        ThreadfinError::Config(msg.into())
    }

    /// Create a new resource-exhausted error.
    pub fn resource_exhausted<S: Into<String>>(msg: S) -> Self {
        ThreadfinError::ResourceExhausted(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = ThreadfinError::index("postings out of order");
        assert_eq!(error.to_string(), "Index error: postings out of order");

        let error = ThreadfinError::config("weights must sum to 1.0");
        assert_eq!(error.to_string(), "Config error: weights must sum to 1.0");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error = ThreadfinError::from(io_error);

        match error {
            ThreadfinError::Io(_) => {}
            _ => panic!("expected Io variant"),
        }
    }
}
