//! Top-level cache error type

use super::BackendError;

/// Errors that can occur during cache operations.
///
/// Parsing and extraction problems never surface here; they degrade to
/// "not cacheable" so the underlying statement still executes. Only
/// contract violations and infrastructure failures are reported.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A required part of the statement was missing. Contract violation.
    #[error("Invalid statement: {0}")]
    InvalidStatement(&'static str),

    /// The pluggable backend failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// A cached envelope could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// The live result cursor failed while being drained into a snapshot.
    #[error("Row source error: {0}")]
    RowSource(String),
}

impl CacheError {
    /// Creates a new row-source error.
    pub fn row_source(message: impl Into<String>) -> Self {
        Self::RowSource(message.into())
    }

    /// Returns `true` if this error came from the backend and the caller
    /// may want to fall back to executing without the cache.
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}
