//! Backend error types

/// Errors raised by a pluggable cache backend.
///
/// Backend failures are surfaced to callers as errors rather than being
/// swallowed as cache misses, so the orchestration layer can choose to
/// degrade to always-execute mode.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend could not be reached or refused the operation.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// The backend returned data for a key that could not be interpreted.
    #[error("Corrupt entry for key `{key}`: {message}")]
    Corrupt {
        /// The key whose stored bytes were unreadable.
        key: String,
        /// Description of what was wrong with the stored bytes.
        message: String,
    },

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    /// Creates a new unavailability error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Creates a new corrupt-entry error.
    pub fn corrupt(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Corrupt {
            key: key.into(),
            message: message.into(),
        }
    }
}
