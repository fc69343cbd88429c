//! Source error types.

use thiserror::Error;

/// Errors that can occur while fetching the content document.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The document does not exist at the configured location.
    #[error("content document not found: {0}")]
    NotFound(String),

    /// The server answered with an error status.
    #[error("HTTP error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network or I/O error occurred.
    #[error("network error: {0}")]
    Network(String),
}

impl SourceError {
    /// Returns `true` if fetching again cannot succeed without a configuration change.
    pub fn is_permanent(&self) -> bool {
        match self {
            SourceError::NotFound(_) => true,
            SourceError::Http { status, .. } => (400..500).contains(status) && *status != 429,
            SourceError::Timeout(_) | SourceError::Network(_) => false,
        }
    }
}

/// Whether a fetch error is a [`SourceError`] that retrying cannot fix.
///
/// Errors from anywhere else count as transient.
pub fn is_permanent_error(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<SourceError>()
        .is_some_and(SourceError::is_permanent)
}
