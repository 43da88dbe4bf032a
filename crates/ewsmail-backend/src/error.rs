//! Error types for the Exchange backend

use ewsmail_client::EwsError;
use ewsmail_core::CoreError;
use thiserror::Error;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors surfaced by the backend when it does not fail silently
///
/// Both variants are transparent so callers see the original failure.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Credential, autodiscover or send failure from the Exchange client
    #[error(transparent)]
    Exchange(#[from] EwsError),

    /// Message could not be prepared (bad address or charset)
    #[error(transparent)]
    Message(#[from] CoreError),
}

impl BackendError {
    /// Whether the failure happened while locating the Exchange server
    pub fn is_autodiscover(&self) -> bool {
        matches!(self, BackendError::Exchange(e) if e.is_autodiscover())
    }
}
