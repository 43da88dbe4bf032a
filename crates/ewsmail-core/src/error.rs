//! Error types for the core module

use thiserror::Error;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while preparing outbound mail
#[derive(Debug, Error)]
pub enum CoreError {
    /// Address could not be parsed or contains forbidden characters
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Character set label is not one we can encode headers with
    #[error("Unsupported charset: {0}")]
    UnsupportedCharset(String),

    /// A settings value could not be interpreted
    #[error("Invalid setting {name}: {value}")]
    InvalidSetting { name: String, value: String },
}
