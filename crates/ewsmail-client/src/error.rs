use thiserror::Error;

#[derive(Debug, Error)]
pub enum EwsError {
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Autodiscover failed: {0}")]
    AutoDiscoverFailed(String),

    #[error("Autodiscover error: {0}")]
    AutoDiscoverError(String),

    #[error("Autodiscover circular redirect: {0}")]
    AutoDiscoverCircularRedirect(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("EWS returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("SOAP fault: {0}")]
    SoapFault(String),

    #[error("{code}: {message}")]
    ResponseError { code: String, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl EwsError {
    /// Whether this error came from locating the account's server
    pub fn is_autodiscover(&self) -> bool {
        matches!(
            self,
            EwsError::AutoDiscoverFailed(_)
                | EwsError::AutoDiscoverError(_)
                | EwsError::AutoDiscoverCircularRedirect(_)
        )
    }
}

impl From<reqwest::Error> for EwsError {
    fn from(e: reqwest::Error) -> Self {
        EwsError::Transport(e.to_string())
    }
}

pub type EwsResult<T> = Result<T, EwsError>;
