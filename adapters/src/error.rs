//! Error types for the partner adapter

use thiserror::Error;

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Adapter errors
#[derive(Error, Debug)]
pub enum Error {
    /// Partner authentication failed (transport, rejection or decode)
    #[error("Partner authentication failed: {0}")]
    AuthenticationFailed(#[source] Box<Error>),

    /// Partner answered with a status outside {200, 201}
    #[error("Partner rejected request with status {status_code}: {body}")]
    PartnerRejected {
        /// HTTP status code
        status_code: u16,
        /// Raw response body
        body: String,
    },

    /// Connection-level failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Timeout
    #[error("Timeout after {seconds}s: {operation}")]
    Timeout {
        /// Timeout duration
        seconds: u64,
        /// Operation
        operation: String,
    },

    /// Response body did not match the expected shape
    #[error("Failed to decode partner response: {reason}")]
    Decode {
        /// Decoder message
        reason: String,
        /// Raw response body
        body: String,
    },

    /// Rail is not instapay or pesonet
    #[error("Unsupported disbursement rail: {0}")]
    UnsupportedRail(String),

    /// Caller payload failed validation
    #[error("Invalid disbursement request: {0}")]
    InvalidRequest(String),

    /// Caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for connection failures and timeouts
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Timeout { .. })
    }

    /// Partner body attached to the error, if any
    pub fn partner_body(&self) -> Option<&str> {
        match self {
            Error::PartnerRejected { body, .. } | Error::Decode { body, .. } => Some(body),
            Error::AuthenticationFailed(inner) => inner.partner_body(),
            _ => None,
        }
    }

    /// Short machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::AuthenticationFailed(_) => "authentication_failed",
            Error::PartnerRejected { .. } => "partner_rejected",
            Error::Transport(_) => "transport_failed",
            Error::Timeout { .. } => "timeout",
            Error::Decode { .. } => "decode_failed",
            Error::UnsupportedRail(_) => "unsupported_rail",
            Error::InvalidRequest(_) => "invalid_request",
            Error::Cancelled => "cancelled",
            Error::Config(_) => "config_error",
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Error::InvalidRequest(errors.to_string())
    }
}
