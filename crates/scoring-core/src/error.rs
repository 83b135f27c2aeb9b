//! Error types for the scoring core
//!
//! Every failure a call can end with maps onto one HTTP-style status code.
//! Validation and business-rule failures are recovered into
//! [`ApiError::InvalidRequest`]; only lookup failures become
//! [`ApiError::Internal`].

use thiserror::Error;

pub const OK: u16 = 200;
pub const BAD_REQUEST: u16 = 400;
pub const FORBIDDEN: u16 = 403;
pub const NOT_FOUND: u16 = 404;
pub const INVALID_REQUEST: u16 = 422;
pub const INTERNAL_ERROR: u16 = 500;

/// Error returned by the dispatcher and the method handlers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Body could not be read or parsed
    #[error("Bad Request")]
    BadRequest,

    /// Token did not match the expected digest
    #[error("Forbidden")]
    Forbidden,

    /// Unknown route
    #[error("Not Found")]
    NotFound,

    /// Field, business-rule or unknown-method failure
    #[error("{0}")]
    InvalidRequest(String),

    /// Anything unexpected, e.g. a failing lookup
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        ApiError::InvalidRequest(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }

    /// Numeric status code for the response envelope
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest => BAD_REQUEST,
            ApiError::Forbidden => FORBIDDEN,
            ApiError::NotFound => NOT_FOUND,
            ApiError::InvalidRequest(_) => INVALID_REQUEST,
            ApiError::Internal(_) => INTERNAL_ERROR,
        }
    }

    /// Message shown to the client.
    ///
    /// Internal details never leave the process; they are logged instead.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::InvalidRequest(msg) if !msg.is_empty() => msg.clone(),
            _ => default_message(self.status_code()).to_string(),
        }
    }

    /// Check if this error was caused by the caller (vs internal)
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ApiError::Internal(_))
    }
}

/// Fixed phrase for a status code
pub fn default_message(code: u16) -> &'static str {
    match code {
        BAD_REQUEST => "Bad Request",
        FORBIDDEN => "Forbidden",
        NOT_FOUND => "Not Found",
        INVALID_REQUEST => "Invalid Request",
        INTERNAL_ERROR => "Internal Server Error",
        _ => "Unknown Error",
    }
}

/// Result type alias for dispatch operations
pub type Result<T> = std::result::Result<T, ApiError>;
