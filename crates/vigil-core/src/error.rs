//! Shared error type across Vigil crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed configuration.
    BadRequest,
    /// Named metric does not exist.
    NotFound,
    /// Upstream backend (model, market data) failed.
    Backend,
    /// Internal server error, including metric wiring bugs.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::Backend => "BACKEND",
            ClientCode::Internal => "INTERNAL",
        }
    }

    /// HTTP status code for this class of error.
    pub fn http_status(self) -> u16 {
        match self {
            ClientCode::BadRequest => 400,
            ClientCode::NotFound => 404,
            ClientCode::Backend | ClientCode::Internal => 500,
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, VigilError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum VigilError {
    #[error("metric already registered: {0}")]
    DuplicateName(String),
    #[error("metric not found: {0}")]
    NotFound(String),
    #[error("metric {name} is a {actual}, not a {expected}")]
    WrongKind {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("invalid labels for {metric}: expected [{expected}], got [{got}]")]
    InvalidLabels {
        metric: String,
        expected: String,
        got: String,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Backend(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl VigilError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            VigilError::BadRequest(_) => ClientCode::BadRequest,
            VigilError::NotFound(_) => ClientCode::NotFound,
            VigilError::Backend(_) => ClientCode::Backend,
            VigilError::DuplicateName(_)
            | VigilError::WrongKind { .. }
            | VigilError::InvalidLabels { .. }
            | VigilError::InvalidArgument(_)
            | VigilError::Internal(_) => ClientCode::Internal,
        }
    }
}
