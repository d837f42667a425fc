use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Errors produced by the library's components.
///
/// Validation errors (`UnknownMode`, `MissingPlaceholder`, `InvalidInput`)
/// are raised before any network call and classify as client errors.
/// Call errors (`Unreachable`, `Timeout`, `ServerError`) come from the single
/// outbound inference call and classify as server errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OneshotError {
    /// The requested mode is not present in the registry.
    #[error("unknown mode '{0}'")]
    UnknownMode(String),

    /// A template placeholder had no matching input value.
    #[error("mode '{mode}' requires input '{placeholder}'")]
    MissingPlaceholder { mode: String, placeholder: String },

    /// Request content rejected before prompting (empty or over-long input).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The inference endpoint could not be connected to.
    #[error("inference endpoint unreachable at {url}: {message}")]
    Unreachable { url: String, message: String },

    /// No response arrived within the per-call deadline.
    #[error("no response from inference endpoint within {limit:?}")]
    Timeout { limit: Duration },

    /// The inference endpoint answered with a non-success status.
    #[error("inference endpoint returned HTTP {status}: {body}")]
    ServerError { status: u16, body: String },

    /// Invalid configuration detected at build time.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Machine-readable error kind, stable across message changes.
///
/// HTTP-facing callers serialize this next to the human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownMode,
    MissingPlaceholder,
    InvalidInput,
    Unreachable,
    Timeout,
    ServerError,
    InvalidConfig,
}

impl OneshotError {
    /// The machine-readable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OneshotError::UnknownMode(_) => ErrorKind::UnknownMode,
            OneshotError::MissingPlaceholder { .. } => ErrorKind::MissingPlaceholder,
            OneshotError::InvalidInput(_) => ErrorKind::InvalidInput,
            OneshotError::Unreachable { .. } => ErrorKind::Unreachable,
            OneshotError::Timeout { .. } => ErrorKind::Timeout,
            OneshotError::ServerError { .. } => ErrorKind::ServerError,
            OneshotError::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }

    /// Whether this error is the caller's fault (4xx-equivalent).
    ///
    /// Everything else (including `InvalidConfig`) maps to a 5xx-equivalent.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            OneshotError::UnknownMode(_)
                | OneshotError::MissingPlaceholder { .. }
                | OneshotError::InvalidInput(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, OneshotError>;
