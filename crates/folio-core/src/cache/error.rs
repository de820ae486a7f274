use std::fmt;

use thiserror::Error;

use crate::api::ApiError;

/// Broad category of a cache failure, for callers that want to react
/// differently to, say, an expired token versus a validation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Validation,
    Unauthorized,
    NotFound,
    Server,
    InvalidResponse,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Network => write!(f, "network"),
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Unauthorized => write!(f, "unauthorized"),
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::Server => write!(f, "server"),
            ErrorKind::InvalidResponse => write!(f, "invalid response"),
            ErrorKind::Internal => write!(f, "internal"),
        }
    }
}

/// The operation a cache call was performing, used to word fallback messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Generic message used when the server did not send one.
    pub fn fallback_message(self, label: &str) -> String {
        match self {
            Operation::Fetch => format!("Failed to load {} list", label),
            Operation::Create => format!("Failed to create {}", label),
            Operation::Update => format!("Failed to update {}", label),
            Operation::Delete => format!("Failed to delete {}", label),
        }
    }
}

/// Single error shape every cache operation fails with.
///
/// `Clone` because one failed fetch is delivered to every caller that was
/// waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CacheError {
    pub kind: ErrorKind,
    /// Display-ready text: the server's `message` when it sent one.
    pub message: String,
}

impl CacheError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Normalize an HTTP-layer error, preferring the server's own message.
    pub fn from_api(err: &ApiError, fallback: impl Into<String>) -> Self {
        let kind = match err {
            ApiError::NetworkError(_) => ErrorKind::Network,
            ApiError::Validation { .. } => ErrorKind::Validation,
            ApiError::Unauthorized { .. } | ApiError::AccessDenied { .. } => ErrorKind::Unauthorized,
            ApiError::NotFound { .. } => ErrorKind::NotFound,
            ApiError::ServerError { .. } | ApiError::RateLimited { .. } => ErrorKind::Server,
            ApiError::InvalidResponse { .. } => ErrorKind::InvalidResponse,
        };
        let message = err
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.into());
        Self { kind, message }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }
}
