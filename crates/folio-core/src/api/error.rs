use serde::Deserialize;
use thiserror::Error;

/// Errors from the HTTP layer.
///
/// Every status-derived variant keeps two things apart: `detail`, a
/// loggable description that may contain raw body text, and `message`, the
/// `message` field of a JSON failure body when the server sent one. Only
/// `message` is ever shown to users.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {detail}")]
    AccessDenied { detail: String, message: Option<String> },

    #[error("Unauthorized - token may be expired")]
    Unauthorized { message: Option<String> },

    #[error("Resource not found: {detail}")]
    NotFound { detail: String, message: Option<String> },

    /// Any other 4xx: the server refused the request as sent.
    #[error("Request rejected ({status}): {detail}")]
    Validation {
        status: u16,
        detail: String,
        message: Option<String>,
    },

    #[error("Rate limited - please wait before retrying")]
    RateLimited { message: Option<String> },

    #[error("Server error ({status}): {detail}")]
    ServerError {
        status: u16,
        detail: String,
        message: Option<String>,
    },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {detail}")]
    InvalidResponse { detail: String, message: Option<String> },
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Failure body convention: `{ "message": "..." }`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// A response that could not be understood, with nothing from the server
    /// worth showing.
    pub fn invalid_response(detail: impl Into<String>) -> Self {
        ApiError::InvalidResponse {
            detail: detail.into(),
            message: None,
        }
    }

    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the `message` field out of a JSON error body, if there is one.
    pub fn extract_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::extract_message(body);
        let detail = Self::truncate_body(body);
        let code = status.as_u16();
        match code {
            401 => ApiError::Unauthorized { message },
            403 => ApiError::AccessDenied { detail, message },
            404 => ApiError::NotFound { detail, message },
            429 => ApiError::RateLimited { message },
            400..=499 => ApiError::Validation {
                status: code,
                detail,
                message,
            },
            500..=599 => ApiError::ServerError {
                status: code,
                detail,
                message,
            },
            _ => ApiError::InvalidResponse {
                detail: format!("Status {}: {}", status, detail),
                message,
            },
        }
    }

    /// The `message` the server put in its failure body, if any.
    ///
    /// `None` for network failures, undecodable responses, and bodies that
    /// are not JSON or have no `message` field.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::AccessDenied { message, .. }
            | ApiError::Unauthorized { message }
            | ApiError::NotFound { message, .. }
            | ApiError::Validation { message, .. }
            | ApiError::RateLimited { message }
            | ApiError::ServerError { message, .. }
            | ApiError::InvalidResponse { message, .. } => message.as_deref(),
            ApiError::NetworkError(_) => None,
        }
    }
}
