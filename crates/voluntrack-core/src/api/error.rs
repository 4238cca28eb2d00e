use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// User-facing text for each failure class.
pub const MSG_NETWORK: &str = "Network error, please check your connection";
pub const MSG_UNAUTHORIZED: &str = "Session expired, please log in again";
pub const MSG_FORBIDDEN: &str = "You do not have permission to access this resource";
pub const MSG_NOT_FOUND: &str = "The requested resource does not exist";
pub const MSG_SERVER: &str = "Internal server error";
pub const MSG_FALLBACK: &str = "Request failed";
pub const MSG_INVALID_RESPONSE: &str = "Unexpected response from server";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Unauthorized - session expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Request failed with status {status}: {}", or_fallback(.message))]
    Unclassified { status: u16, message: Option<String> },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

fn or_fallback(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or(MSG_FALLBACK)
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// The server reports failures as `{"error": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl ApiError {
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

    /// Classify a non-success response.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden(truncated),
            404 => ApiError::NotFound(truncated),
            500 => ApiError::Server(truncated),
            code => ApiError::Unclassified {
                status: code,
                message: serde_json::from_str::<ErrorBody>(body)
                    .ok()
                    .and_then(|b| b.error)
                    .filter(|m| !m.is_empty()),
            },
        }
    }

    /// Text shown to the user in a transient notification.
    pub fn user_message(&self) -> &str {
        match self {
            ApiError::Network(_) => MSG_NETWORK,
            ApiError::Unauthorized => MSG_UNAUTHORIZED,
            ApiError::Forbidden(_) => MSG_FORBIDDEN,
            ApiError::NotFound(_) => MSG_NOT_FOUND,
            ApiError::Server(_) => MSG_SERVER,
            ApiError::Unclassified { message, .. } => or_fallback(message),
            ApiError::InvalidResponse(_) => MSG_INVALID_RESPONSE,
        }
    }

    /// HTTP status behind the error, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Network(_) | ApiError::InvalidResponse(_) => None,
            ApiError::Unauthorized => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::Server(_) => Some(500),
            ApiError::Unclassified { status, .. } => Some(*status),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}
