//! Error handling for the storefront client
//!
//! Every failed API call is classified into one of four kinds so page
//! controllers can decide between showing the server's message, suggesting a
//! retry, or ending the session.

use reqwest::StatusCode;
use shared::ApiMessage;
use thiserror::Error;

/// Message shown when the server rejects the session
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// API error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// No response was received at all
    #[error("Network unreachable: {0}")]
    NetworkUnreachable(String),

    /// HTTP 401
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// 4xx carrying a `{message}` payload
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Anything else: 5xx, 4xx without a message, unreadable bodies
    #[error("Unexpected error: {0}")]
    Unclassified(String),
}

impl ApiError {
    /// Classify a non-success response from its status and raw body
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ApiMessage>(body)
            .ok()
            .and_then(|payload| payload.message)
            .filter(|message| !message.trim().is_empty());

        if status == StatusCode::UNAUTHORIZED {
            return ApiError::Unauthorized {
                message: message.unwrap_or_else(|| "Session expired".to_string()),
            };
        }

        match message {
            Some(message) if status.is_client_error() => ApiError::Rejected {
                status: status.as_u16(),
                message,
            },
            Some(message) => ApiError::Unclassified(format!("HTTP {}: {}", status, message)),
            None => ApiError::Unclassified(format!("HTTP {}", status)),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// HTTP status of the failed call, when one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Notification text for a failed user action such as "Checkout failed"
    pub fn user_message(&self, action: &str) -> String {
        match self {
            ApiError::Unauthorized { .. } => SESSION_EXPIRED_MESSAGE.to_string(),
            ApiError::Rejected { message, .. } => format!("{}: {}", action, message),
            ApiError::NetworkUnreachable(_) => {
                format!("{}: cannot reach the server, please try again", action)
            }
            ApiError::Unclassified(_) => format!("{}, please try again", action),
        }
    }
}

/// Token persistence errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session file: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for API calls
pub type ApiResult<T> = Result<T, ApiError>;
