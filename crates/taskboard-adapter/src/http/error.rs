/*
[INPUT]:  Error sources (HTTP, API, serialization, auth)
[OUTPUT]: Structured error types with context and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

use crate::types::{AuthErrorBody, PostgrestErrorBody};

/// Main error type for the board backend adapter
#[derive(Error, Debug)]
pub enum TaskboardError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Authentication failed or the principal may not touch the row
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Access token is past its expiry
    #[error("Session expired, please sign in again")]
    SessionExpired,

    /// A read or write matched no visible row
    #[error("{table} row {id} not found or not visible")]
    NotFound { table: &'static str, id: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after}s")]
    RateLimit { retry_after: u64 },
}

impl TaskboardError {
    /// Check if error indicates authentication failure
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            TaskboardError::Authentication { .. } | TaskboardError::SessionExpired
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TaskboardError::NotFound { .. })
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        TaskboardError::Api {
            status: status.as_u16(),
            code: None,
            message: message.into(),
        }
    }

    /// Map a non-2xx relational API response.
    ///
    /// Row-level security violations (`42501`) and 401/403 are reported
    /// as authentication errors.
    pub fn from_postgrest(status: StatusCode, body: &str) -> Self {
        let parsed = serde_json::from_str::<PostgrestErrorBody>(body).ok();
        let message = match &parsed {
            Some(parsed) => parsed.summary(),
            None if body.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("request rejected")
                .to_string(),
            None => body.trim().to_string(),
        };
        let code = parsed.and_then(|parsed| parsed.code);

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
            || code.as_deref() == Some("42501")
        {
            return TaskboardError::Authentication { message };
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return TaskboardError::RateLimit { retry_after: 1 };
        }

        TaskboardError::Api {
            status: status.as_u16(),
            code,
            message,
        }
    }

    /// Map a non-2xx auth API response.
    pub fn from_auth(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<AuthErrorBody>(body)
            .map(|parsed| parsed.summary())
            .unwrap_or_else(|_| body.trim().to_string());

        if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
            TaskboardError::Authentication { message }
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            TaskboardError::RateLimit { retry_after: 1 }
        } else {
            TaskboardError::api_error(status, message)
        }
    }
}

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, TaskboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_auth_error() {
        assert!(TaskboardError::SessionExpired.is_auth_error());
        assert!(TaskboardError::Authentication {
            message: "nope".to_string()
        }
        .is_auth_error());
        assert!(!TaskboardError::RateLimit { retry_after: 2 }.is_auth_error());
    }

    #[test]
    fn test_postgrest_error_mapping() {
        let body = r#"{"code":"23505","message":"duplicate key value","details":null,"hint":null}"#;
        match TaskboardError::from_postgrest(StatusCode::CONFLICT, body) {
            TaskboardError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 409);
                assert_eq!(code.as_deref(), Some("23505"));
                assert_eq!(message, "duplicate key value");
            }
            other => panic!("Expected Api error variant, got {other:?}"),
        }

        let rls = r#"{"code":"42501","message":"new row violates row-level security policy"}"#;
        assert!(TaskboardError::from_postgrest(StatusCode::BAD_REQUEST, rls).is_auth_error());
        assert!(TaskboardError::from_postgrest(StatusCode::UNAUTHORIZED, "").is_auth_error());
    }

    #[test]
    fn test_auth_error_mapping() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        let err = TaskboardError::from_auth(StatusCode::BAD_REQUEST, body);
        assert!(err.is_auth_error());
        assert!(err.to_string().contains("Invalid login credentials"));
    }
}
