//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::core::ChatError;
use crate::providers::ProviderError;

/// Error returned by a handler, rendered as `{"error": message}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Map a completion failure to a status and a caller-safe message
    fn upstream(error: &ProviderError) -> Self {
        let status = match error {
            e if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            ProviderError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ProviderError::Unauthorized(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, format!("API Error: {}", error.public_message()))
    }
}

impl From<ChatError> for ApiError {
    fn from(error: ChatError) -> Self {
        match error {
            ChatError::EmptyMessage | ChatError::InvalidSessionId => {
                Self::bad_request(error.to_string())
            }
            ChatError::Provider(ref e) => Self::upstream(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_message_is_bad_request() {
        let err = ApiError::from(ChatError::EmptyMessage);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "No message provided");
    }

    #[test]
    fn test_invalid_session_id_is_bad_request() {
        let err = ApiError::from(ChatError::InvalidSessionId);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Invalid session id");
    }

    #[test]
    fn test_upstream_status_mapping() {
        let cases = [
            (ProviderError::Timeout, StatusCode::GATEWAY_TIMEOUT),
            (
                ProviderError::RateLimited("slow down".into()),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                ProviderError::Unauthorized("Invalid API Key".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (ProviderError::EmptyResponse, StatusCode::INTERNAL_SERVER_ERROR),
            (
                ProviderError::InvalidResponse("garbage".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (provider_error, status) in cases {
            let err = ApiError::from(ChatError::Provider(provider_error));
            assert_eq!(err.status, status);
            assert!(err.message.starts_with("API Error: "));
        }
    }
}
