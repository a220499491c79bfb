//! Chat request failures and their HTTP mapping.
//!
//! Every failure in the chat handler ends up here and is rendered as
//! `{"success": false, "error": ..., "fallback"?: true, "details"?: ...}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::config::Environment;
use crate::services::providers::ProviderError;

pub const MESSAGE_REQUIRED: &str = "Message is required and must be a string";
pub const NOT_CONFIGURED: &str = "AI service is not configured";
pub const INVALID_API_KEY: &str = "Invalid API key configuration";
pub const RATE_LIMITED: &str = "AI service rate limit reached. Please try again later.";
pub const PROCESSING_FAILED: &str = "Failed to process message";

#[derive(Debug, Error)]
pub enum ChatError {
    /// Caller sent an unusable request. Not retryable as-is.
    #[error("{0}")]
    Validation(String),

    /// Operator problem: missing or rejected credential.
    #[error("{0}")]
    Configuration(String),

    /// Upstream quota or rate limit hit.
    #[error("{0}")]
    RateLimit(String),

    #[error("{message}")]
    Internal {
        message: String,
        details: Option<String>,
    },
}

impl ChatError {
    pub fn missing_message() -> Self {
        ChatError::Validation(MESSAGE_REQUIRED.to_string())
    }

    pub fn not_configured() -> Self {
        ChatError::Configuration(NOT_CONFIGURED.to_string())
    }

    /// Error for a panic caught at the router boundary.
    pub fn unexpected(details: Option<String>) -> Self {
        ChatError::Internal {
            message: PROCESSING_FAILED.to_string(),
            details,
        }
    }

    /// Classifies a provider failure. Typed variants win; otherwise the
    /// error text is inspected: `API_KEY` (case-sensitive) means a key
    /// problem, `quota` or `limit` (case-insensitive) a rate limit.
    /// Internal details are kept only when `environment` allows it.
    pub fn from_provider(err: ProviderError, environment: Environment) -> Self {
        match err {
            ProviderError::NotConfigured(_) => ChatError::not_configured(),
            ProviderError::InvalidApiKey(_) => {
                ChatError::Configuration(INVALID_API_KEY.to_string())
            }
            ProviderError::QuotaExceeded(_) => ChatError::RateLimit(RATE_LIMITED.to_string()),
            other => {
                let detail = other.to_string();
                let lowered = detail.to_lowercase();

                if detail.contains("API_KEY") {
                    ChatError::Configuration(INVALID_API_KEY.to_string())
                } else if lowered.contains("quota") || lowered.contains("limit") {
                    ChatError::RateLimit(RATE_LIMITED.to_string())
                } else {
                    ChatError::Internal {
                        message: PROCESSING_FAILED.to_string(),
                        details: environment.exposes_error_details().then_some(detail),
                    }
                }
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ChatError::Validation(_) => StatusCode::BAD_REQUEST,
            ChatError::RateLimit(_) => StatusCode::TOO_MANY_REQUESTS,
            ChatError::Configuration(_) | ChatError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether the client should degrade gracefully rather than treat this
    /// as a hard error.
    pub fn is_fallback(&self) -> bool {
        !matches!(self, ChatError::Validation(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChatError::Validation(_) => "ValidationError",
            ChatError::Configuration(_) => "ConfigurationError",
            ChatError::RateLimit(_) => "RateLimitError",
            ChatError::Internal { .. } => "InternalError",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let fallback = self.is_fallback().then_some(true);

        let (error, details) = match self {
            ChatError::Validation(msg)
            | ChatError::Configuration(msg)
            | ChatError::RateLimit(msg) => (msg, None),
            ChatError::Internal { message, details } => (message, details),
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error,
                fallback,
                details,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_provider_errors_map_directly() {
        let err = ChatError::from_provider(
            ProviderError::InvalidApiKey("bad".into()),
            Environment::Production,
        );
        assert!(matches!(err, ChatError::Configuration(ref m) if m == INVALID_API_KEY));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = ChatError::from_provider(
            ProviderError::QuotaExceeded("slow".into()),
            Environment::Production,
        );
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert!(err.is_fallback());
    }

    #[test]
    fn api_key_text_is_a_configuration_error() {
        let err = ChatError::from_provider(
            ProviderError::ApiError("400: API_KEY_INVALID".into()),
            Environment::Production,
        );
        assert_eq!(err.kind(), "ConfigurationError");
    }

    #[test]
    fn quota_or_limit_text_is_a_rate_limit() {
        for text in ["Quota exceeded", "per-minute LIMIT reached"] {
            let err = ChatError::from_provider(
                ProviderError::ApiError(text.into()),
                Environment::Production,
            );
            assert_eq!(err.kind(), "RateLimitError", "{text}");
        }
    }

    #[test]
    fn other_errors_hide_details_outside_development() {
        let prod = ChatError::from_provider(
            ProviderError::NetworkError("connection reset".into()),
            Environment::Production,
        );
        assert!(matches!(prod, ChatError::Internal { details: None, .. }));

        let dev = ChatError::from_provider(
            ProviderError::NetworkError("connection reset".into()),
            Environment::Development,
        );
        match dev {
            ChatError::Internal { details: Some(d), .. } => assert!(d.contains("connection reset")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn validation_errors_are_not_fallback() {
        let err = ChatError::missing_message();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(!err.is_fallback());
    }
}
