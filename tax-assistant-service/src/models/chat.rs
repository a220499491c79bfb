use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChatError;

/// Timezone assumed when the client does not send one.
pub const DEFAULT_TIMEZONE: &str = "America/Bogota";

/// Validated chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub user_context: UserContext,
}

/// Client-supplied context, with defaults filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct UserContext {
    pub timestamp: String,
    pub timezone: String,
}

impl ChatRequest {
    /// Validates a raw JSON body. `message` must be a non-empty string;
    /// `userContext` is optional and only its string-valued `timestamp` and
    /// `timezone` keys are honoured.
    pub fn from_json(body: &Value, now: DateTime<Utc>) -> Result<Self, ChatError> {
        let message = match body.get("message") {
            Some(Value::String(message)) if !message.is_empty() => message.clone(),
            _ => return Err(ChatError::missing_message()),
        };

        Ok(Self {
            message,
            user_context: UserContext::resolve(body.get("userContext"), now),
        })
    }
}

impl UserContext {
    pub fn resolve(raw: Option<&Value>, now: DateTime<Utc>) -> Self {
        let field = |key: &str| {
            raw.and_then(|ctx| ctx.get(key))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            timestamp: field("timestamp").unwrap_or_else(|| iso_timestamp(now)),
            timezone: field("timezone").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
        }
    }
}

/// Successful chat reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub source: String,
    pub timestamp: String,
    pub model: String,
}

impl ChatResponse {
    pub fn new(response: String, source: &str, model: &str, now: DateTime<Utc>) -> Self {
        Self {
            success: true,
            response,
            metadata: ResponseMetadata {
                source: source.to_string(),
                timestamp: iso_timestamp(now),
                model: model.to_string(),
            },
        }
    }
}

/// ISO-8601 UTC timestamp with millisecond precision, e.g.
/// `2025-08-01T14:03:07.125Z`.
pub fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}
