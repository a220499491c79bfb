//! Gemini provider implementation.
//!
//! Calls `models/{model}:generateContent` once per chat message. No timeout
//! or retry is layered on top of the HTTP client defaults.

use super::{ProviderError, ProviderResponse, TextProvider};
use crate::config::GeminiSettings;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Secret<String>,
    pub model: String,
    pub api_base: String,
}

impl GeminiConfig {
    /// `None` when the settings carry no API key.
    pub fn from_settings(settings: &GeminiSettings) -> Option<Self> {
        settings.api_key.as_ref().map(|api_key| Self {
            api_key: api_key.clone(),
            model: settings.model.clone(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
        })
    }
}

/// Gemini text provider.
pub struct GeminiTextProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiTextProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().build().map_err(|e| {
            ProviderError::NotConfigured(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self { config, client })
    }

    /// Build the API URL for the configured model and `method`.
    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.api_base, self.config.model, method
        )
    }
}

#[async_trait]
impl TextProvider for GeminiTextProvider {
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.api_url("generateContent"))
            .header(API_KEY_HEADER, self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_api_error(status, &error_text));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        if let Some(reason) = api_response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(ProviderError::ApiError(format!(
                "Prompt blocked by Gemini: {}",
                reason
            )));
        }

        // Gemini may split a single answer across several parts.
        let text: String = api_response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        let usage = api_response.usage_metadata.unwrap_or_default();

        Ok(ProviderResponse {
            text,
            input_tokens: usage.prompt_token_count.unwrap_or(0),
            output_tokens: usage.candidates_token_count.unwrap_or(0),
        })
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn source(&self) -> &'static str {
        "gemini"
    }
}

/// Maps a non-2xx Gemini response onto a typed provider error, preferring
/// the structured `status` and `ErrorInfo.reason` fields of the error body.
fn classify_api_error(status: StatusCode, body: &str) -> ProviderError {
    let envelope = serde_json::from_str::<ApiErrorEnvelope>(body).ok();
    let error = envelope.as_ref().map(|e| &e.error);

    let message = error
        .and_then(|e| e.message.clone())
        .unwrap_or_else(|| body.to_string());

    let exhausted = error.and_then(|e| e.status.as_deref()) == Some("RESOURCE_EXHAUSTED");
    if status == StatusCode::TOO_MANY_REQUESTS || exhausted {
        return ProviderError::QuotaExceeded(message);
    }

    let key_problem = error
        .map(|e| {
            e.details
                .iter()
                .filter_map(|d| d.reason.as_deref())
                .any(|reason| reason.starts_with("API_KEY"))
        })
        .unwrap_or(false);
    if key_problem {
        return ProviderError::InvalidApiKey(message);
    }

    ProviderError::ApiError(format!("Gemini API error {}: {}", status, message))
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<i32>,
    candidates_token_count: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    status: Option<String>,
    #[serde(default)]
    details: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_many_requests_is_quota() {
        let err = classify_api_error(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(matches!(err, ProviderError::QuotaExceeded(msg) if msg == "slow down"));
    }

    #[test]
    fn resource_exhausted_status_is_quota() {
        let body = r#"{"error":{"code":400,"message":"Quota exceeded for metric","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = classify_api_error(StatusCode::BAD_REQUEST, body);
        assert!(
            matches!(err, ProviderError::QuotaExceeded(msg) if msg == "Quota exceeded for metric")
        );
    }

    #[test]
    fn api_key_reason_is_invalid_key() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT","details":[{"@type":"type.googleapis.com/google.rpc.ErrorInfo","reason":"API_KEY_INVALID"}]}}"#;
        let err = classify_api_error(StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, ProviderError::InvalidApiKey(_)));
    }

    #[test]
    fn other_errors_keep_status_and_message() {
        let body = r#"{"error":{"code":500,"message":"Internal error encountered.","status":"INTERNAL"}}"#;
        let err = classify_api_error(StatusCode::INTERNAL_SERVER_ERROR, body);
        match err {
            ProviderError::ApiError(msg) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("Internal error encountered."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn settings_without_key_yield_no_config() {
        let settings = GeminiSettings {
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            api_base: "http://localhost".to_string(),
        };
        assert!(GeminiConfig::from_settings(&settings).is_none());
    }

    #[test]
    fn api_url_targets_generate_content() {
        let provider = GeminiTextProvider::new(GeminiConfig {
            api_key: Secret::new("k".to_string()),
            model: "gemini-1.5-flash".to_string(),
            api_base: "http://localhost:9999/v1beta".to_string(),
        })
        .unwrap();
        assert_eq!(
            provider.api_url("generateContent"),
            "http://localhost:9999/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
