//! Text generation provider abstraction.
//!
//! The chat handler only talks to [`TextProvider`]; Gemini is the production
//! implementation and [`mock::MockTextProvider`] stands in for it in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Provider returned no text")]
    EmptyResponse,
}

/// Result of a successful generation.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub text: String,

    /// Input tokens consumed.
    pub input_tokens: i32,

    /// Output tokens generated.
    pub output_tokens: i32,
}

/// Trait for text generation providers (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Generate a single, non-streamed response for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ProviderError>;

    /// Model identifier reported in response metadata and health output.
    fn model(&self) -> &str;

    /// Short identifier of the backing service.
    fn source(&self) -> &'static str;
}
