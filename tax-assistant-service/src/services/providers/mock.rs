//! Mock provider for testing.

use super::{ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// How the mock answers every call.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Respond with this text.
    Reply(String),
    /// Respond with `"Mock response for: {prompt}"`.
    Echo,
    InvalidApiKey,
    QuotaExceeded,
    /// Fail with `ProviderError::ApiError(message)`.
    ApiError(String),
    Panic,
}

/// Mock text provider that records the prompts it receives.
pub struct MockTextProvider {
    model: String,
    behavior: MockBehavior,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockTextProvider {
    pub fn new(model: impl Into<String>, behavior: MockBehavior) -> Self {
        Self {
            model: model.into(),
            behavior,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }

        let text = match &self.behavior {
            MockBehavior::Reply(text) => text.clone(),
            MockBehavior::Echo => format!("Mock response for: {}", prompt),
            MockBehavior::InvalidApiKey => {
                return Err(ProviderError::InvalidApiKey(
                    "API key not valid. Please pass a valid API key.".to_string(),
                ))
            }
            MockBehavior::QuotaExceeded => {
                return Err(ProviderError::QuotaExceeded(
                    "Resource has been exhausted (e.g. check quota).".to_string(),
                ))
            }
            MockBehavior::ApiError(message) => {
                return Err(ProviderError::ApiError(message.clone()))
            }
            MockBehavior::Panic => panic!("mock provider panicked"),
        };

        Ok(ProviderResponse {
            input_tokens: prompt.len() as i32 / 4,
            output_tokens: text.len() as i32 / 4,
            text,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn source(&self) -> &'static str {
        "mock"
    }
}
