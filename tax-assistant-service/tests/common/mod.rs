//! Shared helpers for tax-assistant-service integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use secrecy::Secret;
use serde_json::Value;
use service_core::config::Config;
use std::sync::Arc;
use tax_assistant_service::config::{
    Environment, GeminiSettings, SecurityConfig, TaxAssistantConfig, DEFAULT_GEMINI_API_BASE,
    DEFAULT_MODEL,
};
use tax_assistant_service::services::providers::mock::{MockBehavior, MockTextProvider};
use tax_assistant_service::services::providers::TextProvider;
use tax_assistant_service::startup::build_router;
use tax_assistant_service::AppState;
use tower::ServiceExt;

pub const TEST_API_KEY: &str = "test-api-key";

pub fn test_config(environment: Environment, api_key: Option<&str>) -> TaxAssistantConfig {
    TaxAssistantConfig {
        common: Config::default(),
        environment,
        gemini: GeminiSettings {
            api_key: api_key.map(|k| Secret::new(k.to_string())),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
        },
        security: SecurityConfig::default(),
    }
}

/// State backed by a mock provider; the mock is returned for assertions.
pub fn mock_state(
    behavior: MockBehavior,
    environment: Environment,
) -> (AppState, Arc<MockTextProvider>) {
    let mock = Arc::new(MockTextProvider::new(DEFAULT_MODEL, behavior));
    let provider: Arc<dyn TextProvider> = mock.clone();
    let state = AppState::new(
        test_config(environment, Some(TEST_API_KEY)),
        Some(provider),
    );
    (state, mock)
}

/// State with no API key, as when `GEMINI_API_KEY` is unset.
pub fn unconfigured_state() -> AppState {
    AppState::new(test_config(Environment::Production, None), None)
}

pub fn mock_router(behavior: MockBehavior) -> (Router, Arc<MockTextProvider>) {
    let (state, mock) = mock_state(behavior, Environment::Production);
    (build_router(state), mock)
}

pub fn post_chat(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat/message")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Sends one request through the router and decodes the JSON body
/// (`Value::Null` when the body is not JSON).
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
