use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use serde_json::Value;

use crate::error::ChatError;
use crate::models::{ChatRequest, ChatResponse};
use crate::startup::AppState;

/// `POST /api/chat/message`
///
/// Validates the body, composes the prompt and makes exactly one provider
/// call. Every failure is converted to a [`ChatError`] here.
pub async fn send_message(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatError> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected unreadable chat body");
        ChatError::missing_message()
    })?;

    let request = ChatRequest::from_json(&body, Utc::now()).map_err(|e| {
        tracing::warn!("Rejected chat request without a text message");
        e
    })?;

    tracing::info!(
        message_len = request.message.chars().count(),
        timezone = %request.user_context.timezone,
        "Received chat message"
    );

    let provider = state.text_provider.as_ref().ok_or_else(|| {
        tracing::error!("GEMINI_API_KEY is not configured; refusing chat request");
        ChatError::not_configured()
    })?;

    let prompt = state
        .template
        .compose(&request.user_context, &request.message);

    match provider.generate(&prompt).await {
        Ok(generated) => {
            tracing::info!(
                model = %provider.model(),
                input_tokens = generated.input_tokens,
                output_tokens = generated.output_tokens,
                response_len = generated.text.len(),
                "Generated chat response"
            );

            Ok(Json(ChatResponse::new(
                generated.text,
                provider.source(),
                provider.model(),
                Utc::now(),
            )))
        }
        Err(e) => {
            tracing::error!(error = %e, model = %provider.model(), "Provider call failed");
            let err = ChatError::from_provider(e, state.config.environment);
            tracing::warn!(kind = err.kind(), status = %err.status_code(), "Chat request failed");
            Err(err)
        }
    }
}
