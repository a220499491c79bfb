//! Application startup and lifecycle management.
//!
//! Builds the shared state once, wires the router with the middleware stack
//! and runs the HTTP server until a shutdown signal arrives.

use crate::config::TaxAssistantConfig;
use crate::error::ChatError;
use crate::handlers::{
    chat::send_message,
    fallback::not_found,
    health::{api_health, health_check, root},
};
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::TextProvider;
use crate::services::InstructionTemplate;
use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request},
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    security_headers::security_headers_middleware,
    tracing::{http_request_span, request_id_middleware},
};
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state. Everything in it is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<TaxAssistantConfig>,
    pub template: Arc<InstructionTemplate>,
    /// `None` when no API key is configured.
    pub text_provider: Option<Arc<dyn TextProvider>>,
}

impl AppState {
    pub fn new(config: TaxAssistantConfig, text_provider: Option<Arc<dyn TextProvider>>) -> Self {
        Self {
            config: Arc::new(config),
            template: Arc::new(InstructionTemplate::new()),
            text_provider,
        }
    }

    /// Builds the state with a Gemini provider when an API key is present.
    pub fn from_config(config: TaxAssistantConfig) -> Result<Self, AppError> {
        let text_provider: Option<Arc<dyn TextProvider>> =
            match GeminiConfig::from_settings(&config.gemini) {
                Some(gemini_config) => {
                    let provider = GeminiTextProvider::new(gemini_config)
                        .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;
                    tracing::info!(
                        model = %config.gemini.model,
                        "Initialized Gemini text provider"
                    );
                    Some(Arc::new(provider))
                }
                None => {
                    tracing::warn!(
                        "GEMINI_API_KEY is not set; chat requests will fail with a configuration error"
                    );
                    None
                }
            };

        Ok(Self::new(config, text_provider))
    }

    /// Model chat requests are sent to.
    pub fn model(&self) -> &str {
        self.text_provider
            .as_ref()
            .map(|p| p.model())
            .unwrap_or(self.config.gemini.model.as_str())
    }
}

/// Builds the router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let allowed_origins = state
        .config
        .security
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e);
                None
            }
        })
        .collect::<Vec<HeaderValue>>();

    let expose_details = state.config.environment.exposes_error_details();

    Router::new()
        .route("/", get(root).fallback(not_found))
        .route("/health", get(health_check).fallback(not_found))
        .route("/api/health", get(api_health).fallback(not_found))
        .route("/api/chat/message", post(send_message).fallback(not_found))
        .fallback(not_found)
        .with_state(state)
        // Contain handler panics to the request that raised them
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
            panic_response(panic, expose_details)
        }))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| http_request_span(request)),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
}

fn panic_response(panic: Box<dyn Any + Send + 'static>, expose_details: bool) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());

    tracing::error!(panic = %message, "Request handler panicked");

    ChatError::unexpected(expose_details.then_some(message)).into_response()
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: TaxAssistantConfig) -> Result<Self, AppError> {
        let port = config.common.port;
        let state = AppState::from_config(config)?;
        Self::with_state(state, port).await
    }

    /// Bind a listener for an already assembled state (port 0 = random port
    /// for testing).
    pub async fn with_state(state: AppState, port: u16) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            environment = ?state.config.environment,
            "Tax assistant service listening"
        );

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
