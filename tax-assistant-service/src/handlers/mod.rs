//! HTTP handlers for the tax assistant service.

pub mod chat;
pub mod fallback;
pub mod health;

/// Every registered route, as reported by `/` and the 404 fallback.
pub const AVAILABLE_ROUTES: &[&str] = &[
    "GET /",
    "GET /health",
    "GET /api/health",
    "POST /api/chat/message",
];
