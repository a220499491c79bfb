//! service-core: Shared infrastructure for the tax assistant services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
