use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Gemini API base URL.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Browser origins allowed to call the API.
pub const ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "https://asistente-renta.vercel.app",
];

#[derive(Debug, Clone)]
pub struct TaxAssistantConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub gemini: GeminiSettings,
    pub security: SecurityConfig,
}

/// Runtime mode. Only `Development` exposes internal error details.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            _ => Environment::Production,
        }
    }

    pub fn exposes_error_details(self) -> bool {
        self == Environment::Development
    }
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    /// Absent when `GEMINI_API_KEY` is unset or blank; chat requests then
    /// fail with a configuration error instead of calling the provider.
    pub api_key: Option<Secret<String>>,
    pub model: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_origins: ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

impl TaxAssistantConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Ok(Self::from_env(common_config))
    }

    /// Builds the service configuration from process environment variables
    /// on top of an already loaded base config.
    pub fn from_env(common: core_config::Config) -> Self {
        TaxAssistantConfig {
            common,
            environment: optional_env("ENVIRONMENT")
                .map(|v| Environment::parse(&v))
                .unwrap_or_default(),
            gemini: GeminiSettings {
                api_key: optional_env("GEMINI_API_KEY").map(Secret::new),
                model: env_or("GEMINI_MODEL", DEFAULT_MODEL),
                api_base: env_or("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
            },
            security: SecurityConfig::default(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.gemini.api_key.is_some()
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}
