use anyhow::{Context, Result};

use crate::llm_client::ProviderKind;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub ai_provider: ProviderKind,
    pub llm_api_key: String,
    pub role_catalog_path: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let ai_provider: ProviderKind = require_env("AI_PROVIDER")?
            .parse()
            .map_err(anyhow::Error::msg)?;

        // Only the selected provider's key is required.
        let llm_api_key = match ai_provider {
            ProviderKind::Gemini => require_env("GOOGLE_API_KEY")?,
            ProviderKind::Claude => require_env("ANTHROPIC_API_KEY")?,
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            ai_provider,
            llm_api_key,
            role_catalog_path: std::env::var("ROLE_CATALOG_PATH").ok(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
