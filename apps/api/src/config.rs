use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub s3_region: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub openai_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Upper bound for one render or preview generation.
    pub preview_timeout: Duration,
    /// Preview sessions untouched for this long are swept.
    pub preview_idle_ttl: Duration,
    /// Live preview sessions before the least recently used is evicted (0 = unlimited).
    pub preview_max_sessions: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let preview_timeout_secs = std::env::var("PREVIEW_TIMEOUT_SECS")
            .unwrap_or_else(|_| "15".to_string())
            .parse::<u64>()
            .context("PREVIEW_TIMEOUT_SECS must be a whole number of seconds")?;

        let preview_idle_ttl_secs = std::env::var("PREVIEW_IDLE_TTL_SECS")
            .unwrap_or_else(|_| "1800".to_string())
            .parse::<u64>()
            .context("PREVIEW_IDLE_TTL_SECS must be a whole number of seconds")?;

        Ok(Config {
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            s3_region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            preview_timeout: Duration::from_secs(preview_timeout_secs),
            preview_idle_ttl: Duration::from_secs(preview_idle_ttl_secs),
            preview_max_sessions: std::env::var("PREVIEW_MAX_SESSIONS")
                .unwrap_or_else(|_| "256".to_string())
                .parse::<usize>()
                .context("PREVIEW_MAX_SESSIONS must be a whole number")?,
        })
    }

    /// Values used by handler tests; never talks to a real backend.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            s3_bucket: "resumes".to_string(),
            s3_endpoint: "http://localhost:9000".to_string(),
            s3_region: "us-east-1".to_string(),
            aws_access_key_id: "test".to_string(),
            aws_secret_access_key: "test".to_string(),
            openai_api_key: "test".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            preview_timeout: Duration::from_secs(10),
            preview_idle_ttl: Duration::from_secs(1800),
            preview_max_sessions: 256,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
