use anyhow::{Context, Result};

use crate::admission::{RateLimit, RateLimits};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub anthropic_api_key: String,
    /// Caching/metering proxy in front of the model provider. Direct when unset.
    pub llm_gateway_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub rate_limits: RateLimits,
    /// Reverse proxies in front of the service. 0 means `x-forwarded-for` is ignored.
    pub trusted_proxy_hops: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = RateLimits::default();
        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            llm_gateway_url: std::env::var("LLM_GATEWAY_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            rate_limits: RateLimits {
                ip: RateLimit::per_minute(optional_limit(
                    "RATE_LIMIT_IP_PER_MINUTE",
                    defaults.ip.max_requests,
                )?),
                generate: RateLimit::per_hour(optional_limit(
                    "RATE_LIMIT_GENERATE_PER_HOUR",
                    defaults.generate.max_requests,
                )?),
                analyze: RateLimit::per_hour(optional_limit(
                    "RATE_LIMIT_ANALYZE_PER_HOUR",
                    defaults.analyze.max_requests,
                )?),
            },
            trusted_proxy_hops: std::env::var("TRUSTED_PROXY_HOPS")
                .unwrap_or_else(|_| "0".to_string())
                .trim()
                .parse::<usize>()
                .context("TRUSTED_PROXY_HOPS must be a non-negative integer")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_limit(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(raw) => parse_limit(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_limit(key: &str, raw: &str) -> Result<u64> {
    let value = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("{key} must be a positive integer, got '{raw}'"))?;
    anyhow::ensure!(value > 0, "{key} must be greater than zero");
    Ok(value)
}
