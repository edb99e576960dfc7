//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use anyhow::Context;

use defender_core::GovernorConfig;
use defender_core::domain::QuotaPolicy;
use defender_core::governance::{CorsConfig, FailurePolicy};
use defender_infra::DatabaseConfig;

#[cfg(feature = "redis")]
use defender_infra::RedisConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Origin used for Link targets instead of the request's own host.
    pub public_base_url: Option<String>,
    /// Meter anonymous clients by `Forwarded`/`X-Forwarded-For` instead of
    /// the socket peer. Only safe behind a proxy that overwrites them.
    pub trust_forwarded_for: bool,
    pub database: Option<DatabaseConfig>,
    #[cfg(feature = "redis")]
    pub redis: Option<RedisConfig>,
    pub governor: GovernorConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = GovernorConfig::default();

        let failure_policy = match env::var("RATE_LIMIT_FAIL_POLICY") {
            Ok(raw) => FailurePolicy::from_str(&raw).map_err(anyhow::Error::msg)?,
            Err(_) => defaults.failure_policy,
        };

        let governor = GovernorConfig {
            namespace: env::var("RATE_LIMIT_NAMESPACE").unwrap_or(defaults.namespace),
            quotas: QuotaPolicy {
                anonymous: parse_or("RATE_LIMIT_ANONYMOUS", defaults.quotas.anonymous)?,
                authenticated: parse_or(
                    "RATE_LIMIT_AUTHENTICATED",
                    defaults.quotas.authenticated,
                )?,
            },
            failure_policy,
            per_page: parse_or("PER_PAGE", defaults.per_page)?,
            cors: CorsConfig {
                allow_methods: list_or("CORS_ALLOW_METHODS", defaults.cors.allow_methods),
                allow_headers: defaults.cors.allow_headers,
                expose_headers: list_or("CORS_EXPOSE_HEADERS", defaults.cors.expose_headers),
                max_age_secs: parse_or("CORS_MAX_AGE_SECS", defaults.cors.max_age_secs)?,
            },
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 8080)?,
            public_base_url: env::var("PUBLIC_BASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            trust_forwarded_for: parse_or("TRUST_FORWARDED_FOR", false)?,
            database: DatabaseConfig::from_env(),
            #[cfg(feature = "redis")]
            redis: env::var("REDIS_URL").ok().map(|_| RedisConfig::from_env()),
            governor,
        })
    }
}

fn parse_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {name}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

/// Comma-separated list, falling back to `default` when unset or empty.
fn list_or(name: &str, default: Vec<String>) -> Vec<String> {
    let items: Vec<String> = env::var(name)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect();

    if items.is_empty() { default } else { items }
}
