use std::str::FromStr;

use anyhow::{Context, Result};

use crate::coaching::registry::DEFAULT_POLL_INTERVAL;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Seconds between coaching poll iterations (default 15).
    pub coach_poll_interval_secs: u64,
    /// Upper bound on the PostgreSQL connection pool (default 10).
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: env_parse("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            coach_poll_interval_secs: env_parse(
                "COACH_POLL_INTERVAL_SECS",
                DEFAULT_POLL_INTERVAL.as_secs(),
            )?,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", 10)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Parses an optional env var, falling back to `default` when unset.
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parse_defaults_when_unset() {
        let value: u32 = env_parse("SALESCOACH_TEST_UNSET_KEY", 10).unwrap();
        assert_eq!(value, 10);
    }

    #[test]
    fn test_env_parse_reads_and_rejects() {
        std::env::set_var("SALESCOACH_TEST_POOL_SIZE", "25");
        let value: u32 = env_parse("SALESCOACH_TEST_POOL_SIZE", 10).unwrap();
        assert_eq!(value, 25);

        std::env::set_var("SALESCOACH_TEST_POOL_SIZE", "not-a-number");
        assert!(env_parse::<u32>("SALESCOACH_TEST_POOL_SIZE", 10).is_err());
        std::env::remove_var("SALESCOACH_TEST_POOL_SIZE");
    }
}
