use jejuqa_core::adoption::{AdoptionPolicy, DEFAULT_BADGE_BONUS, DEFAULT_BASE_POINTS};
use jejuqa_core::badges::queue::DEFAULT_QUEUE_CAPACITY;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long background tasks get to drain after the server stops
    /// (default: `30`).
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
    /// Points paid on adoption.
    pub adoption: AdoptionPolicy,
    /// Pending post-adoption badge checks before new ones are dropped.
    pub badge_queue_capacity: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    /// | `ADOPTION_BASE_POINTS`  | `50`                    |
    /// | `ADOPTION_BADGE_BONUS`  | `25`                    |
    /// | `BADGE_QUEUE_CAPACITY`  | `1024`                  |
    ///
    /// JWT settings are read by [`JwtConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on unparsable values and on an adoption policy that pays
    /// nothing or a negative bonus; misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            host,
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            jwt: JwtConfig::from_env(),
            adoption: checked_policy(AdoptionPolicy {
                base_points: env_or("ADOPTION_BASE_POINTS", DEFAULT_BASE_POINTS),
                badge_bonus: env_or("ADOPTION_BADGE_BONUS", DEFAULT_BADGE_BONUS),
            }),
            badge_queue_capacity: env_or("BADGE_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY),
        }
    }
}

/// Parse `key` from the environment, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{key} must be a valid value, got '{raw}': {e}")),
        Err(_) => default,
    }
}

/// Reject adoption amounts the point ledger cannot pay.
fn checked_policy(policy: AdoptionPolicy) -> AdoptionPolicy {
    if let Err(e) = policy.validate() {
        panic!("ADOPTION_BASE_POINTS / ADOPTION_BADGE_BONUS are invalid: {e}");
    }
    policy
}
