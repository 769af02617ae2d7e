// src/config/mod.rs
// Runtime tunables, loaded once from the environment.

use std::str::FromStr;
use std::time::Duration;

use once_cell::sync::Lazy;

pub static CONFIG: Lazy<CourierConfig> = Lazy::new(|| {
    dotenvy::dotenv().ok();
    CourierConfig::from_env()
});

#[derive(Debug, Clone)]
pub struct CourierConfig {
    /// Total attempts for gate checks and store queries.
    pub retry_max_attempts: u32,
    /// Fixed backoff between retry attempts, in milliseconds.
    pub retry_delay_ms: u64,
    /// Hard cap on one accessor subprocess run, in seconds.
    pub query_timeout_secs: u64,
    pub read_default_limit: u32,
    pub recent_default_limit: u32,
}

impl CourierConfig {
    fn from_env() -> Self {
        Self {
            retry_max_attempts: env_or("COURIER_RETRY_MAX_ATTEMPTS", 3),
            retry_delay_ms: env_or("COURIER_RETRY_DELAY_MS", 1000),
            query_timeout_secs: env_or("COURIER_QUERY_TIMEOUT_SECS", 30),
            read_default_limit: env_or("COURIER_READ_DEFAULT_LIMIT", 10),
            recent_default_limit: env_or("COURIER_RECENT_DEFAULT_LIMIT", 20),
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
