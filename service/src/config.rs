//! Configuration management for the door service.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use turnstile_runtime::retry::RetryPolicy;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Store runtime configuration
    pub store: StoreSettings,
    /// Retry policy for transient store failures
    pub retry: RetrySettings,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Metrics server host (for Prometheus scraping)
    pub metrics_host: String,
    /// Metrics server port
    pub metrics_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
    /// Per-request timeout in seconds
    pub request_timeout: u64,
}

/// Store runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Maximum size of the dead letter queues
    pub dlq_max_size: usize,
    /// Action broadcast channel capacity
    pub broadcast_capacity: usize,
}

/// Retry configuration for transient store failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Maximum number of retries per operation
    pub max_retries: usize,
    /// Initial backoff delay in milliseconds
    pub initial_delay_ms: u64,
    /// Backoff cap in milliseconds
    pub max_delay_ms: u64,
}

impl RetrySettings {
    /// Build the runtime retry policy from these settings
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::builder()
            .max_retries(self.max_retries)
            .initial_delay(Duration::from_millis(self.initial_delay_ms))
            .max_delay(Duration::from_millis(self.max_delay_ms))
            .build()
    }
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(8080),
                log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
                metrics_host: env::var("METRICS_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                metrics_port: env::var("METRICS_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(9090),
                shutdown_timeout: env::var("SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
                request_timeout: env::var("REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            },
            store: StoreSettings {
                dlq_max_size: env::var("DLQ_MAX_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1000),
                broadcast_capacity: env::var("BROADCAST_CAPACITY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(64),
            },
            retry: RetrySettings {
                max_retries: env::var("STORE_RETRY_MAX")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3),
                initial_delay_ms: env::var("STORE_RETRY_INITIAL_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(100),
                max_delay_ms: env::var("STORE_RETRY_MAX_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5000),
            },
        }
    }

    /// Per-request timeout as a [`Duration`]
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout)
    }

    /// Graceful shutdown timeout as a [`Duration`]
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_settings_build_a_policy() {
        let settings = RetrySettings {
            max_retries: 5,
            initial_delay_ms: 50,
            max_delay_ms: 2000,
        };
        let policy = settings.policy();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.initial_delay, Duration::from_millis(50));
        assert_eq!(policy.max_delay, Duration::from_millis(2000));
    }
}
