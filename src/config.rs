//! Configuration Module
//!
//! Handles loading engine configuration from environment variables.

use std::env;

use chrono::Duration;

use crate::cache::DEFAULT_SWEEP_INTERVAL_MS;

/// Engine configuration parameters.
///
/// Carries connection settings for remote engines plus the behaviour knobs of
/// the in-process store. All values can be configured via environment
/// variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Address of a remote engine
    pub server_address: String,
    /// Port of a remote engine
    pub server_port: u16,
    /// Connect timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Per-operation timeout in milliseconds
    pub operation_timeout_ms: u64,
    /// Engine specific option string, passed through untouched
    pub engine_options: String,
    /// Minimum interval between two expiry sweeps in milliseconds
    pub sweep_interval_ms: u64,
    /// Compression strategy name (`none`, `gzip` or `deflate`)
    pub compression: String,
}

impl EngineConfig {
    /// Creates a new EngineConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_SERVER` - Engine address (default: localhost)
    /// - `CACHE_PORT` - Engine port (default: 6379)
    /// - `CACHE_CONNECT_TIMEOUT_MS` - Connect timeout (default: 5000)
    /// - `CACHE_OPERATION_TIMEOUT_MS` - Operation timeout (default: 1000)
    /// - `CACHE_ENGINE_OPTIONS` - Engine specific options (default: empty)
    /// - `CACHE_SWEEP_INTERVAL_MS` - Expiry sweep throttle (default: 500)
    /// - `CACHE_COMPRESSION` - Compression strategy (default: none)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_address: env::var("CACHE_SERVER").unwrap_or(defaults.server_address),
            server_port: parse_var("CACHE_PORT").unwrap_or(defaults.server_port),
            connect_timeout_ms: parse_var("CACHE_CONNECT_TIMEOUT_MS")
                .unwrap_or(defaults.connect_timeout_ms),
            operation_timeout_ms: parse_var("CACHE_OPERATION_TIMEOUT_MS")
                .unwrap_or(defaults.operation_timeout_ms),
            engine_options: env::var("CACHE_ENGINE_OPTIONS").unwrap_or(defaults.engine_options),
            sweep_interval_ms: parse_var("CACHE_SWEEP_INTERVAL_MS")
                .unwrap_or(defaults.sweep_interval_ms),
            compression: env::var("CACHE_COMPRESSION").unwrap_or(defaults.compression),
        }
    }

    /// Sweep throttle as a duration, saturating for out-of-range values.
    pub fn sweep_interval(&self) -> Duration {
        Duration::milliseconds(i64::try_from(self.sweep_interval_ms).unwrap_or(i64::MAX))
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server_address: "localhost".to_string(),
            server_port: 6379,
            connect_timeout_ms: 5000,
            operation_timeout_ms: 1000,
            engine_options: String::new(),
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
            compression: "none".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.server_address, "localhost");
        assert_eq!(config.server_port, 6379);
        assert_eq!(config.sweep_interval_ms, 500);
        assert_eq!(config.compression, "none");
        assert!(config.engine_options.is_empty());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_SERVER");
        env::remove_var("CACHE_PORT");
        env::remove_var("CACHE_SWEEP_INTERVAL_MS");
        env::remove_var("CACHE_COMPRESSION");

        let config = EngineConfig::from_env();
        assert_eq!(config.server_address, "localhost");
        assert_eq!(config.server_port, 6379);
        assert_eq!(config.sweep_interval_ms, 500);
        assert_eq!(config.compression, "none");
    }

    #[test]
    fn test_sweep_interval_duration() {
        let config = EngineConfig {
            sweep_interval_ms: 250,
            ..EngineConfig::default()
        };
        assert_eq!(config.sweep_interval(), Duration::milliseconds(250));
    }

    #[test]
    fn test_sweep_interval_saturates() {
        let config = EngineConfig {
            sweep_interval_ms: u64::MAX,
            ..EngineConfig::default()
        };
        assert_eq!(config.sweep_interval(), Duration::milliseconds(i64::MAX));
        assert!(config.sweep_interval() > Duration::zero());
    }
}
