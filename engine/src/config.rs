//! Configuration for PUTKI

use crate::error::{EngineError, Result};
use std::env;
use std::time::Duration;

/// Engine tuning knobs, loadable from `PUTKI_*` environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Per-edge delivery channel capacity (deliveries queued per consumer)
    pub channel_capacity: usize,

    /// Upper bound on one poll call; `None` trusts the plugin
    pub poll_timeout: Option<Duration>,

    /// Upper bound on one push call; `None` trusts the plugin
    pub push_timeout: Option<Duration>,

    /// Consecutive poll failures before a producer is retired; `0` never
    /// retires
    pub max_consecutive_failures: u32,

    /// Log level
    pub log_level: String,

    /// Log format (json or pretty)
    pub log_format: LogFormat,
}

/// How the tracing subscriber renders events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Machine-readable JSON lines
    Json,
    /// Human-readable console output
    Pretty,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            poll_timeout: Some(Duration::from_secs(30)),
            push_timeout: Some(Duration::from_secs(30)),
            max_consecutive_failures: 10,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset variables keep their defaults. A timeout of `0` disables
    /// that timeout.
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(cap) = env::var("PUTKI_CHANNEL_CAPACITY") {
            config.channel_capacity = cap
                .parse::<usize>()
                .ok()
                .filter(|c| *c > 0)
                .ok_or_else(|| {
                    EngineError::Config(format!(
                        "invalid PUTKI_CHANNEL_CAPACITY: {cap} (expected positive integer)"
                    ))
                })?;
        }

        if let Ok(ms) = env::var("PUTKI_POLL_TIMEOUT_MS") {
            config.poll_timeout = parse_timeout_ms("PUTKI_POLL_TIMEOUT_MS", &ms)?;
        }

        if let Ok(ms) = env::var("PUTKI_PUSH_TIMEOUT_MS") {
            config.push_timeout = parse_timeout_ms("PUTKI_PUSH_TIMEOUT_MS", &ms)?;
        }

        if let Ok(max) = env::var("PUTKI_MAX_CONSECUTIVE_FAILURES") {
            config.max_consecutive_failures = max.parse().map_err(|e| {
                EngineError::Config(format!("invalid PUTKI_MAX_CONSECUTIVE_FAILURES: {e}"))
            })?;
        }

        if let Ok(level) = env::var("PUTKI_LOG_LEVEL") {
            config.log_level = level;
        }

        if let Ok(format) = env::var("PUTKI_LOG_FORMAT") {
            config.log_format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                other => {
                    return Err(EngineError::Config(format!(
                        "invalid PUTKI_LOG_FORMAT: {other} (expected 'json' or 'pretty')"
                    )))
                }
            };
        }

        Ok(config)
    }
}

fn parse_timeout_ms(var: &str, value: &str) -> Result<Option<Duration>> {
    let ms: u64 = value
        .parse()
        .map_err(|e| EngineError::Config(format!("invalid {var}: {e}")))?;
    Ok(if ms == 0 {
        None
    } else {
        Some(Duration::from_millis(ms))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.channel_capacity, 256);
        assert_eq!(config.poll_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.max_consecutive_failures, 10);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_zero_timeout_disables() {
        assert_eq!(parse_timeout_ms("X", "0").unwrap(), None);
        assert_eq!(
            parse_timeout_ms("X", "1500").unwrap(),
            Some(Duration::from_millis(1500))
        );
        assert!(parse_timeout_ms("X", "soon").is_err());
    }
}
