//! Process configuration read from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use cashbook_observability::{LogFormat, LogSettings};

pub const BIND_ADDR_VAR: &str = "CASHBOOK_BIND_ADDR";
pub const LOG_FORMAT_VAR: &str = "CASHBOOK_LOG_FORMAT";
pub const LOG_FILTER_VAR: &str = "CASHBOOK_LOG_FILTER";
pub const STREAM_POLL_MS_VAR: &str = "CASHBOOK_STREAM_POLL_MS";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_STREAM_POLL_MS: u64 = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid socket address '{value}'")]
    BindAddr { var: &'static str, value: String },

    #[error("{var}: {message}")]
    LogFormat { var: &'static str, message: String },

    #[error("{var}: must not be empty")]
    EmptyFilter { var: &'static str },

    #[error("{var}: expected a positive number of milliseconds, got '{value}'")]
    StreamPoll { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub log: LogSettings,
    /// How long the ledger stream blocks on its subscription between checks.
    pub stream_poll: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log: LogSettings::default(),
            stream_poll: Duration::from_millis(DEFAULT_STREAM_POLL_MS),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source. Unset variables take defaults;
    /// set-but-invalid ones are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_addr = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::BindAddr {
                var: BIND_ADDR_VAR,
                value: raw_addr.clone(),
            })?;

        let format = match lookup(LOG_FORMAT_VAR) {
            Some(raw) => raw.parse::<LogFormat>().map_err(|e| ConfigError::LogFormat {
                var: LOG_FORMAT_VAR,
                message: e.to_string(),
            })?,
            None => LogFormat::default(),
        };

        let default_filter = match lookup(LOG_FILTER_VAR) {
            Some(raw) if raw.trim().is_empty() => {
                return Err(ConfigError::EmptyFilter { var: LOG_FILTER_VAR });
            }
            Some(raw) => raw.trim().to_string(),
            None => LogSettings::default().default_filter,
        };

        let stream_poll = match lookup(STREAM_POLL_MS_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    return Err(ConfigError::StreamPoll {
                        var: STREAM_POLL_MS_VAR,
                        value: raw,
                    });
                }
            },
            None => Duration::from_millis(DEFAULT_STREAM_POLL_MS),
        };

        Ok(Self {
            bind_addr,
            log: LogSettings {
                format,
                default_filter,
            },
            stream_poll,
        })
    }
}
