//! Server configuration (environment variables with defaults).

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DEPOSIT_ADDR: &str = "localhost:9000";
pub const DEFAULT_WITHDRAW_ADDR: &str = "localhost:9001";
pub const DEFAULT_HEARTBEAT_MS: u64 = 1000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{key} must not be empty")]
    Empty { key: &'static str },
}

/// Endpoint addresses and pipeline timing.
///
/// Addresses stay unresolved strings (`host:port`) and are resolved when the
/// endpoint binds, so `localhost` works the same way for every transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub http_addr: String,
    pub deposit_addr: String,
    pub withdraw_addr: String,
    /// `None` disables the heartbeat.
    pub heartbeat: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            deposit_addr: DEFAULT_DEPOSIT_ADDR.to_string(),
            withdraw_addr: DEFAULT_WITHDRAW_ADDR.to_string(),
            heartbeat: Some(Duration::from_millis(DEFAULT_HEARTBEAT_MS)),
        }
    }
}

impl ServerConfig {
    /// Read `DONATION_HTTP_ADDR`, `DONATION_DEPOSIT_ADDR`,
    /// `DONATION_WITHDRAW_ADDR` and `DONATION_HEARTBEAT_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let addr = |key: &'static str, default: String| -> Result<String, ConfigError> {
            match lookup(key) {
                None => Ok(default),
                Some(v) if v.trim().is_empty() => Err(ConfigError::Empty { key }),
                Some(v) => Ok(v.trim().to_string()),
            }
        };

        let heartbeat = match lookup("DONATION_HEARTBEAT_MS") {
            None => defaults.heartbeat,
            Some(raw) => {
                let ms: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::InvalidValue {
                        key: "DONATION_HEARTBEAT_MS",
                        value: raw.clone(),
                        reason: e.to_string(),
                    }
                })?;
                (ms > 0).then(|| Duration::from_millis(ms))
            }
        };

        Ok(Self {
            http_addr: addr("DONATION_HTTP_ADDR", defaults.http_addr)?,
            deposit_addr: addr("DONATION_DEPOSIT_ADDR", defaults.deposit_addr)?,
            withdraw_addr: addr("DONATION_WITHDRAW_ADDR", defaults.withdraw_addr)?,
            heartbeat,
        })
    }

    /// Every endpoint on an ephemeral loopback port (tests).
    pub fn ephemeral() -> Self {
        Self {
            http_addr: "127.0.0.1:0".to_string(),
            deposit_addr: "127.0.0.1:0".to_string(),
            withdraw_addr: "127.0.0.1:0".to_string(),
            ..Self::default()
        }
    }

    pub fn with_http_addr(mut self, addr: impl Into<String>) -> Self {
        self.http_addr = addr.into();
        self
    }

    pub fn with_deposit_addr(mut self, addr: impl Into<String>) -> Self {
        self.deposit_addr = addr.into();
        self
    }

    pub fn with_withdraw_addr(mut self, addr: impl Into<String>) -> Self {
        self.withdraw_addr = addr.into();
        self
    }

    pub fn with_heartbeat(mut self, heartbeat: Option<Duration>) -> Self {
        self.heartbeat = heartbeat;
        self
    }
}
