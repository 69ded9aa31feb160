//! Map configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, TimeoutMapError};

/// Configuration for a `TimeoutMap`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutMapConfig {
    /// Lifetime of every entry, in milliseconds
    pub timeout_ms: u64,
    /// Whether mutating calls drop expired entries
    pub sweep_on_write: bool,
    /// Entries to preallocate
    pub initial_capacity: usize,
}

impl Default for TimeoutMapConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            sweep_on_write: DEFAULT_SWEEP_ON_WRITE,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

impl TimeoutMapConfig {
    /// Default configuration with the given timeout.
    pub fn with_timeout_ms(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            ..Self::default()
        }
    }

    /// Reads the configuration from the environment (and `.env`, if present).
    ///
    /// Unset variables fall back to the defaults; malformed ones are errors.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        let config = Self {
            timeout_ms: parse_env(ENV_TIMEOUT_MS, defaults.timeout_ms)?,
            sweep_on_write: parse_bool_env(ENV_SWEEP_ON_WRITE, defaults.sweep_on_write)?,
            initial_capacity: parse_env(ENV_INITIAL_CAPACITY, defaults.initial_capacity)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the timeout is positive.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(TimeoutMapError::InvalidArgument(
                "timeout must be positive, got 0 ms".into(),
            ));
        }
        Ok(())
    }

    /// The timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            TimeoutMapError::ConfigError(format!("{name} is not a valid number: {raw:?}"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_bool_env(name: &str, default: bool) -> Result<bool> {
    let Ok(raw) = std::env::var(name) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(TimeoutMapError::ConfigError(format!(
            "{name} is not a valid boolean: {raw:?}"
        ))),
    }
}
