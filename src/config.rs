//! Readiness tuning loaded via `ortho-config`.

use std::ffi::OsString;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::readiness::{DEFAULT_POLL_INTERVAL, DEFAULT_REQUIRED_CONFIRMATIONS, ReadinessPoller};

/// Poll interval and confirmation count layered from defaults,
/// `aurora.toml` and `AURORA_*` environment variables.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "AURORA",
    discovery(
        app_name = "aurora-provision",
        env_var = "AURORA_CONFIG_PATH",
        config_file_name = "aurora.toml",
        dotfile_name = ".aurora.toml",
        project_file_name = "aurora.toml"
    )
)]
pub struct ReadinessConfig {
    /// Seconds to sleep between status samples.
    #[ortho_config(default = DEFAULT_POLL_INTERVAL.as_secs())]
    pub poll_interval_secs: u64,
    /// Consecutive `available` samples required before a resource counts as
    /// ready.
    #[ortho_config(default = DEFAULT_REQUIRED_CONFIRMATIONS)]
    pub required_confirmations: u32,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            required_confirmations: DEFAULT_REQUIRED_CONFIRMATIONS,
        }
    }
}

impl ReadinessConfig {
    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from("aurora-provision")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Rejects zero values, which would make the poller spin or never
    /// confirm readiness.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field and the
    /// environment variable that sets it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "poll_interval_secs",
                env_var: "AURORA_POLL_INTERVAL_SECS",
            });
        }
        if self.required_confirmations == 0 {
            return Err(ConfigError::Invalid {
                field: "required_confirmations",
                env_var: "AURORA_REQUIRED_CONFIRMATIONS",
            });
        }
        Ok(())
    }

    /// Builds the poller described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when validation fails.
    pub fn poller(&self) -> Result<ReadinessPoller, ConfigError> {
        self.validate()?;
        Ok(ReadinessPoller::new(
            Duration::from_secs(self.poll_interval_secs),
            self.required_confirmations,
        ))
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
    /// Raised when a value is present but unusable.
    #[error("{field} must be greater than zero: set {env_var} or {field} in aurora.toml")]
    Invalid {
        /// Field name in `aurora.toml`.
        field: &'static str,
        /// Environment variable that sets the field.
        env_var: &'static str,
    },
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
