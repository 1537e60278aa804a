//! Config loading, validation, and utility operations.

use super::model::Config;
use crate::error::{LockfileError, Result};
use std::path::Path;
use std::time::Duration;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(LockfileError::UserError)` - Read error, parse error, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            LockfileError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml).map_err(|e| {
            LockfileError::UserError(format!("failed to parse config YAML: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            LockfileError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `lock_timeout_secs`, when set, must be positive
    /// - `action` must be non-empty
    pub fn validate(&self) -> Result<()> {
        if self.lock_timeout_secs == Some(0) {
            return Err(LockfileError::UserError(
                "config validation failed: lock_timeout_secs must be greater than 0 (omit it to wait forever)"
                    .to_string(),
            ));
        }

        if self.action.trim().is_empty() {
            return Err(LockfileError::UserError(
                "config validation failed: action must be non-empty".to_string(),
            ));
        }

        Ok(())
    }

    /// The lock wait deadline, if one is configured.
    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_secs.map(Duration::from_secs)
    }
}
