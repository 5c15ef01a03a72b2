//! JSON config file adapter.
//!
//! Implements [`ConfigPort`] by reading a [`TelemetryConfig`] document from
//! disk. The path comes from `SEATLINK_CONFIG`; when the variable is unset
//! the adapter reports [`ConfigError::NotFound`] and the caller runs on
//! defaults. Missing fields take their defaults; every load is validated.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::info;

use crate::app::ports::ConfigPort;
use crate::config::TelemetryConfig;
use crate::error::ConfigError;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SEATLINK_CONFIG";

pub struct JsonConfigFile {
    path: Option<PathBuf>,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Path from [`CONFIG_ENV`], if set and non-empty.
    pub fn from_env() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        Self { path }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Parse and validate a config document.
pub fn parse_config(text: &str) -> Result<TelemetryConfig, ConfigError> {
    let cfg: TelemetryConfig =
        serde_json::from_str(text).map_err(|e| ConfigError::Corrupted(e.to_string()))?;
    cfg.validate()?;
    Ok(cfg)
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<TelemetryConfig, ConfigError> {
        let path = self.path.as_deref().ok_or(ConfigError::NotFound)?;
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::Io(format!("{}: {e}", path.display())),
        })?;
        let cfg = parse_config(&text)?;
        info!("CONFIG | loaded {}", path.display());
        Ok(cfg)
    }
}
