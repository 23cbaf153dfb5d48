#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! lnsdk CLI Configuration
//!
//! This crate provides the settings file of the `lnsdk` command line tool.
//! It handles loading, saving, and managing a TOML file that specifies:
//! - The provider environment (production or staging) and API key
//! - How a new node gets registered (invite code or partner credentials)
//! - Logging configuration
//!
//! Missing files and missing keys fall back to defaults, so a fresh install
//! works without any configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use types::{EnvironmentType, GreenlightCredentials, GreenlightNodeConfig, LevelFilter};

/// Errors that can occur when loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write a file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    /// Failed to parse the TOML configuration file
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize configuration to TOML format
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Only one of the partner certificate and key is configured
    #[error("partner_cert and partner_key must be set together")]
    IncompletePartnerCredentials,
    /// Both an invite code and partner credentials are configured
    #[error("invite_code cannot be combined with partner_cert and partner_key")]
    ConflictingRegistration,
    /// Could not locate the user's configuration directory
    #[error("Could not find user config directory")]
    ConfigDirUnavailable,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CliConfig {
    /// Provider deployment to connect to
    pub environment: EnvironmentType,
    /// API key sent to the scheduler
    pub api_key: Option<String>,
    /// Invite code used when registering a new node
    pub invite_code: Option<String>,
    /// Path of the PEM partner certificate used when registering a new node
    pub partner_cert: Option<PathBuf>,
    /// Path of the PEM partner key used when registering a new node
    pub partner_key: Option<PathBuf>,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum severity forwarded to the console
    pub level: LevelFilter,
    /// Log file path, stderr when unset
    pub file: Option<PathBuf>,
}

impl CliConfig {
    /// Load configuration from a TOML file at `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from `path`, or the defaults if the file does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::from_file(path) {
            Err(ConfigError::FileRead(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Save this configuration as a pretty-printed TOML file at `path`,
    /// creating missing parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Returns the default config file path:
    /// `{config_dir()}/lnsdk/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::ConfigDirUnavailable)?.join("lnsdk");
        Ok(config_dir.join("config.toml"))
    }

    /// Registration settings for a new node.
    ///
    /// Reads the partner certificate and key files when both are configured.
    /// A new node registers either with an invite code or with partner
    /// credentials, so configuring both is an error.
    pub fn node_config(&self) -> Result<GreenlightNodeConfig, ConfigError> {
        if self.invite_code.is_some() && (self.partner_cert.is_some() || self.partner_key.is_some()) {
            return Err(ConfigError::ConflictingRegistration);
        }
        let partner_credentials = match (&self.partner_cert, &self.partner_key) {
            (Some(cert), Some(key)) => Some(GreenlightCredentials {
                device_cert: std::fs::read(cert)?,
                device_key: std::fs::read(key)?,
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompletePartnerCredentials),
        };

        Ok(GreenlightNodeConfig { partner_credentials, invite_code: self.invite_code.clone() })
    }
}
