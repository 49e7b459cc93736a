//! Global Configuration (~/.framekit/config.toml)
//!
//! Handles user-level configuration stored in `~/.framekit/config.toml`.

use crate::engine::{EngineVersion, FrameApi};
use crate::project::{MembersConfig, OutputConfig};
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global user configuration from ~/.framekit/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Synthetic member names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<MembersConfig>,

    /// Output preferences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

/// Default settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    /// Engine version used when a project does not name one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,

    /// Member API used when a project does not name one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<FrameApi>,
}

impl GlobalConfig {
    /// Load global configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the global configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(version) = self
            .defaults
            .as_ref()
            .and_then(|d| d.engine_version.as_deref())
        {
            version.parse::<EngineVersion>()?;
        }

        if let Some(members) = &self.members {
            members.validate()?;
        }

        Ok(())
    }

    /// Get the global config file path (~/.framekit/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".framekit").join("config.toml"))
    }

    /// Default engine version
    pub fn default_engine_version(&self) -> Option<EngineVersion> {
        self.defaults
            .as_ref()
            .and_then(|d| d.engine_version.as_deref())
            .and_then(|v| v.parse().ok())
    }

    /// Default member API
    pub fn default_api(&self) -> Option<FrameApi> {
        self.defaults.as_ref().and_then(|d| d.api)
    }
}
