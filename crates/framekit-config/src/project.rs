//! Project Configuration (framekit.toml)
//!
//! Handles project-level configuration stored in `framekit.toml`.

use crate::engine::{EngineVersion, FrameApi};
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Project configuration from framekit.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Engine the snapshots and frames come from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineConfig>,

    /// Synthetic member names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<MembersConfig>,

    /// Output preferences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Engine version ("major.minor")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Explicit member API, overrides the version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<FrameApi>,
}

/// Names of the engine-injected frame members
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct MembersConfig {
    /// Saved-registers slot (default: " s")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_registers: Option<String>,

    /// Return-address slot (default: " r")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_address: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Emit JSON instead of tables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

impl ProjectConfig {
    /// Load project configuration from a file
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

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(version) = self.engine.as_ref().and_then(|e| e.version.as_deref()) {
            version.parse::<EngineVersion>()?;
        }

        if let Some(members) = &self.members {
            members.validate()?;
        }

        Ok(())
    }

    /// Configured engine version, if any
    pub fn engine_version(&self) -> Option<EngineVersion> {
        self.engine
            .as_ref()
            .and_then(|e| e.version.as_deref())
            .and_then(|v| v.parse().ok())
    }

    /// Explicitly configured member API, if any
    pub fn frame_api(&self) -> Option<FrameApi> {
        self.engine.as_ref().and_then(|e| e.api)
    }

    /// JSON output preference, if any
    pub fn json_output(&self) -> Option<bool> {
        self.output.as_ref().and_then(|o| o.json)
    }
}

impl MembersConfig {
    /// Validate marker names
    ///
    /// Markers must be non-empty and distinct from each other.
    pub fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("members.saved_registers", &self.saved_registers),
            ("members.return_address", &self.return_address),
        ] {
            if value.as_deref() == Some("") {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "marker name cannot be empty".to_string(),
                });
            }
        }

        if let (Some(saved), Some(ret)) = (&self.saved_registers, &self.return_address) {
            if saved == ret {
                return Err(ConfigError::InvalidValue {
                    field: "members.return_address".to_string(),
                    reason: format!("must differ from the saved-registers marker '{}'", saved),
                });
            }
        }

        Ok(())
    }
}
