//! Engine version and member API selection
//!
//! Engines before 8.5 expose frames as struct-style aggregates addressed by
//! byte offset. From 8.5 on, frames are type-information records whose
//! members are addressed by index.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An engine release, `major.minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EngineVersion {
    pub major: u32,
    pub minor: u32,
}

impl EngineVersion {
    /// First release that serves frames through the type-information API.
    pub const TYPE_INFO_FRAMES: EngineVersion = EngineVersion::new(8, 5);

    /// Version assumed when nothing is configured.
    pub const DEFAULT: EngineVersion = EngineVersion::new(9, 0);

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// The member API frames use in this release.
    pub fn frame_api(self) -> FrameApi {
        if self >= Self::TYPE_INFO_FRAMES {
            FrameApi::TypeInfo
        } else {
            FrameApi::Struct
        }
    }
}

impl Default for EngineVersion {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for EngineVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        let invalid = || ConfigError::InvalidVersion(s.to_string());
        let (major, minor) = s.trim().split_once('.').ok_or_else(invalid)?;
        let major = major.parse::<u32>().map_err(|_| invalid())?;
        let minor = minor.parse::<u32>().map_err(|_| invalid())?;
        Ok(Self::new(major, minor))
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Native member API used to open a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameApi {
    /// Struct-style frames: members by byte offset, identity by struct id.
    Struct,
    /// Type-information frames: members by index, identity by type id.
    TypeInfo,
}

impl FromStr for FrameApi {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "struct" => Ok(FrameApi::Struct),
            "type-info" | "typeinfo" | "udt" => Ok(FrameApi::TypeInfo),
            other => Err(ConfigError::InvalidValue {
                field: "engine.api".to_string(),
                reason: format!("must be 'struct' or 'type-info', got '{}'", other),
            }),
        }
    }
}

impl fmt::Display for FrameApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameApi::Struct => f.write_str("struct"),
            FrameApi::TypeInfo => f.write_str("type-info"),
        }
    }
}
