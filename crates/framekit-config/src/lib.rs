//! framekit Configuration System
//!
//! Decides how stack frames are opened and presented:
//! - Which member API the engine speaks (derived from the engine version)
//! - Which member names count as synthetic frame slots
//! - Output preferences for the command line front end
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Global config (~/.framekit/config.toml)
//! 2. Project config (./framekit.toml, searched upwards)
//! 3. Environment variables (FRAMEKIT_*)
//! 4. CLI flags
//!
//! # Example
//!
//! ```no_run
//! use framekit_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("member API: {}", config.frame_api());
//! ```

pub mod engine;
pub mod global;
pub mod loader;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Invalid engine version: {0}")]
    InvalidVersion(String),

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use engine::{EngineVersion, FrameApi};
pub use global::GlobalConfig;
pub use loader::{Config, ConfigLoader};
pub use project::{MembersConfig, ProjectConfig};
