//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::engine::{EngineVersion, FrameApi};
use crate::global::GlobalConfig;
use crate::project::{EngineConfig, OutputConfig, ProjectConfig};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the project configuration file
pub const PROJECT_CONFIG_FILE: &str = "framekit.toml";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.framekit/config.toml) - lowest priority
/// 2. Project config (./framekit.toml) - overrides global
/// 3. Environment variables (FRAMEKIT_*) - overrides project
/// 4. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Global configuration
    pub global: GlobalConfig,

    /// Project root directory (where framekit.toml was found)
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use a specific global config file instead of ~/.framekit/config.toml
    pub fn with_global_config_path(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: Some(path.into()),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find framekit.toml, then loads and merges
    /// global config if it exists.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;
        let global_config = self.load_global_config_or_default();
        let project_config = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root,
        })
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;
        let global_config = self.load_global_config_or_default();
        let project_config = self.apply_env_overrides(project_config)?;

        let project_root = config_path.parent().map(|p| p.to_path_buf());

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root,
        })
    }

    /// Find project configuration by walking up directory tree
    ///
    /// Returns (project_root, project_config); the default config when no file exists
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_CONFIG_FILE);

            if config_path.exists() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// Load global configuration from ~/.framekit/config.toml
    fn load_global_config(&mut self) -> ConfigResult<GlobalConfig> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => {
                let path = GlobalConfig::global_config_path()?;
                self.global_config_path = Some(path.clone());
                path
            }
        };

        // Global config is optional - if it doesn't exist, return default
        if !path.exists() {
            return Ok(GlobalConfig::default());
        }

        GlobalConfig::load_from_file(&path)
    }

    /// Global configuration, or the defaults with a warning when it cannot be read
    fn load_global_config_or_default(&mut self) -> GlobalConfig {
        match self.load_global_config() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable global config");
                GlobalConfig::default()
            }
        }
    }

        /// Apply environment variable overrides to project config
    ///
    /// FRAMEKIT_ENGINE_VERSION, FRAMEKIT_FRAME_API and FRAMEKIT_JSON are recognised.
    fn apply_env_overrides(&self, mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
        if let Ok(version) = env::var("FRAMEKIT_ENGINE_VERSION") {
            version.parse::<EngineVersion>()?;
            config
                .engine
                .get_or_insert_with(EngineConfig::default)
                .version = Some(version);
        }

        if let Ok(api) = env::var("FRAMEKIT_FRAME_API") {
            let api = api.parse::<FrameApi>().map_err(|_| ConfigError::InvalidValue {
                field: "FRAMEKIT_FRAME_API".to_string(),
                reason: format!("must be 'struct' or 'type-info', got '{}'", api),
            })?;
            config.engine.get_or_insert_with(EngineConfig::default).api = Some(api);
        }

        if let Ok(json) = env::var("FRAMEKIT_JSON") {
            let json_bool = matches!(json.to_lowercase().as_str(), "true" | "1" | "yes");
            config.output.get_or_insert_with(OutputConfig::default).json = Some(json_bool);
        }

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Effective engine version (project > global > default)
    pub fn engine_version(&self) -> EngineVersion {
        self.project
            .engine_version()
            .or_else(|| self.global.default_engine_version())
            .unwrap_or_default()
    }

    /// Effective member API
    ///
    /// An explicit API wins over a version at the same level; project settings
    /// win over global ones.
    pub fn frame_api(&self) -> FrameApi {
        self.project
            .frame_api()
            .or_else(|| self.project.engine_version().map(EngineVersion::frame_api))
            .or_else(|| self.global.default_api())
            .unwrap_or_else(|| self.engine_version().frame_api())
    }

    /// Configured saved-registers marker, if overridden
    pub fn saved_registers_marker(&self) -> Option<&str> {
        self.project
            .members
            .as_ref()
            .and_then(|m| m.saved_registers.as_deref())
            .or_else(|| {
                self.global
                    .members
                    .as_ref()
                    .and_then(|m| m.saved_registers.as_deref())
            })
    }

    /// Configured return-address marker, if overridden
    pub fn return_address_marker(&self) -> Option<&str> {
        self.project
            .members
            .as_ref()
            .and_then(|m| m.return_address.as_deref())
            .or_else(|| {
                self.global
                    .members
                    .as_ref()
                    .and_then(|m| m.return_address.as_deref())
            })
    }

    /// Whether output should be JSON by default
    pub fn json_output(&self) -> bool {
        self.project
            .json_output()
            .or_else(|| self.global.output.as_ref().and_then(|o| o.json))
            .unwrap_or(false)
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if this is a project (has framekit.toml)
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}
