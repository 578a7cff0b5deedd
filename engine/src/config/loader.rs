use crate::config::error::{ConfigError, Result};
use crate::device_types::DeviceTypeCatalog;
use crate::record::vocabulary::DEFAULT_FILE_NAME;
use crate::validation::SchemaValidator;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Schema document override
    #[serde(default)]
    pub schema: SchemaConfig,

    /// Device-type table override
    #[serde(default)]
    pub device_types: DeviceTypesConfig,

    /// Where generated documents go
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// JSON or YAML schema file; the bundled schema is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceTypesConfig {
    /// JSON or YAML device-type table; the builtin table is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,

    /// Suggested name for generated documents
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_file_name() -> String {
    DEFAULT_FILE_NAME.to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            file_name: default_file_name(),
        }
    }
}

impl EngineConfig {
    /// Compile the configured schema, or the bundled one.
    pub fn build_validator(&self) -> crate::Result<SchemaValidator> {
        match &self.schema.path {
            Some(path) => SchemaValidator::from_path(path),
            None => SchemaValidator::bundled(),
        }
    }

    /// Load the configured device-type table, or the builtin one.
    pub fn build_catalog(&self) -> crate::Result<DeviceTypeCatalog> {
        match &self.device_types.path {
            Some(path) => DeviceTypeCatalog::from_path(path),
            None => Ok(DeviceTypeCatalog::builtin()),
        }
    }

    fn validate(&self) -> Result<()> {
        let name = self.output.file_name.trim();
        if name.is_empty() {
            return Err(ConfigError::InvalidFileName {
                reason: "must not be empty".to_string(),
            });
        }
        if name.contains(['/', '\\']) {
            return Err(ConfigError::InvalidFileName {
                reason: format!("must be a bare file name, got {name:?}"),
            });
        }
        Ok(())
    }
}

/// Configuration loader with layered merging support
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration with layered merging:
    /// 1. Start with defaults (from Default implementations)
    /// 2. Merge config file if provided
    /// 3. Override with environment variables (NWBMETA_ prefix)
    pub fn load(&self) -> Result<EngineConfig> {
        let mut builder = Config::builder();

        // Layer 1: defaults
        builder = builder.add_source(Config::try_from(&EngineConfig::default())?);

        // Layer 2: config file
        if let Some(ref path) = self.config_path {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_ref()));
            } else {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
        }

        // Layer 3: environment, double underscore for nesting
        // Example: NWBMETA_OUTPUT__FILE_NAME=session.yml
        builder = builder.add_source(
            Environment::with_prefix("NWBMETA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: EngineConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        tracing::debug!(?config, "loaded engine configuration");
        Ok(config)
    }

    /// Locate the default config file in standard locations:
    /// 1. Current directory: ./nwbmeta.toml
    /// 2. XDG config: ~/.config/nwbmeta/config.toml
    /// 3. Home directory: ~/.nwbmeta.toml
    pub fn find_config_file() -> Option<PathBuf> {
        let cwd_config = PathBuf::from("./nwbmeta.toml");
        if cwd_config.exists() {
            return Some(cwd_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("nwbmeta").join("config.toml");
            if xdg_config.exists() {
                return Some(xdg_config);
            }
        }

        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(".nwbmeta.toml");
            if home_config.exists() {
                return Some(home_config);
            }
        }

        None
    }

    /// Load configuration from default locations
    pub fn load_default() -> Result<EngineConfig> {
        let loader = match Self::find_config_file() {
            Some(config_path) => ConfigLoader::new().with_file(config_path),
            None => ConfigLoader::new(),
        };
        loader.load()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
