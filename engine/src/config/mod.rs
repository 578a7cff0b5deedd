//! Engine configuration
//!
//! Layered the 12-factor way:
//! 1. Defaults (from code)
//! 2. Config file (`nwbmeta.toml`)
//! 3. Environment variables (`NWBMETA_*` prefix)
//!
//! # Example
//!
//! ```no_run
//! use nwbmeta_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load_default().expect("Failed to load config");
//! let validator = config.build_validator().expect("schema compiles");
//! ```
pub mod error;
pub mod loader;

pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, DeviceTypesConfig, EngineConfig, OutputConfig, SchemaConfig};
