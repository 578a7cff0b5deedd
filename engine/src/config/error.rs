use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer could not be read or did not deserialize into [`super::EngineConfig`].
    #[error("reading nwbmeta settings: {0}")]
    Source(#[from] config::ConfigError),

    #[error("nwbmeta config file {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    #[error("output.file_name {reason}")]
    InvalidFileName { reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
