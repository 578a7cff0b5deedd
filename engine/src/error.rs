//! Error types for engine operations
//!
//! Validation failures are not errors: validators always return full issue
//! lists and the caller decides whether they block. `EngineError` covers the
//! cases that abort an operation.

use std::path::PathBuf;
use thiserror::Error;

/// Engine result type alias
pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine error taxonomy
#[derive(Debug, Error)]
pub enum EngineError {
    /// A mutation precondition did not hold.
    #[error("Invariant violation in {operation}: {detail}")]
    InvariantViolation {
        operation: &'static str,
        detail: String,
    },

    #[error("Failed to parse document: {0}")]
    Parse(String),

    #[error("Failed to render YAML: {source}")]
    Serialize { source: serde_yaml::Error },

    #[error("Failed to compile schema: {0}")]
    SchemaCompile(String),

    #[error("Failed to load schema: {0}")]
    SchemaLoad(String),

    #[error("Invalid device type table: {0}")]
    DeviceTypes(String),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No document available: {0}")]
    NoDocument(String),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

impl EngineError {
    pub(crate) fn invariant(operation: &'static str, detail: impl Into<String>) -> Self {
        EngineError::InvariantViolation {
            operation,
            detail: detail.into(),
        }
    }

    /// True when the error signals a broken engine precondition.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, EngineError::InvariantViolation { .. })
    }
}

impl From<serde_yaml::Error> for EngineError {
    fn from(source: serde_yaml::Error) -> Self {
        EngineError::Serialize { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant_violation_display() {
        let err = EngineError::invariant("append_items", "collection `foo` is unknown");
        assert!(err.is_invariant_violation());
        assert_eq!(
            err.to_string(),
            "Invariant violation in append_items: collection `foo` is unknown"
        );
    }

    #[test]
    fn test_file_read_is_not_invariant() {
        let err = EngineError::FileRead {
            path: "/tmp/missing.yml".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(!err.is_invariant_violation());
        assert!(err.to_string().contains("/tmp/missing.yml"));
    }
}
