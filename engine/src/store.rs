//! Where documents come from and go to.
//!
//! The engine itself only converts between records and text. A
//! [`DocumentStore`] is the host's side of that boundary: a native host reads
//! and writes files, an embedded host hands text to a download buffer.

use std::path::PathBuf;

use crate::error::{EngineError, Result};

/// Source of imported documents and sink for generated ones
pub trait DocumentStore {
    /// Text of the document to import
    fn open_document(&self) -> Result<String>;

    /// Store generated text under (or near) `suggested_name`, returning
    /// where it went.
    fn save_document(&mut self, text: &str, suggested_name: &str) -> Result<String>;
}

/// Native file-system adapter
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    input: Option<PathBuf>,
    output_dir: PathBuf,
}

impl FileDocumentStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: None,
            output_dir: output_dir.into(),
        }
    }

    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }
}

impl DocumentStore for FileDocumentStore {
    fn open_document(&self) -> Result<String> {
        let path = self
            .input
            .as_ref()
            .ok_or_else(|| EngineError::NoDocument("no input file selected".to_string()))?;
        std::fs::read_to_string(path).map_err(|source| EngineError::FileRead {
            path: path.clone(),
            source,
        })
    }

    fn save_document(&mut self, text: &str, suggested_name: &str) -> Result<String> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| EngineError::FileWrite {
            path: self.output_dir.clone(),
            source,
        })?;
        let path = self.output_dir.join(suggested_name);
        std::fs::write(&path, text).map_err(|source| EngineError::FileWrite {
            path: path.clone(),
            source,
        })?;
        tracing::info!("Wrote {}", path.display());
        Ok(path.display().to_string())
    }
}

/// In-memory adapter: an optional pending upload and a list of downloads.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    pending: Option<String>,
    saved: Vec<(String, String)>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage text as the next document to open.
    pub fn with_upload(mut self, text: impl Into<String>) -> Self {
        self.pending = Some(text.into());
        self
    }

    /// `(file name, text)` pairs in save order
    pub fn saved(&self) -> &[(String, String)] {
        &self.saved
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn open_document(&self) -> Result<String> {
        self.pending
            .clone()
            .ok_or_else(|| EngineError::NoDocument("nothing uploaded".to_string()))
    }

    fn save_document(&mut self, text: &str, suggested_name: &str) -> Result<String> {
        self.saved
            .push((suggested_name.to_string(), text.to_string()));
        Ok(suggested_name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = FileDocumentStore::new(dir.path().join("out"));
        let location = store
            .save_document("lab: x\n", "metaData.yml")
            .expect("saves");
        assert!(location.ends_with("metaData.yml"));

        let reader = FileDocumentStore::new(dir.path()).with_input(&location);
        assert_eq!(reader.open_document().expect("opens"), "lab: x\n");
    }

    #[test]
    fn test_file_store_without_input() {
        let store = FileDocumentStore::new(".");
        let err = store.open_document().expect_err("no input");
        assert!(matches!(err, EngineError::NoDocument(_)));
    }

    #[test]
    fn test_file_store_missing_input() {
        let store = FileDocumentStore::new(".").with_input("/nonexistent/metaData.yml");
        let err = store.open_document().expect_err("missing file");
        assert!(matches!(err, EngineError::FileRead { .. }));
    }

    #[test]
    fn test_in_memory_store() {
        let mut store = InMemoryDocumentStore::new().with_upload("lab: y\n");
        assert_eq!(store.open_document().expect("uploaded"), "lab: y\n");
        store.save_document("a", "first.yml").expect("saves");
        store.save_document("b", "second.yml").expect("saves");
        assert_eq!(
            store.saved(),
            &[
                ("first.yml".to_string(), "a".to_string()),
                ("second.yml".to_string(), "b".to_string()),
            ]
        );
        assert!(InMemoryDocumentStore::new().open_document().is_err());
    }
}
