use std::path::Path;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, JSONSchema, ValidationError};
use serde_json::Value;

use super::{IssueSource, ValidationIssue, field_id_from_segments};
use crate::error::{EngineError, Result};
use crate::record::vocabulary::{LEGACY_NON_BLANK_PATTERN, NON_BLANK_PATTERN};

/// Compiled JSON Schema for metadata records
///
/// The schema document is opaque to the engine: it is compiled once and then
/// evaluated in collect-all-errors mode.
pub struct SchemaValidator {
    compiled: JSONSchema,
}

impl SchemaValidator {
    /// Compile a schema document (JSON Schema Draft 7).
    pub fn new(document: &Value) -> Result<Self> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(document)
            .map_err(|e| EngineError::SchemaCompile(e.to_string()))?;
        Ok(Self { compiled })
    }

    /// The schema shipped with the engine.
    ///
    /// Embedded at compile time with `include_str!` so validation never
    /// depends on the runtime filesystem.
    pub fn bundled() -> Result<Self> {
        let text = include_str!("schemas/nwb_metadata.schema.json");
        let document: Value = serde_json::from_str(text)
            .map_err(|e| EngineError::SchemaLoad(format!("bundled schema: {e}")))?;
        Self::new(&document)
    }

    /// Load and compile a schema file (JSON, or YAML).
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let document: Value = serde_yaml::from_str(&text)
            .map_err(|e| EngineError::SchemaLoad(format!("{}: {e}", path.display())))?;
        tracing::debug!("Compiling schema from {}", path.display());
        Self::new(&document)
    }

    /// Validate `candidate`, returning every violation found.
    pub fn validate(&self, candidate: &Value) -> Vec<ValidationIssue> {
        match self.compiled.validate(candidate) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.map(|error| issue_from_error(&error)).collect(),
        }
    }

    pub fn is_valid(&self, candidate: &Value) -> bool {
        self.compiled.is_valid(candidate)
    }
}

fn issue_from_error(error: &ValidationError<'_>) -> ValidationIssue {
    let instance_path = error.instance_path.to_string();
    let mut segments = pointer_segments(&instance_path);

    // A missing property is reported against its parent; point at the
    // property itself so the id names the control that needs filling.
    if let ValidationErrorKind::Required { property } = &error.kind {
        let property = property
            .as_str()
            .map_or_else(|| property.to_string(), str::to_string);
        segments.push(property);
    }

    let field_id = field_id_from_segments(&segments);
    let detail = match &error.kind {
        ValidationErrorKind::Pattern { pattern }
            if pattern == NON_BLANK_PATTERN || pattern == LEGACY_NON_BLANK_PATTERN =>
        {
            format!("{field_id} cannot be empty nor all whitespace")
        }
        _ => error.to_string(),
    };

    ValidationIssue {
        source: IssueSource::Schema,
        top_level_field: segments.first().cloned(),
        message: format!("Key: {} | Error: {detail}", segments.join(", ")),
        field_id,
        instance_path,
    }
}

/// Split a JSON pointer into unescaped segments.
fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn small_schema() -> SchemaValidator {
        SchemaValidator::new(&json!({
            "type": "object",
            "required": ["lab"],
            "properties": {
                "lab": {"type": "string", "pattern": NON_BLANK_PATTERN},
                "subject": {
                    "type": "object",
                    "properties": {"weight": {"type": "number"}}
                },
                "cameras": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {"lens": {"type": "string", "pattern": "^.+$"}}
                    }
                }
            }
        }))
        .expect("schema compiles")
    }

    #[test]
    fn test_bundled_schema_compiles() {
        assert!(SchemaValidator::bundled().is_ok());
    }

    #[test]
    fn test_invalid_schema_is_rejected() {
        let err = SchemaValidator::new(&json!({"type": 12})).err().expect("compile fails");
        assert!(matches!(err, EngineError::SchemaCompile(_)));
    }

    #[test]
    fn test_missing_required_names_the_property() {
        let issues = small_schema().validate(&json!({}));
        assert_eq!(issues.len(), 1);
        let issue = &issues[0];
        assert_eq!(issue.field_id, "lab");
        assert_eq!(issue.top_level_field.as_deref(), Some("lab"));
        assert_eq!(issue.instance_path, "");
        assert!(issue.message.starts_with("Key: lab | Error: "), "{}", issue.message);
        assert!(issue.message.contains("lab"));
    }

    #[test]
    fn test_blank_string_gets_friendly_message() {
        let issues = small_schema().validate(&json!({"lab": "   "}));
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].message,
            "Key: lab | Error: lab cannot be empty nor all whitespace"
        );
    }

    #[test]
    fn test_nested_and_item_paths() {
        let issues = small_schema().validate(&json!({
            "lab": "x",
            "subject": {"weight": "heavy"},
            "cameras": [{"lens": ""}],
        }));
        let mut ids: Vec<_> = issues.iter().map(|i| i.field_id.clone()).collect();
        ids.sort();
        assert_eq!(ids, vec!["cameras-lens-0", "subject-weight"]);

        let camera = issues
            .iter()
            .find(|i| i.field_id == "cameras-lens-0")
            .expect("camera issue");
        assert_eq!(camera.top_level_field.as_deref(), Some("cameras"));
        assert_eq!(
            camera.message,
            "Key: cameras, 0, lens | Error: cameras-lens-0 cannot be empty nor all whitespace"
        );
    }

    #[test]
    fn test_collects_all_errors() {
        let issues = small_schema().validate(&json!({
            "lab": "",
            "subject": {"weight": "heavy"},
        }));
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_pointer_segments_unescape() {
        assert_eq!(pointer_segments("/a~1b/0/c~0d"), vec!["a/b", "0", "c~d"]);
        assert!(pointer_segments("").is_empty());
    }
}
