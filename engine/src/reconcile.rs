//! Import reconciliation.
//!
//! A fully valid document is adopted as is. Otherwise the result starts from
//! [`Record::empty`] and takes from the candidate only the top-level fields
//! that no validator implicated and whose kind matches the blank template.

use serde::Serialize;
use serde_json::Value;

use crate::error::{EngineError, Result};
use crate::record::{Record, ValueKind, kind_name};
use crate::validation::{SchemaValidator, ValidationReport, validate_record};

/// Heading of the batched notice shown after a partial import
pub const EXCLUDED_NOTICE_HEADING: &str = "Entries Excluded";

/// Result of reconciling an imported document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportOutcome {
    pub record: Record,
    pub report: ValidationReport,
    /// Template fields that were not taken from the candidate
    pub excluded_fields: Vec<String>,
    pub accepted_wholesale: bool,
}

impl ImportOutcome {
    /// Deduplicated messages from both validators
    pub fn messages(&self) -> Vec<String> {
        self.report.messages()
    }

    /// Batched notice for the user; `None` when the document was accepted.
    pub fn notice(&self) -> Option<String> {
        if self.accepted_wholesale {
            return None;
        }
        Some(format!(
            "{EXCLUDED_NOTICE_HEADING}\n\n{}",
            self.messages().join("\n")
        ))
    }
}

/// Reconcile a parsed candidate document against both validators.
pub fn reconcile(candidate: Value, validator: &SchemaValidator) -> Result<ImportOutcome> {
    let Value::Object(fields) = candidate else {
        return Err(EngineError::Parse(format!(
            "document root must be a mapping, found {}",
            kind_name(&candidate)
        )));
    };

    let report = validate_record(&Value::Object(fields.clone()), validator);
    if report.is_valid() {
        tracing::info!(fields = fields.len(), "import accepted");
        return Ok(ImportOutcome {
            record: Record::from_map(fields),
            report,
            excluded_fields: Vec::new(),
            accepted_wholesale: true,
        });
    }

    let implicated = report.implicated_fields();
    let mut record = Record::empty();
    let mut excluded_fields = Vec::new();
    for (name, blank) in record.as_map_mut().iter_mut() {
        let salvaged = fields.get(name).filter(|value| {
            !implicated.contains(name) && ValueKind::of(value) == ValueKind::of(blank)
        });
        match salvaged {
            Some(value) => *blank = value.clone(),
            None if implicated.contains(name) || fields.contains_key(name) => {
                excluded_fields.push(name.clone());
            }
            None => {}
        }
    }

    for name in fields.keys().filter(|name| !record.contains_field(name)) {
        tracing::debug!(field = %name, "dropping field unknown to the record template");
    }

    let outcome = ImportOutcome {
        record,
        report,
        excluded_fields,
        accepted_wholesale: false,
    };
    if outcome.messages().is_empty() && !outcome.excluded_fields.is_empty() {
        tracing::warn!(
            excluded = ?outcome.excluded_fields,
            "fields excluded from import without any validation message"
        );
    }
    tracing::info!(
        excluded = ?outcome.excluded_fields,
        issues = outcome.report.len(),
        "import partially recovered"
    );
    Ok(outcome)
}
