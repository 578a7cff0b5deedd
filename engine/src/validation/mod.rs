//! Record validation
//!
//! Two independent layers run against a candidate document:
//! 1. [`SchemaValidator`]: the externally supplied JSON Schema
//! 2. [`validate_rules`]: cross-field business rules the schema cannot express
//!
//! Both always run to completion and report every problem; the combined
//! [`ValidationReport`] is what callers act on.

mod rules;
mod schema;

pub use rules::validate_rules;
pub use schema::SchemaValidator;

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::input::title_case;

/// Which layer produced an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSource {
    Schema,
    Rule,
}

/// One validation problem, shaped for a presentation layer: `field_id`
/// names the on-screen control, `message` is the user-facing text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub source: IssueSource,
    /// Control id: `field`, `object-field` or `collection-field-index`
    pub field_id: String,
    /// Top-level record field this issue implicates, if any
    pub top_level_field: Option<String>,
    /// JSON pointer into the candidate document
    pub instance_path: String,
    pub message: String,
}

impl ValidationIssue {
    /// Fallback label for a pop-up when the control cannot be focused.
    pub fn display_label(&self) -> String {
        let words = self
            .instance_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .replace('_', " ");
        title_case(&words)
    }
}

/// Map pointer segments to a control id. Three or more segments
/// (`collection/index/field/...`) become `collection-field-index`.
pub(crate) fn field_id_from_segments(segments: &[String]) -> String {
    match segments {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first}-{second}"),
        [first, second, third, ..] => format!("{first}-{third}-{second}"),
    }
}

/// Combined result of both validation layers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub schema_issues: Vec<ValidationIssue>,
    pub rule_issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.schema_issues.is_empty() && self.rule_issues.is_empty()
    }

    /// Schema issues first, then rule issues
    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.schema_issues.iter().chain(&self.rule_issues)
    }

    pub fn len(&self) -> usize {
        self.schema_issues.len() + self.rule_issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_valid()
    }

    /// Top-level field names implicated by either layer.
    pub fn implicated_fields(&self) -> BTreeSet<String> {
        self.issues()
            .filter_map(|issue| issue.top_level_field.clone())
            .collect()
    }

    /// Deduplicated messages for a single batched notice, rule messages
    /// first.
    pub fn messages(&self) -> Vec<String> {
        let mut messages: Vec<String> = Vec::new();
        for issue in self.rule_issues.iter().chain(&self.schema_issues) {
            if !messages.contains(&issue.message) {
                messages.push(issue.message.clone());
            }
        }
        messages
    }
}

/// Run both layers against `candidate`.
pub fn validate_record(candidate: &Value, schema: &SchemaValidator) -> ValidationReport {
    let report = ValidationReport {
        schema_issues: schema.validate(candidate),
        rule_issues: validate_rules(candidate),
    };
    tracing::debug!(
        schema_issues = report.schema_issues.len(),
        rule_issues = report.rule_issues.len(),
        "validated record"
    );
    report
}
