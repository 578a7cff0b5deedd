//! The form's single state slot.
//!
//! `FormSession` owns the current record as an immutable `Arc` snapshot.
//! Every transition computes a new record, runs derived-state recompute on
//! it, and swaps the snapshot in one assignment; readers holding an older
//! snapshot keep a consistent view.

use std::sync::Arc;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::derived::{DerivedState, recompute_derived_state};
use crate::device_types::DeviceTypeCatalog;
use crate::error::Result;
use crate::mutation::Intent;
use crate::reconcile::{ImportOutcome, reconcile};
use crate::record::Record;
use crate::record::vocabulary::DEFAULT_FILE_NAME;
use crate::store::DocumentStore;
use crate::validation::{SchemaValidator, ValidationReport, validate_record};
use crate::yaml::{record_to_text, text_to_value};

/// Text ready to hand to a save collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedDocument {
    pub file_name: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Generated(GeneratedDocument),
    Rejected(ValidationReport),
}

pub struct FormSession {
    state: Arc<Record>,
    derived: DerivedState,
    validator: Arc<SchemaValidator>,
    catalog: Arc<DeviceTypeCatalog>,
    file_name: String,
}

impl FormSession {
    /// Session starting from the default template.
    pub fn new(validator: SchemaValidator, catalog: DeviceTypeCatalog) -> Self {
        let mut session = Self {
            state: Arc::new(Record::default()),
            derived: DerivedState::default(),
            validator: Arc::new(validator),
            catalog: Arc::new(catalog),
            file_name: DEFAULT_FILE_NAME.to_string(),
        };
        session.replace(Record::default_template());
        session
    }

    /// Session wired to the configured schema, device table and file name.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let session = Self::new(config.build_validator()?, config.build_catalog()?)
            .with_file_name(config.output.file_name.clone());
        Ok(session)
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Current record; cheap to clone and never mutated after hand-out.
    pub fn snapshot(&self) -> Arc<Record> {
        Arc::clone(&self.state)
    }

    pub fn derived(&self) -> &DerivedState {
        &self.derived
    }

    pub fn catalog(&self) -> &DeviceTypeCatalog {
        &self.catalog
    }

    /// Apply one intent. On error the state is unchanged.
    pub fn dispatch(&mut self, intent: &Intent) -> Result<()> {
        let next = intent.apply(&self.state, &self.catalog)?;
        self.replace(next);
        Ok(())
    }

    /// Back to the default template.
    pub fn reset(&mut self) {
        tracing::debug!("resetting form");
        self.replace(Record::default_template());
    }

    /// Parse and reconcile imported text. A parse failure leaves the current
    /// record untouched; otherwise the reconciled record replaces it.
    pub fn import_text(&mut self, text: &str) -> Result<ImportOutcome> {
        let candidate = text_to_value(text)?;
        let outcome = reconcile(candidate, &self.validator)?;
        self.replace(outcome.record.clone());
        Ok(outcome)
    }

    pub fn import_from(&mut self, store: &impl DocumentStore) -> Result<ImportOutcome> {
        let text = store.open_document()?;
        self.import_text(&text)
    }

    /// Run both validators on the current record.
    pub fn validate(&self) -> ValidationReport {
        validate_record(&self.state.to_value(), &self.validator)
    }

    /// Validate and, when clean, render the current record.
    pub fn submit(&self) -> Result<SubmitOutcome> {
        let report = self.validate();
        if !report.is_valid() {
            tracing::info!(issues = report.len(), "submit rejected");
            return Ok(SubmitOutcome::Rejected(report));
        }
        let text = record_to_text(&self.state)?;
        tracing::info!(file_name = %self.file_name, "document generated");
        Ok(SubmitOutcome::Generated(GeneratedDocument {
            file_name: self.file_name.clone(),
            text,
        }))
    }

    fn replace(&mut self, next: Record) {
        let (next, derived) = recompute_derived_state(&next);
        self.state = Arc::new(next);
        self.derived = derived;
    }
}
