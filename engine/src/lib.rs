//! NWB metadata form engine
//!
//! Form-state reconciliation and validation for NWB metadata YAML records:
//! a pure mutation engine over an immutable record, schema and rule
//! validation combined into one report, partial recovery of imported
//! documents, and YAML rendering.
//!
//! Hosts (a desktop shell, a browser page, the `nwbmeta` CLI) own
//! presentation and file access; they decode widget events into
//! [`Intent`]s and hand text in and out through a [`DocumentStore`].

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod config;
pub mod derived;
pub mod device_types;
pub mod error;
pub mod input;
pub mod mutation;
pub mod reconcile;
pub mod record;
pub mod session;
pub mod store;
pub mod validation;
pub mod yaml;

pub use derived::{DerivedState, recompute_derived_state};
pub use device_types::{ChannelProperty, DeviceType, DeviceTypeCatalog};
pub use error::{EngineError, Result};
pub use mutation::Intent;
pub use reconcile::{ImportOutcome, reconcile};
pub use record::{Collection, Record, ValueKind};
pub use session::{FormSession, GeneratedDocument, SubmitOutcome};
pub use store::{DocumentStore, FileDocumentStore, InMemoryDocumentStore};
pub use validation::{
    IssueSource, SchemaValidator, ValidationIssue, ValidationReport, validate_record,
    validate_rules,
};
pub use yaml::{record_to_text, text_to_record, text_to_value};

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
