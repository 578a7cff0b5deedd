//! Command-line host for the NWB metadata form engine.
//!
//! Drives the same engine a form UI would: every edit goes through an
//! [`nwbmeta_engine::Intent`], documents come in and go out through a
//! [`nwbmeta_engine::FileDocumentStore`].
//!
//! ## Commands
//!
//! - `nwbmeta new [--output DIR] [--file-name NAME] [--stdout]`
//! - `nwbmeta validate <FILE> [--json]`
//! - `nwbmeta import <FILE> [--output DIR] [--dry-run] [--json]`
//! - `nwbmeta apply --intents <FILE> [--from <FILE>] [--output DIR] [--json]`
//! - `nwbmeta device-types [--json]`
//!
//! ## Exit Codes
//!
//! - 0: Success
//! - 1: Document invalid, or entries excluded on import
//! - 2: Usage, configuration or I/O failure

pub mod device_types_cmd;
pub mod document_cmd;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use nwbmeta_engine::config::{ConfigLoader, EngineConfig};
use tracing_subscriber::EnvFilter;

use crate::device_types_cmd::DeviceTypesArgs;
use crate::document_cmd::{ApplyArgs, ImportArgs, NewArgs, ValidateArgs};

/// Create, validate and repair NWB metadata YAML documents
#[derive(Debug, Parser)]
#[command(name = "nwbmeta", version)]
pub struct Cli {
    /// Configuration file (default: ./nwbmeta.toml, then the user config dir)
    #[arg(long = "config", short = 'c', value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long = "verbose", short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a blank form (the default template)
    New(NewArgs),

    /// Check a document against the schema and the cross-field rules
    Validate(ValidateArgs),

    /// Import a document, keeping only the fields that pass validation
    Import(ImportArgs),

    /// Apply a list of form edits and generate the document
    Apply(ApplyArgs),

    /// List the known probe device types
    DeviceTypes(DeviceTypesArgs),
}

/// Outcome of a command that ran to completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    /// The document did not validate, or import dropped fields
    Rejected,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => ExitCode::SUCCESS,
            Status::Rejected => ExitCode::from(1),
        }
    }
}

impl Cli {
    pub fn run(self) -> anyhow::Result<Status> {
        let config = load_config(self.config.as_deref())?;
        match self.command {
            Command::New(args) => document_cmd::run_new(&config, args),
            Command::Validate(args) => document_cmd::run_validate(&config, args),
            Command::Import(args) => document_cmd::run_import(&config, args),
            Command::Apply(args) => document_cmd::run_apply(&config, args),
            Command::DeviceTypes(args) => device_types_cmd::run_device_types(&config, args),
        }
    }
}

/// Explicit file if given, otherwise the standard locations.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let config = match path {
        Some(path) => ConfigLoader::new()
            .with_file(path)
            .load()
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ConfigLoader::load_default().context("loading config")?,
    };
    Ok(config)
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
