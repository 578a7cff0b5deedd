//! Document commands: new, validate, import, apply.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use nwbmeta_engine::config::EngineConfig;
use nwbmeta_engine::{
    DocumentStore, FileDocumentStore, FormSession, ImportOutcome, Intent, Record,
    SubmitOutcome, ValidationReport, record_to_text, text_to_value, validate_record,
};
use serde_json::json;

use crate::Status;

/// Arguments for `nwbmeta new`
#[derive(Debug, Parser)]
pub struct NewArgs {
    /// Output directory (default: `output.directory` from config)
    #[arg(long = "output", short = 'o', value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// File name (default: `output.file_name` from config)
    #[arg(long = "file-name", value_name = "NAME")]
    pub file_name: Option<String>,

    /// Print the document instead of writing it
    #[arg(long = "stdout")]
    pub stdout: bool,
}

/// Arguments for `nwbmeta validate`
#[derive(Debug, Parser)]
pub struct ValidateArgs {
    /// YAML or JSON document
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output as JSON instead of text
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

/// Arguments for `nwbmeta import`
#[derive(Debug, Parser)]
pub struct ImportArgs {
    /// YAML or JSON document
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Where the reconciled document is written
    #[arg(long = "output", short = 'o', value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Report only; do not write the reconciled document
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Output as JSON instead of text
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

/// Arguments for `nwbmeta apply`
#[derive(Debug, Parser)]
pub struct ApplyArgs {
    /// YAML or JSON list of edits, e.g. `- {op: append_items, collection: cameras}`
    #[arg(long = "intents", short = 'i', value_name = "FILE")]
    pub intents: PathBuf,

    /// Start from this document instead of the blank form
    #[arg(long = "from", value_name = "FILE")]
    pub from: Option<PathBuf>,

    /// Where the generated document is written
    #[arg(long = "output", short = 'o', value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Output as JSON instead of text
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

pub fn run_new(config: &EngineConfig, args: NewArgs) -> anyhow::Result<Status> {
    let text = record_to_text(&Record::default_template())?;
    if args.stdout {
        print!("{text}");
        return Ok(Status::Success);
    }

    let file_name = args
        .file_name
        .unwrap_or_else(|| config.output.file_name.clone());
    let mut store = FileDocumentStore::new(output_dir(config, args.output));
    let location = store.save_document(&text, &file_name)?;
    println!("Wrote {location}");
    Ok(Status::Success)
}

pub fn run_validate(config: &EngineConfig, args: ValidateArgs) -> anyhow::Result<Status> {
    let store = FileDocumentStore::new(".").with_input(&args.file);
    let text = store.open_document()?;
    let document = text_to_value(&text)
        .with_context(|| format!("parsing {}", args.file.display()))?;
    let validator = config.build_validator()?;
    let report = validate_record(&document, &validator);

    if args.json {
        let json = json!({
            "file": args.file.display().to_string(),
            "valid": report.is_valid(),
            "issues": report.issues().collect::<Vec<_>>(),
            "messages": report.messages(),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else if report.is_valid() {
        println!("{}: valid", args.file.display());
    } else {
        print_report(&report);
    }

    Ok(status_of(&report))
}

pub fn run_import(config: &EngineConfig, args: ImportArgs) -> anyhow::Result<Status> {
    let mut store =
        FileDocumentStore::new(output_dir(config, args.output)).with_input(&args.file);
    let mut session = FormSession::from_config(config)?;
    let outcome = session
        .import_from(&store)
        .with_context(|| format!("importing {}", args.file.display()))?;

    let location = if args.dry_run {
        None
    } else {
        let text = record_to_text(&session.snapshot())?;
        Some(store.save_document(&text, &config.output.file_name)?)
    };

    if args.json {
        let json = json!({
            "file": args.file.display().to_string(),
            "accepted_wholesale": outcome.accepted_wholesale,
            "excluded_fields": outcome.excluded_fields,
            "messages": outcome.messages(),
            "output": location,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        print_import(&outcome);
        if let Some(location) = &location {
            println!("Wrote {location}");
        }
    }

    Ok(if outcome.accepted_wholesale {
        Status::Success
    } else {
        Status::Rejected
    })
}

pub fn run_apply(config: &EngineConfig, args: ApplyArgs) -> anyhow::Result<Status> {
    let intents = read_intents(&args.intents)?;
    let mut session = FormSession::from_config(config)?;

    if let Some(from) = &args.from {
        let source = FileDocumentStore::new(".").with_input(from);
        let outcome = session
            .import_from(&source)
            .with_context(|| format!("importing {}", from.display()))?;
        if !outcome.accepted_wholesale {
            tracing::warn!(
                excluded = ?outcome.excluded_fields,
                "starting from a partially recovered document"
            );
        }
    }

    for (position, intent) in intents.iter().enumerate() {
        session
            .dispatch(intent)
            .with_context(|| format!("edit #{} ({})", position + 1, intent.name()))?;
    }

    match session.submit()? {
        SubmitOutcome::Generated(document) => {
            let mut store = FileDocumentStore::new(output_dir(config, args.output));
            let location = store.save_document(&document.text, &document.file_name)?;
            if args.json {
                let json = json!({
                    "valid": true,
                    "edits": intents.len(),
                    "output": location,
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            } else {
                println!("Applied {} edit(s)", intents.len());
                println!("Wrote {location}");
            }
            Ok(Status::Success)
        }
        SubmitOutcome::Rejected(report) => {
            if args.json {
                let json = json!({
                    "valid": false,
                    "edits": intents.len(),
                    "issues": report.issues().collect::<Vec<_>>(),
                    "messages": report.messages(),
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            } else {
                print_report(&report);
            }
            Ok(Status::Rejected)
        }
    }
}

fn read_intents(path: &Path) -> anyhow::Result<Vec<Intent>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let intents: Vec<Intent> = serde_yaml::from_str(&text)
        .with_context(|| format!("decoding edits in {}", path.display()))?;
    tracing::debug!("read {} edit(s) from {}", intents.len(), path.display());
    Ok(intents)
}

fn output_dir(config: &EngineConfig, cli_override: Option<PathBuf>) -> PathBuf {
    cli_override.unwrap_or_else(|| config.output.directory.clone())
}

fn status_of(report: &ValidationReport) -> Status {
    if report.is_valid() {
        Status::Success
    } else {
        Status::Rejected
    }
}

fn print_report(report: &ValidationReport) {
    for message in report.messages() {
        println!("{message}");
    }
}

fn print_import(outcome: &ImportOutcome) {
    match outcome.notice() {
        Some(notice) => println!("{notice}"),
        None => println!("Imported without changes"),
    }
}
