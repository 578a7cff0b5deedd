//! `nwbmeta` entry point.

use std::process::ExitCode;

use clap::Parser;
use nwbmeta_cli::{Cli, init_tracing};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.run() {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}
