//! topdown CLI - browse the call tree of a top-down profiling export
//!
//! Usage: topdown <command> [arguments]

mod cli;
mod common;
mod export_cmd;
mod find_cmd;
mod import_cmd;
mod list_cmd;
mod show_cmd;
mod status_cmd;
mod verify_cmd;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use topdown::error_codes;
use topdown::{ExportConfig, OutputFormat};

/// Log to stderr so JSON on stdout stays parseable. `RUST_LOG` overrides the
/// default level; `--verbose` forces debug for this crate.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,topdown=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands, output_format: OutputFormat) -> Result<ExitCode> {
    match command {
        Commands::Import {
            input,
            db,
            fresh,
            header,
            delimiter,
        } => {
            let config = cli::import_config(header, delimiter, fresh);
            import_cmd::run_import(input, db, config, output_format)?;
        }
        Commands::List { db, sort, limit } => {
            list_cmd::run_list(db, sort.into(), limit, output_format)?;
        }
        Commands::Show { db, id } => return show_cmd::run_show(db, id, output_format),
        Commands::Children { db, id } => return show_cmd::run_children(db, id, output_format),
        Commands::Roots { db } => list_cmd::run_roots(db, output_format)?,
        Commands::Find { db, name, children } => {
            find_cmd::run_find(db, name, children, output_format)?;
        }
        Commands::Status { db } => status_cmd::run_status(db, output_format)?,
        Commands::Verify { db } => return verify_cmd::run_verify(db, output_format),
        Commands::Reindex { db } => verify_cmd::run_reindex(db, output_format)?,
        Commands::Export {
            db,
            format,
            file,
            minify,
        } => {
            let config = ExportConfig::new(format.into()).with_minify(minify);
            export_cmd::run_export(db, config, file)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output_format = OutputFormat::from(cli.output);
    match run(cli.command, output_format) {
        Ok(code) => code,
        Err(e) => common::report_error(
            "command_failed",
            error_codes::classify(&e),
            &format!("{:#}", e),
            output_format,
        ),
    }
}
