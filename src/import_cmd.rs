//! Import command implementation

use anyhow::Result;
use std::path::PathBuf;

use topdown::output::{format_time, ImportResponse};
use topdown::{default_db_path, import_file, ImportConfig, OutputFormat};

use crate::common::emit_json;

pub fn run_import(
    input: PathBuf,
    db_path: Option<PathBuf>,
    config: ImportConfig,
    output_format: OutputFormat,
) -> Result<()> {
    let db_path = db_path.unwrap_or_else(|| default_db_path(&input));
    let report = import_file(&db_path, &input, &config)?;

    if output_format.is_json() {
        return emit_json(
            ImportResponse {
                input: input.to_string_lossy().to_string(),
                database: db_path.to_string_lossy().to_string(),
                report,
            },
            output_format,
        );
    }

    println!(
        "Imported {} rows from {} into {}",
        report.rows_imported,
        input.display(),
        db_path.display()
    );
    println!("  roots:          {}", report.roots);
    println!("  max depth:      {}", report.max_depth);
    println!(
        "  skipped:        {} blank, {} malformed",
        report.skipped_blank, report.skipped_malformed
    );
    if report.coerced_fields > 0 {
        println!("  coerced fields: {} (stored as 0.0)", report.coerced_fields);
    }
    let note = if report.total_substituted {
        " (substituted: reference row missing or zero)"
    } else {
        ""
    };
    println!("  reference:      {}{}", format_time(report.root_total_time), note);
    if !report.header_found {
        println!(
            "  warning:        header line starting with {:?} not found",
            config.header_marker
        );
    }
    Ok(())
}
