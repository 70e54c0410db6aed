//! Verify and reindex command implementations

use anyhow::Result;
use std::path::PathBuf;
use std::process::ExitCode;

use topdown::error_codes::TD_V_001_GRAPH_INVALID;
use topdown::output::{ReindexResponse, ValidationResponse};
use topdown::{CallGraph, OutputFormat};

use crate::common::{emit_json, open_graph};

/// Exit status is 0 when no invariant is violated (warnings allowed), 1 otherwise.
pub fn run_verify(db_path: PathBuf, output_format: OutputFormat) -> Result<ExitCode> {
    let graph = open_graph(&db_path)?;
    let report = graph.validate()?;
    let passed = report.passed;

    if output_format.is_json() {
        emit_json(ValidationResponse::from(report), output_format)?;
    } else {
        println!("Graph verification: {}", db_path.display());
        for error in &report.errors {
            match &error.entity_id {
                Some(id) => println!("  error   {} {}: {}", error.code, id, error.message),
                None => println!("  error   {}: {}", error.code, error.message),
            }
        }
        for warning in &report.warnings {
            match &warning.entity_id {
                Some(id) => println!("  warning {} {}: {}", warning.code, id, warning.message),
                None => println!("  warning {}: {}", warning.code, warning.message),
            }
        }
        if passed {
            println!(
                "Graph is consistent ({} warnings)",
                report.warnings.len()
            );
        } else {
            eprintln!(
                "Error [{}]: {} invariant violations",
                TD_V_001_GRAPH_INVALID,
                report.errors.len()
            );
        }
    }

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

pub fn run_reindex(db_path: PathBuf, output_format: OutputFormat) -> Result<()> {
    if !db_path.exists() {
        anyhow::bail!("Database not found: {}", db_path.display());
    }
    let mut graph = CallGraph::open(&db_path)?;
    let rows = graph.rebuild_children_index()?;

    if output_format.is_json() {
        return emit_json(
            ReindexResponse {
                children_index_rows: rows,
            },
            output_format,
        );
    }

    println!("Rebuilt children index: {} rows", rows);
    Ok(())
}
