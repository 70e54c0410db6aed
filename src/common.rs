//! Shared helpers for command implementations

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

use topdown::output::{generate_execution_id, output_json, ErrorResponse, JsonResponse};
use topdown::{CallGraph, OutputFormat};

/// Wrap `data` in a [`JsonResponse`] and print it.
pub fn emit_json<T: Serialize>(data: T, output_format: OutputFormat) -> Result<()> {
    let response = JsonResponse::new(data, &generate_execution_id());
    output_json(&response, output_format)
}

/// Same as [`emit_json`], marking the response as truncated when `partial`.
pub fn emit_json_partial<T: Serialize>(
    data: T,
    partial: bool,
    output_format: OutputFormat,
) -> Result<()> {
    let response = JsonResponse::new(data, &generate_execution_id()).with_partial(partial);
    output_json(&response, output_format)
}

/// Report a failure with a stable code. JSON modes write an [`ErrorResponse`]
/// to stdout; human mode writes to stderr.
pub fn report_error(
    category: &str,
    code: &str,
    message: &str,
    output_format: OutputFormat,
) -> ExitCode {
    if output_format.is_json() {
        let response = ErrorResponse {
            error: category.to_string(),
            code: code.to_string(),
            message: message.to_string(),
        };
        if let Err(e) = emit_json(response, output_format) {
            eprintln!("Error: {}", e);
        }
    } else {
        eprintln!("Error [{}]: {}", code, message);
    }
    ExitCode::from(1)
}

/// Open an existing database for queries.
pub fn open_graph(db_path: &Path) -> Result<CallGraph> {
    CallGraph::open_read_only(db_path)
}
