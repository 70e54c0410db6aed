//! Status command implementation

use anyhow::Result;
use std::path::PathBuf;

use topdown::output::{format_time, StatusResponse};
use topdown::OutputFormat;

use crate::common::{emit_json, open_graph};

/// Usage: topdown status --db <FILE>
pub fn run_status(db_path: PathBuf, output_format: OutputFormat) -> Result<()> {
    let graph = open_graph(&db_path)?;
    let counts = graph.counts()?;
    let meta = graph.meta()?;

    match output_format {
        OutputFormat::Json | OutputFormat::Pretty => {
            let response =
                StatusResponse::new(db_path.to_string_lossy().to_string(), counts, meta);
            emit_json(response, output_format)?;
        }
        OutputFormat::Human => {
            println!("nodes: {}", counts.nodes);
            println!("edges: {}", counts.edges);
            println!("roots: {}", counts.roots);
            println!("children_index_rows: {}", counts.children_index_rows);
            match counts.root_total_time {
                Some(total) => println!("root_total_time: {}", format_time(total)),
                None => println!("root_total_time: (never imported)"),
            }
            if let Some(meta) = meta {
                if let Some(source) = meta.source_path {
                    println!("source: {}", source);
                }
                if let Some(imported_at) = meta.imported_at {
                    println!("imported_at: {}", imported_at);
                }
            }
        }
    }

    Ok(())
}
