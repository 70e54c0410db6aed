//! Show command: one node, its parent, and its immediate children

use anyhow::Result;
use std::path::PathBuf;
use std::process::ExitCode;

use topdown::error_codes::TD_QRY_001_NODE_NOT_FOUND;
use topdown::output::human::{node_details, print_node_table};
use topdown::output::{ChildrenResponse, ShowResponse};
use topdown::OutputFormat;

use crate::common::{emit_json, open_graph, report_error};

fn not_found(id: &str, output_format: OutputFormat) -> ExitCode {
    report_error(
        "not_found",
        TD_QRY_001_NODE_NOT_FOUND,
        &format!("node '{}' not found in database", id),
        output_format,
    )
}

pub fn run_show(db_path: PathBuf, id: String, output_format: OutputFormat) -> Result<ExitCode> {
    let graph = open_graph(&db_path)?;
    let Some(node) = graph.get_node(&id)? else {
        return Ok(not_found(&id, output_format));
    };
    let parent = graph.parent_of(&id)?;
    let children = graph.get_children(&id)?;

    if output_format.is_json() {
        emit_json(
            ShowResponse {
                node,
                parent,
                children,
            },
            output_format,
        )?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", node_details(&node));
    if let Some(parent) = parent {
        println!("  parent:     {} ({})", parent.display_name(), parent.id);
    }
    println!();
    if !children.is_empty() {
        println!("Immediate children ({})", children.len());
    }
    print_node_table(&children, "No children (leaf function)");
    Ok(ExitCode::SUCCESS)
}

pub fn run_children(db_path: PathBuf, id: String, output_format: OutputFormat) -> Result<ExitCode> {
    let graph = open_graph(&db_path)?;
    if graph.get_node(&id)?.is_none() {
        return Ok(not_found(&id, output_format));
    }
    let children = graph.get_children(&id)?;

    if output_format.is_json() {
        emit_json(
            ChildrenResponse {
                parent_id: id,
                children,
            },
            output_format,
        )?;
        return Ok(ExitCode::SUCCESS);
    }

    print_node_table(&children, "No children (leaf function)");
    Ok(ExitCode::SUCCESS)
}
