//! Find command: nodes by name, optionally with their children

use anyhow::Result;
use std::path::PathBuf;

use topdown::output::human::{node_details, print_node_table};
use topdown::output::{FindMatch, FindResponse};
use topdown::OutputFormat;

use crate::common::{emit_json, open_graph};

pub fn run_find(
    db_path: PathBuf,
    name: String,
    with_children: bool,
    output_format: OutputFormat,
) -> Result<()> {
    let graph = open_graph(&db_path)?;
    let matches = graph
        .find_nodes(&name)?
        .into_iter()
        .map(|node| {
            let children = if with_children {
                Some(graph.get_children(&node.id)?)
            } else {
                None
            };
            Ok(FindMatch { node, children })
        })
        .collect::<Result<Vec<_>>>()?;

    if output_format.is_json() {
        return emit_json(
            FindResponse {
                query_name: name,
                matches,
            },
            output_format,
        );
    }

    if matches.is_empty() {
        println!("No functions matching '{}'", name);
        return Ok(());
    }

    println!("Found {} match(es) for '{}'", matches.len(), name);
    for found in &matches {
        println!();
        println!("{}", node_details(&found.node));
        if let Some(children) = &found.children {
            println!();
            print_node_table(children, "  (no children)");
        }
    }
    Ok(())
}
