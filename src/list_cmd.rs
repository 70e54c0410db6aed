//! List command implementation

use anyhow::Result;
use std::path::PathBuf;

use topdown::output::human::print_node_table;
use topdown::output::{ListResponse, RootsResponse};
use topdown::{OutputFormat, SortKey};

use crate::common::{emit_json, emit_json_partial, open_graph};

pub fn run_list(
    db_path: PathBuf,
    sort: SortKey,
    limit: Option<usize>,
    output_format: OutputFormat,
) -> Result<()> {
    let graph = open_graph(&db_path)?;
    let nodes = graph.list_nodes(sort, limit)?;

    if output_format.is_json() {
        let partial = match limit {
            Some(limit) => nodes.len() == limit && graph.counts()?.nodes > limit,
            None => false,
        };
        return emit_json_partial(
            ListResponse {
                sort: sort.as_str().to_string(),
                limit,
                nodes,
            },
            partial,
            output_format,
        );
    }

    print_node_table(&nodes, "No functions in database");
    Ok(())
}

pub fn run_roots(db_path: PathBuf, output_format: OutputFormat) -> Result<()> {
    let graph = open_graph(&db_path)?;
    let roots = graph.roots()?;

    if output_format.is_json() {
        return emit_json(RootsResponse { roots }, output_format);
    }

    print_node_table(&roots, "No functions in database");
    Ok(())
}
