//! Import orchestration: export -> tree builder -> graph sink
//!
//! # Guarantees
//! - The reference total is fixed before the first node is built
//! - Rows are processed in file order, so every parent precedes its children
//! - Malformed rows are counted, never fatal

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::graph::{CallGraph, GraphSink};
use crate::ingest::{parse_row, ImportConfig, ProfileExport, ReferenceTotal, RowOutcome, SkipReason, TreeBuilder};

/// Summary of one import run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Nodes written (one per accepted row)
    pub rows_imported: usize,
    /// Nodes written without a parent
    pub roots: usize,
    pub skipped_blank: usize,
    /// Lines with fewer than four fields
    pub skipped_malformed: usize,
    /// Time fields that failed to parse and were stored as 0.0
    pub coerced_fields: usize,
    /// Denominator used for every percentage
    pub root_total_time: f64,
    /// Whether `root_total_time` is the fallback rather than a parsed value
    pub total_substituted: bool,
    pub header_found: bool,
    /// Longest root-to-leaf chain, in nodes
    pub max_depth: usize,
}

/// Drive one export through a [`TreeBuilder`] into `sink`.
///
/// The sink receives, per row: the node, its edge, then (for non-roots) the
/// children-index entry under its parent.
pub fn run_import<S: GraphSink>(
    sink: &mut S,
    export: &ProfileExport,
    config: &ImportConfig,
) -> Result<ImportReport> {
    if !export.header_found() {
        tracing::warn!(
            marker = %config.header_marker,
            source = ?export.source(),
            "header marker not found; no rows imported"
        );
    }

    let reference = ReferenceTotal::from_export(export, config.delimiter);
    let mut builder = TreeBuilder::new(reference);
    let mut report = ImportReport {
        root_total_time: reference.value(),
        total_substituted: reference.substituted(),
        header_found: export.header_found(),
        ..ImportReport::default()
    };

    for line in export.lines() {
        let row = match parse_row(&line.text, line.position, config.delimiter) {
            RowOutcome::Row(row) => row,
            RowOutcome::Skip(reason) => {
                match reason {
                    SkipReason::Blank => report.skipped_blank += 1,
                    SkipReason::TooFewFields => {
                        tracing::debug!(line = line.position, "skipping row with too few fields");
                        report.skipped_malformed += 1;
                    }
                }
                continue;
            }
        };

        if row.coerced_fields > 0 {
            tracing::debug!(
                line = line.position,
                fields = row.coerced_fields,
                "non-numeric time stored as 0.0"
            );
            report.coerced_fields += usize::from(row.coerced_fields);
        }

        let (node, edge) = builder.push(row);
        sink.upsert_node(&node)?;
        sink.insert_edge(&edge)?;
        match edge.parent_id.as_deref() {
            Some(parent_id) => sink.append_child_index(parent_id, &node)?,
            None => report.roots += 1,
        }
        report.rows_imported += 1;
    }

    report.max_depth = builder.max_depth();

    tracing::info!(
        rows = report.rows_imported,
        roots = report.roots,
        skipped = report.skipped_blank + report.skipped_malformed,
        root_total_time = report.root_total_time,
        "import complete"
    );

    Ok(report)
}

/// Default database location: the input path with a `.db` extension.
pub fn default_db_path(input: &Path) -> PathBuf {
    input.with_extension("db")
}

/// Read `input_path` and import it into the database at `db_path`.
///
/// The input is read completely before the database is opened for writing,
/// so an unreadable input leaves the store untouched.
pub fn import_file(db_path: &Path, input_path: &Path, config: &ImportConfig) -> Result<ImportReport> {
    let export = ProfileExport::read(input_path, config)?;
    let mut graph = CallGraph::open(db_path)?;
    graph.import(&export, config)
}
