//! topdown: rebuild the call tree of a top-down profiling export
//!
//! A top-down export (e.g. VTune's "Function Stack" CSV) flattens a call tree
//! into one row per frame, encoding nesting only through leading spaces on
//! the stack label. topdown reads such an export, reconstructs the tree with
//! an indentation stack, and stores it in SQLite for navigation.
//!
//! # Position Conventions
//!
//! - **Source positions** are 1-based physical line numbers in the input
//!   file, header and preamble lines included.
//! - **Indent levels** count leading U+0020 characters only.
//!
//! # Identity
//!
//! A node's ID is derived from its signature and source position, so the
//! same function called from two places yields two nodes. See
//! [`ingest::node_id`].
//!
//! # Example
//!
//! ```
//! use topdown::{CallGraph, ImportConfig, ProfileExport};
//!
//! let text = "Function Stack;CPU Time:Total;CPU Time:Self;Function\n\
//!             main;10.0;2.0;main()\n \
//!             work;6.0;6.0;work()\n";
//! let config = ImportConfig::default();
//! let export = ProfileExport::from_text(text, &config);
//!
//! let mut graph = CallGraph::open_in_memory().unwrap();
//! let report = graph.import(&export, &config).unwrap();
//! assert_eq!(report.rows_imported, 2);
//!
//! let root = &graph.roots().unwrap()[0];
//! let children = graph.get_children(&root.id).unwrap();
//! assert_eq!(children[0].short_name, "work");
//! assert_eq!(children[0].percentage, 60.0);
//! ```

pub mod error_codes;
pub mod graph;
pub mod importer;
pub mod ingest;
pub mod output;
pub mod version;

pub use graph::{
    CallEdge, CallGraph, CallNode, ExportConfig, ExportFormat, GraphCounts, GraphSink, SortKey,
    SqliteSink, StoreError, ValidationReport,
};
pub use importer::{default_db_path, import_file, run_import, ImportReport};
pub use ingest::{ImportConfig, IngestError, ProfileExport};
pub use output::OutputFormat;
