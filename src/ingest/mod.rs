//! Text ingestion: export reading, row parsing, normalization, tree building
//!
//! The pipeline is two-pass over a buffered export:
//! 1. [`ProfileExport`] drops the header block and keeps numbered lines.
//! 2. [`ReferenceTotal`] reads the grand total from the first data line.
//! 3. [`parse_row`] + [`TreeBuilder`] turn each line into a node and edge.

pub mod builder;
pub mod export;
pub mod normalize;
pub mod row;

pub use builder::{node_id, TreeBuilder};
pub use export::{DataLine, ProfileExport};
pub use normalize::{ReferenceTotal, FALLBACK_TOTAL};
pub use row::{count_leading_spaces, parse_row, ParsedRow, RowOutcome, SkipReason};

use std::path::PathBuf;

/// Marker that starts the column-header line of a VTune top-down CSV export.
pub const DEFAULT_HEADER_MARKER: &str = "Function Stack;";

pub const DEFAULT_DELIMITER: char = ';';

/// Explicit import settings; nothing is read from process-wide state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// Prefix identifying the column-header line
    pub header_marker: String,
    /// Field delimiter for data rows
    pub delimiter: char,
    /// Clear all stored nodes, edges, and index rows before writing
    pub fresh: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            header_marker: DEFAULT_HEADER_MARKER.to_string(),
            delimiter: DEFAULT_DELIMITER,
            fresh: false,
        }
    }
}

/// Fatal ingestion failures. Malformed rows are never errors.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("cannot read profile export {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
