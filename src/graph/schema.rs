//! Record types and table definitions for the call graph store
//!
//! Three record sets are persisted: nodes, edges, and the derived children
//! index. A single-row `topdown_meta` table carries the schema version and the
//! reference total of the last import.

use anyhow::Result;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

/// Schema version for every table this crate owns.
///
/// Version 1: nodes, edges keyed by child, children index keyed by (parent, child).
pub const TOPDOWN_SCHEMA_VERSION: i64 = 1;

/// One call-frame occurrence in the top-down tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallNode {
    /// Stable per-occurrence ID (see [`crate::ingest::node_id`])
    pub id: String,
    /// Stack label exactly as it appeared, indentation included
    pub raw_label: String,
    /// Stack label without surrounding whitespace
    pub short_name: String,
    /// Fully-qualified signature column; may be empty
    pub full_signature: String,
    /// Inclusive time in seconds
    pub total_time: f64,
    /// Exclusive time in seconds
    pub self_time: f64,
    /// Share of the reference total, in percent
    pub percentage: f64,
    /// Leading space count of `raw_label`
    pub indent_level: usize,
    /// 1-based line number in the imported file
    pub source_position: u64,
}

impl CallNode {
    /// Label to show when a short name is missing (decorative exports).
    pub fn display_name(&self) -> &str {
        if self.short_name.is_empty() {
            self.raw_label.as_str()
        } else {
            self.short_name.as_str()
        }
    }
}

/// Call relationship. `parent_id == None` marks a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEdge {
    pub parent_id: Option<String>,
    pub child_id: String,
}

impl CallEdge {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Column list shared by every `call_nodes` SELECT, in [`node_from_row`] order.
pub(crate) const NODE_COLUMNS: &str = "id, raw_label, short_name, full_signature, total_time, \
     self_time, percentage, indent_level, source_position";

/// Column list for `children_index` reads, aliased to the node layout.
pub(crate) const CHILD_INDEX_COLUMNS: &str = "child_id, child_raw_label, child_short_name, \
     child_full_signature, child_total_time, child_self_time, child_percentage, \
     child_indent_level, child_source_position";

/// Map a row selected with [`NODE_COLUMNS`] (or [`CHILD_INDEX_COLUMNS`]).
pub(crate) fn node_from_row(row: &rusqlite::Row) -> rusqlite::Result<CallNode> {
    Ok(CallNode {
        id: row.get(0)?,
        raw_label: row.get(1)?,
        short_name: row.get(2)?,
        full_signature: row.get(3)?,
        total_time: row.get(4)?,
        self_time: row.get(5)?,
        percentage: row.get(6)?,
        indent_level: row.get::<_, i64>(7)? as usize,
        source_position: row.get::<_, i64>(8)? as u64,
    })
}

/// Create all tables and indexes if missing.
pub fn ensure_schema(conn: &rusqlite::Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS call_nodes (
            id TEXT PRIMARY KEY,
            raw_label TEXT NOT NULL,
            short_name TEXT NOT NULL,
            full_signature TEXT NOT NULL,
            total_time REAL NOT NULL,
            self_time REAL NOT NULL,
            percentage REAL NOT NULL,
            indent_level INTEGER NOT NULL,
            source_position INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS call_edges (
            child_id TEXT PRIMARY KEY,
            parent_id TEXT,
            FOREIGN KEY (parent_id) REFERENCES call_nodes(id),
            FOREIGN KEY (child_id) REFERENCES call_nodes(id)
        );

        CREATE TABLE IF NOT EXISTS children_index (
            parent_id TEXT NOT NULL,
            child_id TEXT NOT NULL,
            child_raw_label TEXT NOT NULL,
            child_short_name TEXT NOT NULL,
            child_full_signature TEXT NOT NULL,
            child_total_time REAL NOT NULL,
            child_self_time REAL NOT NULL,
            child_percentage REAL NOT NULL,
            child_indent_level INTEGER NOT NULL,
            child_source_position INTEGER NOT NULL,
            PRIMARY KEY (parent_id, child_id)
        );

        CREATE TABLE IF NOT EXISTS topdown_meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            schema_version INTEGER NOT NULL,
            root_total_time REAL,
            source_path TEXT,
            imported_at TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_call_edges_parent ON call_edges(parent_id);
        CREATE INDEX IF NOT EXISTS idx_children_index_parent
            ON children_index(parent_id, child_total_time DESC);
        CREATE INDEX IF NOT EXISTS idx_children_index_child ON children_index(child_id);
        CREATE INDEX IF NOT EXISTS idx_call_nodes_total ON call_nodes(total_time DESC);
        CREATE INDEX IF NOT EXISTS idx_call_nodes_self ON call_nodes(self_time DESC);
        CREATE INDEX IF NOT EXISTS idx_call_nodes_percentage ON call_nodes(percentage);
        CREATE INDEX IF NOT EXISTS idx_call_nodes_short_name ON call_nodes(short_name);",
    )
    .map_err(|e| anyhow::anyhow!("Failed to create call graph schema: {}", e))?;

    conn.execute(
        "INSERT OR IGNORE INTO topdown_meta (id, schema_version) VALUES (1, ?1)",
        params![TOPDOWN_SCHEMA_VERSION],
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize topdown_meta: {}", e))?;

    Ok(())
}

/// Import metadata stored alongside the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportMeta {
    pub schema_version: i64,
    pub root_total_time: Option<f64>,
    pub source_path: Option<String>,
    pub imported_at: Option<String>,
}

pub fn read_meta(conn: &rusqlite::Connection) -> Result<Option<ImportMeta>> {
    conn.query_row(
        "SELECT schema_version, root_total_time, source_path, imported_at
         FROM topdown_meta WHERE id = 1",
        [],
        |row| {
            Ok(ImportMeta {
                schema_version: row.get(0)?,
                root_total_time: row.get(1)?,
                source_path: row.get(2)?,
                imported_at: row.get(3)?,
            })
        },
    )
    .optional()
    .map_err(|e| anyhow::anyhow!("Failed to read topdown_meta: {}", e))
}

pub fn write_meta(
    conn: &rusqlite::Connection,
    root_total_time: f64,
    source_path: Option<&str>,
) -> Result<()> {
    let imported_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    conn.execute(
        "UPDATE topdown_meta
         SET root_total_time = ?1, source_path = ?2, imported_at = ?3
         WHERE id = 1",
        params![root_total_time, source_path, imported_at],
    )
    .map_err(|e| anyhow::anyhow!("Failed to update topdown_meta: {}", e))?;
    Ok(())
}
