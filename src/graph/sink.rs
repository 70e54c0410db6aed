//! Write contract between the tree builder and a graph store

use anyhow::Result;
use rusqlite::params;

use super::children_index;
use super::schema::{CallEdge, CallNode};

/// Minimal write surface an importer needs.
///
/// Implementations must make `upsert_node` idempotent by ID and keep at most
/// one edge per child.
pub trait GraphSink {
    fn upsert_node(&mut self, node: &CallNode) -> Result<()>;

    fn insert_edge(&mut self, edge: &CallEdge) -> Result<()>;

    /// Record `child` in the children index of `parent_id`.
    fn append_child_index(&mut self, parent_id: &str, child: &CallNode) -> Result<()>;
}

/// [`GraphSink`] over an open SQLite transaction.
///
/// Nothing is visible to other connections until the caller commits.
pub struct SqliteSink<'conn> {
    conn: &'conn rusqlite::Connection,
}

impl<'conn> SqliteSink<'conn> {
    pub fn new(conn: &'conn rusqlite::Connection) -> Self {
        Self { conn }
    }

    /// Delete every node, edge, and index row.
    pub fn clear(&mut self) -> Result<()> {
        self.conn
            .execute_batch(
                "DELETE FROM children_index;
                 DELETE FROM call_edges;
                 DELETE FROM call_nodes;",
            )
            .map_err(|e| anyhow::anyhow!("Failed to clear call graph: {}", e))
    }
}

impl GraphSink for SqliteSink<'_> {
    fn upsert_node(&mut self, node: &CallNode) -> Result<()> {
        self.conn
            .prepare_cached(
                "INSERT OR REPLACE INTO call_nodes
                    (id, raw_label, short_name, full_signature, total_time, self_time,
                     percentage, indent_level, source_position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )
            .and_then(|mut stmt| {
                stmt.execute(params![
                    node.id,
                    node.raw_label,
                    node.short_name,
                    node.full_signature,
                    node.total_time,
                    node.self_time,
                    node.percentage,
                    node.indent_level as i64,
                    node.source_position as i64,
                ])
            })
            .map_err(|e| anyhow::anyhow!("Failed to upsert node {}: {}", node.id, e))?;
        Ok(())
    }

    fn insert_edge(&mut self, edge: &CallEdge) -> Result<()> {
        // A replaced edge may have pointed at another parent.
        children_index::remove_child(self.conn, &edge.child_id)?;
        self.conn
            .prepare_cached("INSERT OR REPLACE INTO call_edges (child_id, parent_id) VALUES (?1, ?2)")
            .and_then(|mut stmt| stmt.execute(params![edge.child_id, edge.parent_id]))
            .map_err(|e| anyhow::anyhow!("Failed to insert edge for {}: {}", edge.child_id, e))?;
        Ok(())
    }

    fn append_child_index(&mut self, parent_id: &str, child: &CallNode) -> Result<()> {
        children_index::append_entry(self.conn, parent_id, child)
    }
}
