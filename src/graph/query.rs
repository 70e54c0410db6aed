//! Read queries over an imported call graph
//!
//! Every ordering is total: ties fall back to `source_position` so repeated
//! calls return identical sequences.

use anyhow::Result;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::schema::{node_from_row, CallNode, CHILD_INDEX_COLUMNS, NODE_COLUMNS};

/// Sort order for [`list_nodes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Inclusive time, largest first
    #[default]
    Total,
    /// Exclusive time, largest first
    #[serde(rename = "self")]
    SelfTime,
    /// Short name, A to Z
    Name,
}

impl SortKey {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "total" | "total_time" => Some(SortKey::Total),
            "self" | "self_time" => Some(SortKey::SelfTime),
            "name" | "short_name" => Some(SortKey::Name),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Total => "total",
            SortKey::SelfTime => "self",
            SortKey::Name => "name",
        }
    }

    fn order_by(&self) -> &'static str {
        match self {
            SortKey::Total => "total_time DESC, source_position ASC",
            SortKey::SelfTime => "self_time DESC, source_position ASC",
            SortKey::Name => "short_name ASC, source_position ASC",
        }
    }
}

/// Row counts and stored reference total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphCounts {
    pub nodes: usize,
    pub edges: usize,
    pub roots: usize,
    pub children_index_rows: usize,
    pub root_total_time: Option<f64>,
}

fn collect_nodes(
    conn: &rusqlite::Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<CallNode>> {
    let mut stmt = conn
        .prepare_cached(sql)
        .map_err(|e| anyhow::anyhow!("Failed to prepare query: {}", e))?;
    let nodes = stmt
        .query_map(params, node_from_row)
        .map_err(|e| anyhow::anyhow!("Failed to query nodes: {}", e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow::anyhow!("Failed to collect nodes: {}", e))?;
    Ok(nodes)
}

/// All nodes in the requested order, optionally truncated.
pub fn list_nodes(
    conn: &rusqlite::Connection,
    sort: SortKey,
    limit: Option<usize>,
) -> Result<Vec<CallNode>> {
    // SQLite treats a negative LIMIT as "no limit".
    let limit = limit.map(|n| n as i64).unwrap_or(-1);
    let sql = format!(
        "SELECT {} FROM call_nodes ORDER BY {} LIMIT ?1",
        NODE_COLUMNS,
        sort.order_by()
    );
    collect_nodes(conn, &sql, params![limit])
}

/// A node by ID; `None` when absent.
pub fn get_node(conn: &rusqlite::Connection, id: &str) -> Result<Option<CallNode>> {
    let sql = format!("SELECT {} FROM call_nodes WHERE id = ?1", NODE_COLUMNS);
    conn.prepare_cached(&sql)
        .and_then(|mut stmt| stmt.query_row(params![id], node_from_row).optional())
        .map_err(|e| anyhow::anyhow!("Failed to query node {}: {}", id, e))
}

/// Immediate children of `parent_id`, read from the children index.
pub fn get_children(conn: &rusqlite::Connection, parent_id: &str) -> Result<Vec<CallNode>> {
    let sql = format!(
        "SELECT {} FROM children_index WHERE parent_id = ?1
         ORDER BY child_total_time DESC, child_source_position ASC",
        CHILD_INDEX_COLUMNS
    );
    collect_nodes(conn, &sql, params![parent_id])
}

/// Immediate children computed from edges, bypassing the index.
pub fn children_direct(conn: &rusqlite::Connection, parent_id: &str) -> Result<Vec<CallNode>> {
    let sql = format!(
        "SELECT {} FROM call_nodes WHERE id IN
            (SELECT child_id FROM call_edges WHERE parent_id = ?1)
         ORDER BY total_time DESC, source_position ASC",
        NODE_COLUMNS
    );
    collect_nodes(conn, &sql, params![parent_id])
}

/// Nodes whose edge has no parent, in file order.
pub fn roots(conn: &rusqlite::Connection) -> Result<Vec<CallNode>> {
    let sql = format!(
        "SELECT {} FROM call_nodes WHERE id IN
            (SELECT child_id FROM call_edges WHERE parent_id IS NULL)
         ORDER BY source_position ASC",
        NODE_COLUMNS
    );
    collect_nodes(conn, &sql, [])
}

/// The parent of `id`, if it has one.
pub fn parent_of(conn: &rusqlite::Connection, id: &str) -> Result<Option<CallNode>> {
    let parent_id: Option<String> = conn
        .query_row(
            "SELECT parent_id FROM call_edges WHERE child_id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| anyhow::anyhow!("Failed to query parent of {}: {}", id, e))?
        .flatten();

    match parent_id {
        Some(parent_id) => get_node(conn, &parent_id),
        None => Ok(None),
    }
}

/// Nodes whose short name or signature contains `pattern`, in file order.
pub fn find_nodes(conn: &rusqlite::Connection, pattern: &str) -> Result<Vec<CallNode>> {
    let sql = format!(
        "SELECT {} FROM call_nodes
         WHERE instr(short_name, ?1) > 0 OR instr(full_signature, ?1) > 0
         ORDER BY source_position ASC",
        NODE_COLUMNS
    );
    collect_nodes(conn, &sql, params![pattern])
}

fn count(conn: &rusqlite::Connection, sql: &str) -> Result<usize> {
    let n: i64 = conn
        .query_row(sql, [], |row| row.get(0))
        .map_err(|e| anyhow::anyhow!("Failed to count rows: {}", e))?;
    Ok(n as usize)
}

pub fn counts(conn: &rusqlite::Connection) -> Result<GraphCounts> {
    let root_total_time: Option<f64> = conn
        .query_row(
            "SELECT root_total_time FROM topdown_meta WHERE id = 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| anyhow::anyhow!("Failed to read root total: {}", e))?
        .flatten();

    Ok(GraphCounts {
        nodes: count(conn, "SELECT COUNT(*) FROM call_nodes")?,
        edges: count(conn, "SELECT COUNT(*) FROM call_edges")?,
        roots: count(conn, "SELECT COUNT(*) FROM call_edges WHERE parent_id IS NULL")?,
        children_index_rows: count(conn, "SELECT COUNT(*) FROM children_index")?,
        root_total_time,
    })
}
