//! Materialized children index
//!
//! `children_index` duplicates each child's displayed fields under its
//! parent's ID so that drill-down is one indexed equality lookup. It is a
//! cache: [`rebuild`] derives it entirely from `call_nodes` + `call_edges`.

use anyhow::Result;
use rusqlite::params;

use super::schema::CallNode;

pub(crate) fn append_entry(
    conn: &rusqlite::Connection,
    parent_id: &str,
    child: &CallNode,
) -> Result<()> {
    conn.prepare_cached(
        "INSERT OR REPLACE INTO children_index
            (parent_id, child_id, child_raw_label, child_short_name, child_full_signature,
             child_total_time, child_self_time, child_percentage, child_indent_level,
             child_source_position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )
    .and_then(|mut stmt| {
        stmt.execute(params![
            parent_id,
            child.id,
            child.raw_label,
            child.short_name,
            child.full_signature,
            child.total_time,
            child.self_time,
            child.percentage,
            child.indent_level as i64,
            child.source_position as i64,
        ])
    })
    .map_err(|e| {
        anyhow::anyhow!(
            "Failed to index child {} under {}: {}",
            child.id,
            parent_id,
            e
        )
    })?;
    Ok(())
}

pub(crate) fn remove_child(conn: &rusqlite::Connection, child_id: &str) -> Result<()> {
    conn.prepare_cached("DELETE FROM children_index WHERE child_id = ?1")
        .and_then(|mut stmt| stmt.execute(params![child_id]))
        .map_err(|e| anyhow::anyhow!("Failed to drop index rows for {}: {}", child_id, e))?;
    Ok(())
}

/// Recompute the whole index from nodes and edges. Returns the row count.
pub fn rebuild(conn: &rusqlite::Connection) -> Result<usize> {
    conn.execute("DELETE FROM children_index", [])
        .map_err(|e| anyhow::anyhow!("Failed to clear children index: {}", e))?;

    let inserted = conn
        .execute(
            "INSERT INTO children_index
                (parent_id, child_id, child_raw_label, child_short_name, child_full_signature,
                 child_total_time, child_self_time, child_percentage, child_indent_level,
                 child_source_position)
             SELECT e.parent_id, n.id, n.raw_label, n.short_name, n.full_signature,
                    n.total_time, n.self_time, n.percentage, n.indent_level, n.source_position
             FROM call_edges e
             JOIN call_nodes n ON n.id = e.child_id
             WHERE e.parent_id IS NOT NULL",
            [],
        )
        .map_err(|e| anyhow::anyhow!("Failed to rebuild children index: {}", e))?;

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::schema::ensure_schema;
    use crate::graph::sink::{GraphSink, SqliteSink};
    use crate::graph::CallEdge;

    fn node(id: &str, total: f64) -> CallNode {
        CallNode {
            id: id.to_string(),
            raw_label: id.to_string(),
            short_name: id.to_string(),
            full_signature: format!("{}()", id),
            total_time: total,
            self_time: 0.0,
            percentage: total,
            indent_level: 0,
            source_position: 1,
        }
    }

    fn index_rows(conn: &rusqlite::Connection) -> Vec<(String, String)> {
        let mut stmt = conn
            .prepare("SELECT parent_id, child_id FROM children_index ORDER BY parent_id, child_id")
            .unwrap();
        stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_rebuild_matches_edges() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let mut sink = SqliteSink::new(&conn);
        for (id, parent) in [("r", None), ("a", Some("r")), ("b", Some("r")), ("c", Some("a"))] {
            sink.upsert_node(&node(id, 1.0)).unwrap();
            sink.insert_edge(&CallEdge {
                parent_id: parent.map(str::to_string),
                child_id: id.to_string(),
            })
            .unwrap();
        }

        assert!(index_rows(&conn).is_empty());
        assert_eq!(rebuild(&conn).unwrap(), 3);
        assert_eq!(
            index_rows(&conn),
            vec![
                ("a".to_string(), "c".to_string()),
                ("r".to_string(), "a".to_string()),
                ("r".to_string(), "b".to_string()),
            ]
        );

        // Rebuilding again is stable.
        assert_eq!(rebuild(&conn).unwrap(), 3);
    }

    #[test]
    fn test_remove_child_uses_child_index() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let mut stmt = conn
            .prepare("EXPLAIN QUERY PLAN DELETE FROM children_index WHERE child_id = ?1")
            .unwrap();
        let plan: Vec<String> = stmt
            .query_map(["c"], |row| row.get(3))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert!(
            plan.iter().any(|step| step.contains("idx_children_index_child")),
            "{:?}",
            plan
        );
        assert!(!plan.iter().any(|step| step.starts_with("SCAN")), "{:?}", plan);
    }

    #[test]
    fn test_reparented_edge_drops_stale_entry() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let mut sink = SqliteSink::new(&conn);
        let child = node("c", 2.0);
        sink.upsert_node(&child).unwrap();
        sink.insert_edge(&CallEdge {
            parent_id: Some("p1".to_string()),
            child_id: "c".to_string(),
        })
        .unwrap();
        sink.append_child_index("p1", &child).unwrap();

        sink.insert_edge(&CallEdge {
            parent_id: Some("p2".to_string()),
            child_id: "c".to_string(),
        })
        .unwrap();
        sink.append_child_index("p2", &child).unwrap();

        assert_eq!(index_rows(&conn), vec![("p2".to_string(), "c".to_string())]);
    }
}
