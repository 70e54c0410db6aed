//! Whole-graph export to JSON, JSON Lines, or CSV
//!
//! Every format lists nodes in file order with their parent ID, so the tree
//! can be rebuilt without the database.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::schema::{node_from_row, read_meta, CallNode, NODE_COLUMNS};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// One JSON document with metadata and a node array
    #[default]
    Json,
    /// JSON Lines format (one node record per line)
    JsonL,
    /// Comma-separated values with a header row
    Csv,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "jsonl" | "ndjson" => Some(ExportFormat::JsonL),
            "csv" => Some(ExportFormat::Csv),
            _ => None,
        }
    }
}

/// Configuration for graph export
#[derive(Debug, Clone, Default)]
pub struct ExportConfig {
    pub format: ExportFormat,
    /// Compact JSON instead of pretty-printed (ignored for JSONL and CSV)
    pub minify: bool,
}

impl ExportConfig {
    pub fn new(format: ExportFormat) -> Self {
        ExportConfig {
            format,
            ..Default::default()
        }
    }

    pub fn with_minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }
}

/// One node with its parent, flattened for tabular formats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub parent_id: Option<String>,
    pub short_name: String,
    pub full_signature: String,
    pub total_time: f64,
    pub self_time: f64,
    pub percentage: f64,
    pub indent_level: usize,
    pub source_position: u64,
}

impl NodeRecord {
    fn new(node: CallNode, parent_id: Option<String>) -> Self {
        NodeRecord {
            id: node.id,
            parent_id,
            short_name: node.short_name,
            full_signature: node.full_signature,
            total_time: node.total_time,
            self_time: node.self_time,
            percentage: node.percentage,
            indent_level: node.indent_level,
            source_position: node.source_position,
        }
    }
}

/// JSON export document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphExport {
    pub source_path: Option<String>,
    pub root_total_time: Option<f64>,
    pub nodes: Vec<NodeRecord>,
}

/// All nodes with their parent, in file order.
pub fn node_records(conn: &rusqlite::Connection) -> Result<Vec<NodeRecord>> {
    let qualified: Vec<String> = NODE_COLUMNS
        .split(',')
        .map(|col| format!("n.{}", col.trim()))
        .collect();
    let sql = format!(
        "SELECT {}, e.parent_id FROM call_nodes n
         LEFT JOIN call_edges e ON e.child_id = n.id
         ORDER BY n.source_position ASC, n.id ASC",
        qualified.join(", ")
    );

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| anyhow::anyhow!("Failed to prepare export query: {}", e))?;
    let records = stmt
        .query_map([], |row| {
            let node = node_from_row(row)?;
            let parent_id: Option<String> = row.get(9)?;
            Ok(NodeRecord::new(node, parent_id))
        })
        .map_err(|e| anyhow::anyhow!("Failed to read nodes for export: {}", e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow::anyhow!("Failed to collect nodes for export: {}", e))?;
    Ok(records)
}

/// Render the whole graph in the configured format.
pub fn export_graph(conn: &rusqlite::Connection, config: &ExportConfig) -> Result<String> {
    let nodes = node_records(conn)?;
    match config.format {
        ExportFormat::Json => {
            let meta = read_meta(conn)?;
            let export = GraphExport {
                source_path: meta.as_ref().and_then(|m| m.source_path.clone()),
                root_total_time: meta.and_then(|m| m.root_total_time),
                nodes,
            };
            if config.minify {
                serde_json::to_string(&export).map_err(Into::into)
            } else {
                serde_json::to_string_pretty(&export).map_err(Into::into)
            }
        }
        ExportFormat::JsonL => {
            let lines = nodes
                .iter()
                .map(serde_json::to_string)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(lines.join("\n"))
        }
        ExportFormat::Csv => export_csv(&nodes),
    }
}

fn export_csv(nodes: &[NodeRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in nodes {
        writer
            .serialize(record)
            .map_err(|e| anyhow::anyhow!("Failed to write CSV row for {}: {}", record.id, e))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV export: {}", e))?;
    String::from_utf8(bytes).map_err(|e| anyhow::anyhow!("CSV export is not UTF-8: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::schema::ensure_schema;

    fn sample() -> rusqlite::Connection {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO call_nodes VALUES ('b', ' work', 'work', 'ns::work(int, char)', 6.0, 6.0, 60.0, 1, 3);
             INSERT INTO call_nodes VALUES ('a', 'main', 'main', 'main()', 10.0, 4.0, 100.0, 0, 2);
             INSERT INTO call_edges VALUES ('a', NULL);
             INSERT INTO call_edges VALUES ('b', 'a');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(ExportFormat::from_str("JSONL"), Some(ExportFormat::JsonL));
        assert_eq!(ExportFormat::from_str("csv"), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::from_str("dot"), None);
    }

    #[test]
    fn test_records_are_in_file_order_with_parents() {
        let records = node_records(&sample()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "a");
        assert_eq!(records[0].parent_id, None);
        assert_eq!(records[1].parent_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_jsonl_has_one_line_per_node() {
        let out = export_graph(&sample(), &ExportConfig::new(ExportFormat::JsonL)).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["short_name"], "work");
        assert_eq!(second["parent_id"], "a");
    }

    #[test]
    fn test_csv_quotes_signatures_with_commas() {
        let out = export_graph(&sample(), &ExportConfig::new(ExportFormat::Csv)).unwrap();
        let mut lines = out.lines();
        assert!(lines.next().unwrap().starts_with("id,parent_id,short_name"));
        assert!(lines.next().unwrap().starts_with("a,,main,main()"));
        assert!(out.contains("\"ns::work(int, char)\""));
    }

    #[test]
    fn test_json_includes_meta() {
        let conn = sample();
        crate::graph::schema::write_meta(&conn, 10.0, Some("run.csv")).unwrap();
        let out = export_graph(&conn, &ExportConfig::new(ExportFormat::Json).with_minify(true))
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["source_path"], "run.csv");
        assert_eq!(parsed["root_total_time"], 10.0);
        assert_eq!(parsed["nodes"].as_array().unwrap().len(), 2);
    }
}
