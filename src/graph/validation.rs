//! Post-import invariant checks
//!
//! The builder guarantees a forest by construction; these checks catch stores
//! that were edited by hand, merged from several imports, or interrupted.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const ORPHAN_NODE: &str = "ORPHAN_NODE";
pub const DANGLING_EDGE: &str = "DANGLING_EDGE";
pub const CYCLE: &str = "CYCLE";
pub const CHILDREN_INDEX_MISMATCH: &str = "CHILDREN_INDEX_MISMATCH";
pub const SELF_EXCEEDS_TOTAL: &str = "SELF_EXCEEDS_TOTAL";

/// One finding with a stable SCREAMING_SNAKE_CASE code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl ValidationIssue {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        ValidationIssue {
            code: code.to_string(),
            message: message.into(),
            entity_id: None,
            details: serde_json::Value::Null,
        }
    }

    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

/// Errors break a documented invariant; warnings flag suspicious input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn total_issues(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }

    pub fn is_clean(&self) -> bool {
        self.total_issues() == 0
    }

    fn from_issues(mut errors: Vec<ValidationIssue>, mut warnings: Vec<ValidationIssue>) -> Self {
        let by_code = |a: &ValidationIssue, b: &ValidationIssue| {
            a.code
                .cmp(&b.code)
                .then_with(|| a.entity_id.cmp(&b.entity_id))
                .then_with(|| a.message.cmp(&b.message))
        };
        errors.sort_by(by_code);
        warnings.sort_by(by_code);
        ValidationReport {
            passed: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Run every check against an open store.
pub fn validate_graph(conn: &rusqlite::Connection) -> Result<ValidationReport> {
    let mut errors = Vec::new();
    errors.extend(check_orphan_nodes(conn)?);
    errors.extend(check_dangling_edges(conn)?);
    errors.extend(check_cycles(conn)?);
    errors.extend(check_children_index(conn)?);

    let warnings = check_self_exceeds_total(conn)?;

    Ok(ValidationReport::from_issues(errors, warnings))
}

fn string_column(conn: &rusqlite::Connection, sql: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| anyhow::anyhow!("Failed to prepare validation query: {}", e))?;
    let values = stmt
        .query_map([], |row| row.get(0))
        .map_err(|e| anyhow::anyhow!("Failed to run validation query: {}", e))?
        .collect::<Result<Vec<String>, _>>()
        .map_err(|e| anyhow::anyhow!("Failed to collect validation rows: {}", e))?;
    Ok(values)
}

fn check_orphan_nodes(conn: &rusqlite::Connection) -> Result<Vec<ValidationIssue>> {
    let ids = string_column(
        conn,
        "SELECT id FROM call_nodes WHERE id NOT IN (SELECT child_id FROM call_edges)",
    )?;
    Ok(ids
        .into_iter()
        .map(|id| {
            ValidationIssue::new(ORPHAN_NODE, "node has no edge (neither root nor child)")
                .with_entity_id(id)
        })
        .collect())
}

fn check_dangling_edges(conn: &rusqlite::Connection) -> Result<Vec<ValidationIssue>> {
    let mut issues: Vec<ValidationIssue> = string_column(
        conn,
        "SELECT child_id FROM call_edges WHERE child_id NOT IN (SELECT id FROM call_nodes)",
    )?
    .into_iter()
    .map(|id| ValidationIssue::new(DANGLING_EDGE, "edge child is not a stored node").with_entity_id(id))
    .collect();

    let unknown_parents = string_column(
        conn,
        "SELECT child_id FROM call_edges
         WHERE parent_id IS NOT NULL AND parent_id NOT IN (SELECT id FROM call_nodes)",
    )?;
    issues.extend(unknown_parents.into_iter().map(|id| {
        ValidationIssue::new(DANGLING_EDGE, "edge parent is not a stored node").with_entity_id(id)
    }));
    Ok(issues)
}

/// Follow parent pointers from every node; a walk longer than the edge count
/// or one that revisits a node is a cycle.
fn check_cycles(conn: &rusqlite::Connection) -> Result<Vec<ValidationIssue>> {
    let mut stmt = conn
        .prepare("SELECT child_id, parent_id FROM call_edges WHERE parent_id IS NOT NULL")
        .map_err(|e| anyhow::anyhow!("Failed to prepare edge scan: {}", e))?;
    let parents: HashMap<String, String> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(|e| anyhow::anyhow!("Failed to scan edges: {}", e))?
        .collect::<Result<_, _>>()
        .map_err(|e| anyhow::anyhow!("Failed to collect edges: {}", e))?;

    let mut reported: HashSet<String> = HashSet::new();
    let mut acyclic: HashSet<&str> = HashSet::new();
    let mut issues = Vec::new();

    let mut starts: Vec<&String> = parents.keys().collect();
    starts.sort();

    for start in starts {
        let mut path: Vec<&str> = Vec::new();
        let mut on_path: HashSet<&str> = HashSet::new();
        let mut current: Option<&str> = Some(start.as_str());

        while let Some(id) = current {
            if acyclic.contains(id) {
                break;
            }
            if !on_path.insert(id) {
                // `id` closes a loop; report it once by its smallest member.
                let loop_start = path.iter().position(|p| *p == id).unwrap_or(0);
                let mut members: Vec<&str> = path[loop_start..].to_vec();
                members.sort_unstable();
                if let Some(first) = members.first() {
                    if reported.insert((*first).to_string()) {
                        issues.push(
                            ValidationIssue::new(CYCLE, "parent chain loops back on itself")
                                .with_entity_id(*first)
                                .with_details(serde_json::json!({ "members": members })),
                        );
                    }
                }
                path.clear();
                break;
            }
            path.push(id);
            current = parents.get(id).map(String::as_str);
        }

        acyclic.extend(path);
    }

    Ok(issues)
}

fn check_children_index(conn: &rusqlite::Connection) -> Result<Vec<ValidationIssue>> {
    let missing = string_column(
        conn,
        "SELECT e.parent_id FROM call_edges e
         JOIN call_nodes n ON n.id = e.child_id
         WHERE e.parent_id IS NOT NULL
           AND NOT EXISTS (
             SELECT 1 FROM children_index c
             WHERE c.parent_id = e.parent_id AND c.child_id = e.child_id
               AND c.child_raw_label = n.raw_label
               AND c.child_short_name = n.short_name
               AND c.child_full_signature = n.full_signature
               AND c.child_total_time = n.total_time
               AND c.child_self_time = n.self_time
               AND c.child_percentage = n.percentage
               AND c.child_indent_level = n.indent_level
               AND c.child_source_position = n.source_position)",
    )?;
    let extra = string_column(
        conn,
        "SELECT c.parent_id FROM children_index c
         WHERE NOT EXISTS (
             SELECT 1 FROM call_edges e
             WHERE e.parent_id = c.parent_id AND e.child_id = c.child_id)",
    )?;

    let mut parents: Vec<String> = missing.into_iter().chain(extra).collect();
    parents.sort();
    parents.dedup();

    Ok(parents
        .into_iter()
        .map(|parent| {
            ValidationIssue::new(
                CHILDREN_INDEX_MISMATCH,
                "children index differs from edges; run `topdown reindex`",
            )
            .with_entity_id(parent)
        })
        .collect())
}

fn check_self_exceeds_total(conn: &rusqlite::Connection) -> Result<Vec<ValidationIssue>> {
    let ids = string_column(conn, "SELECT id FROM call_nodes WHERE self_time > total_time")?;
    Ok(ids
        .into_iter()
        .map(|id| {
            ValidationIssue::new(SELF_EXCEEDS_TOTAL, "self time is larger than total time")
                .with_entity_id(id)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::schema::ensure_schema;

    fn store() -> rusqlite::Connection {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn
    }

    fn add_node(conn: &rusqlite::Connection, id: &str, total: f64, self_time: f64) {
        conn.execute(
            "INSERT INTO call_nodes VALUES (?1, ?1, ?1, '', ?2, ?3, 0, 0, 1)",
            rusqlite::params![id, total, self_time],
        )
        .unwrap();
    }

    fn add_edge(conn: &rusqlite::Connection, parent: Option<&str>, child: &str) {
        conn.execute(
            "INSERT INTO call_edges (child_id, parent_id) VALUES (?1, ?2)",
            rusqlite::params![child, parent],
        )
        .unwrap();
    }

    fn codes(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.code.as_str()).collect()
    }

    #[test]
    fn test_empty_store_is_clean() {
        let report = validate_graph(&store()).unwrap();
        assert!(report.passed);
        assert!(report.is_clean());
    }

    #[test]
    fn test_detects_orphans_and_dangling_edges() {
        let conn = store();
        add_node(&conn, "lonely", 1.0, 1.0);
        add_node(&conn, "child", 1.0, 1.0);
        add_edge(&conn, Some("ghost"), "child");
        add_edge(&conn, None, "missing");

        let report = validate_graph(&conn).unwrap();
        assert!(!report.passed);
        let found = codes(&report.errors);
        assert!(found.contains(&ORPHAN_NODE));
        assert_eq!(found.iter().filter(|c| **c == DANGLING_EDGE).count(), 2);
    }

    #[test]
    fn test_detects_cycles_once() {
        let conn = store();
        for id in ["a", "b", "c"] {
            add_node(&conn, id, 1.0, 0.0);
        }
        add_edge(&conn, Some("c"), "a");
        add_edge(&conn, Some("a"), "b");
        add_edge(&conn, Some("b"), "c");

        let report = validate_graph(&conn).unwrap();
        let cycles: Vec<_> = report.errors.iter().filter(|i| i.code == CYCLE).collect();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].entity_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_detects_stale_children_index() {
        let conn = store();
        add_node(&conn, "p", 2.0, 1.0);
        add_node(&conn, "c", 1.0, 1.0);
        add_edge(&conn, None, "p");
        add_edge(&conn, Some("p"), "c");

        let report = validate_graph(&conn).unwrap();
        assert_eq!(codes(&report.errors), vec![CHILDREN_INDEX_MISMATCH]);

        crate::graph::children_index::rebuild(&conn).unwrap();
        assert!(validate_graph(&conn).unwrap().passed);
    }

    #[test]
    fn test_detects_drifted_index_columns() {
        let drifts = [
            "child_short_name = 'renamed'",
            "child_self_time = 0.5",
            "child_percentage = 99.0",
            "child_source_position = 42",
        ];
        for drift in drifts {
            let conn = store();
            add_node(&conn, "p", 2.0, 1.0);
            add_node(&conn, "c", 1.0, 1.0);
            add_edge(&conn, None, "p");
            add_edge(&conn, Some("p"), "c");
            crate::graph::children_index::rebuild(&conn).unwrap();
            assert!(validate_graph(&conn).unwrap().passed);

            conn.execute(&format!("UPDATE children_index SET {}", drift), [])
                .unwrap();
            let report = validate_graph(&conn).unwrap();
            assert_eq!(codes(&report.errors), vec![CHILDREN_INDEX_MISMATCH], "{}", drift);
            assert_eq!(report.errors[0].entity_id.as_deref(), Some("p"));
        }
    }

    #[test]
    fn test_self_exceeding_total_is_a_warning() {
        let conn = store();
        add_node(&conn, "odd", 1.0, 5.0);
        add_edge(&conn, None, "odd");

        let report = validate_graph(&conn).unwrap();
        assert!(report.passed);
        assert_eq!(codes(&report.warnings), vec![SELF_EXCEEDS_TOTAL]);
    }

    #[test]
    fn test_report_serialization() {
        let report = ValidationReport::from_issues(
            vec![ValidationIssue::new(CYCLE, "loop").with_entity_id("x")],
            vec![],
        );
        let parsed: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&report).unwrap()).unwrap();
        assert_eq!(parsed["passed"], false);
        assert_eq!(parsed["errors"][0]["code"], "CYCLE");
        assert_eq!(parsed["errors"][0]["entity_id"], "x");
        assert!(parsed["errors"][0].get("details").is_none());
    }
}
