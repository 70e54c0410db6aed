//! Indentation-stack tree builder
//!
//! Rows arrive in file order. The stack holds the path from an ancestor down
//! to the last emitted node, shallow to deep; a row's parent is the nearest
//! earlier row with a strictly smaller indent.

use sha2::{Digest, Sha256};

use super::normalize::ReferenceTotal;
use super::row::ParsedRow;
use crate::graph::{CallEdge, CallNode};

/// Stable node ID: first 8 bytes of SHA-256(signature ":" position), as hex.
///
/// Identity is per occurrence. The same signature on two lines yields two
/// nodes, so recursive frames are never merged.
///
/// ```
/// use topdown::ingest::node_id;
///
/// let a = node_id("ns::f()", 10);
/// assert_eq!(a, node_id("ns::f()", 10));
/// assert_ne!(a, node_id("ns::f()", 11));
/// assert_eq!(a.len(), 16);
/// ```
pub fn node_id(full_signature: &str, source_position: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(full_signature.as_bytes());
    hasher.update(b":");
    hasher.update(source_position.to_be_bytes());
    let hash = hasher.finalize();
    hex::encode(&hash[..8])
}

#[derive(Debug, Clone)]
struct StackEntry {
    id: String,
    indent_level: usize,
}

/// Single-pass builder; one instance per import.
#[derive(Debug)]
pub struct TreeBuilder {
    reference: ReferenceTotal,
    stack: Vec<StackEntry>,
    max_depth: usize,
}

impl TreeBuilder {
    pub fn new(reference: ReferenceTotal) -> Self {
        Self {
            reference,
            stack: Vec::new(),
            max_depth: 0,
        }
    }

    /// Attach one row to the tree and return the node with its edge.
    pub fn push(&mut self, row: ParsedRow) -> (CallNode, CallEdge) {
        while self
            .stack
            .last()
            .is_some_and(|top| top.indent_level >= row.indent_level)
        {
            self.stack.pop();
        }

        let parent_id = self.stack.last().map(|top| top.id.clone());
        let id = node_id(&row.full_signature, row.source_position);

        let node = CallNode {
            id: id.clone(),
            percentage: self.reference.percentage_of(row.total_time),
            raw_label: row.raw_label,
            short_name: row.short_name,
            full_signature: row.full_signature,
            total_time: row.total_time,
            self_time: row.self_time,
            indent_level: row.indent_level,
            source_position: row.source_position,
        };
        let edge = CallEdge {
            parent_id,
            child_id: id.clone(),
        };

        self.stack.push(StackEntry {
            id,
            indent_level: node.indent_level,
        });
        self.max_depth = self.max_depth.max(self.stack.len());

        (node, edge)
    }

    /// Deepest ancestor chain seen so far, in nodes.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn reference(&self) -> ReferenceTotal {
        self.reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(indent: usize, position: u64, total: f64) -> ParsedRow {
        let name = format!("f{}", position);
        ParsedRow {
            raw_label: format!("{}{}", " ".repeat(indent), name),
            short_name: name.clone(),
            full_signature: name,
            total_time: total,
            self_time: 0.0,
            indent_level: indent,
            source_position: position,
            coerced_fields: 0,
        }
    }

    /// Parent index of each row, by position in the input slice.
    fn parent_indices(indents: &[usize]) -> Vec<Option<usize>> {
        let mut builder = TreeBuilder::new(ReferenceTotal::from_field(Some("1")));
        let mut ids = Vec::new();
        let mut parents = Vec::new();
        for (i, indent) in indents.iter().enumerate() {
            let (node, edge) = builder.push(row(*indent, i as u64 + 1, 1.0));
            parents.push(
                edge.parent_id
                    .map(|pid| ids.iter().position(|id| *id == pid).unwrap()),
            );
            ids.push(node.id);
        }
        parents
    }

    #[test]
    fn test_reparenting_on_indent_changes() {
        assert_eq!(
            parent_indices(&[0, 1, 2, 1, 2, 3, 0]),
            vec![None, Some(0), Some(1), Some(0), Some(3), Some(4), None]
        );
    }

    #[test]
    fn test_indent_jumps_attach_to_nearest_shallower() {
        // Two-space indentation with an irregular jump.
        assert_eq!(
            parent_indices(&[0, 2, 6, 4, 2]),
            vec![None, Some(0), Some(1), Some(1), Some(0)]
        );
    }

    #[test]
    fn test_flat_input_is_all_roots() {
        assert_eq!(parent_indices(&[3, 3, 3]), vec![None, None, None]);
    }

    #[test]
    fn test_shallower_first_row_pops_everything() {
        assert_eq!(parent_indices(&[4, 6, 0, 1]), vec![None, Some(0), None, Some(2)]);
    }

    #[test]
    fn test_percentages_use_reference_total() {
        let mut builder = TreeBuilder::new(ReferenceTotal::from_field(Some("10.0")));
        let (root, _) = builder.push(row(0, 1, 10.0));
        let (child, _) = builder.push(row(2, 2, 6.0));
        assert!((root.percentage - 100.0).abs() < 1e-9);
        assert!((child.percentage - 60.0).abs() < 1e-9);
        assert_eq!(builder.max_depth(), 2);
    }

    #[test]
    fn test_same_signature_at_different_positions_gets_distinct_ids() {
        let mut builder = TreeBuilder::new(ReferenceTotal::from_field(Some("1")));
        let mut first = row(0, 1, 1.0);
        let mut second = row(1, 2, 1.0);
        first.full_signature = "recurse()".to_string();
        second.full_signature = "recurse()".to_string();

        let (a, _) = builder.push(first);
        let (b, edge) = builder.push(second);
        assert_ne!(a.id, b.id);
        assert_eq!(edge.parent_id.as_deref(), Some(a.id.as_str()));
    }

    #[test]
    fn test_node_id_is_lowercase_hex() {
        let id = node_id("", 1);
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
