//! Plain-text rendering for terminal output

use crate::graph::CallNode;

/// Seconds with a unit scaled to the magnitude: `s`, `ms`, `µs` or `ns`.
pub fn format_time(seconds: f64) -> String {
    if seconds >= 1.0 {
        format!("{:.3}s", seconds)
    } else if seconds >= 1e-3 {
        format!("{:.3}ms", seconds * 1e3)
    } else if seconds >= 1e-6 {
        format!("{:.3}µs", seconds * 1e6)
    } else {
        format!("{:.3}ns", seconds * 1e9)
    }
}

pub fn format_percentage(percentage: f64) -> String {
    format!("{:.2}%", percentage)
}

/// Column header matching [`node_row`].
pub fn table_header() -> String {
    format!(
        "{:<16}  {:>12}  {:>12}  {:>8}  {}",
        "ID", "TOTAL", "SELF", "%", "FUNCTION"
    )
}

/// One aligned table row for a node.
pub fn node_row(node: &CallNode) -> String {
    format!(
        "{:<16}  {:>12}  {:>12}  {:>8}  {}",
        node.id,
        format_time(node.total_time),
        format_time(node.self_time),
        format_percentage(node.percentage),
        node.display_name()
    )
}

/// Print a header plus one row per node, or `empty` when there are none.
pub fn print_node_table(nodes: &[CallNode], empty: &str) {
    if nodes.is_empty() {
        println!("{}", empty);
        return;
    }
    println!("{}", table_header());
    for node in nodes {
        println!("{}", node_row(node));
    }
}

/// Multi-line detail block for a single node.
pub fn node_details(node: &CallNode) -> String {
    let signature = if node.full_signature.is_empty() {
        "(none)"
    } else {
        node.full_signature.as_str()
    };
    format!(
        "{}\n  id:         {}\n  total time: {} ({} of total)\n  self time:  {}\n  indent:     {}\n  line:       {}\n  signature:  {}",
        node.display_name(),
        node.id,
        format_time(node.total_time),
        format_percentage(node.percentage),
        format_time(node.self_time),
        node.indent_level,
        node.source_position,
        signature
    )
}
