//! JSON output types for CLI commands
//!
//! Every JSON response is wrapped in [`JsonResponse`], which carries a schema
//! version and an execution ID so that scripted consumers can detect format
//! changes and correlate runs.

use serde::{Deserialize, Serialize};

use crate::graph::{CallNode, GraphCounts, ImportMeta, ValidationIssue, ValidationReport};
use crate::importer::ImportReport;

/// Current JSON output schema version
pub const TOPDOWN_JSON_SCHEMA_VERSION: &str = "1.0.0";

/// Wrapper for all JSON responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse<T> {
    /// Schema version for parsing stability
    pub schema_version: String,
    /// Unique execution ID for this run
    pub execution_id: String,
    /// Tool name
    pub tool: String,
    /// RFC 3339 UTC timestamp of the response
    pub timestamp: String,
    pub data: T,
    /// Whether the response was truncated (e.g. by `--limit`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial: Option<bool>,
}

impl<T> JsonResponse<T> {
    pub fn new(data: T, execution_id: &str) -> Self {
        JsonResponse {
            schema_version: TOPDOWN_JSON_SCHEMA_VERSION.to_string(),
            execution_id: execution_id.to_string(),
            tool: "topdown".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            data,
            partial: None,
        }
    }

    pub fn with_partial(mut self, partial: bool) -> Self {
        self.partial = Some(partial);
        self
    }
}

/// Response for import command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResponse {
    pub input: String,
    pub database: String,
    #[serde(flatten)]
    pub report: ImportReport,
}

/// Response for list command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub sort: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    pub nodes: Vec<CallNode>,
}

/// Response for show command: one node with its neighborhood
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowResponse {
    pub node: CallNode,
    pub parent: Option<CallNode>,
    pub children: Vec<CallNode>,
}

/// Response for children command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildrenResponse {
    pub parent_id: String,
    pub children: Vec<CallNode>,
}

/// Response for roots command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootsResponse {
    pub roots: Vec<CallNode>,
}

/// A matching node and, on request, its immediate children
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindMatch {
    pub node: CallNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<CallNode>>,
}

/// Response for find command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindResponse {
    pub query_name: String,
    pub matches: Vec<FindMatch>,
}

/// Response for status command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub database: String,
    #[serde(flatten)]
    pub counts: GraphCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported_at: Option<String>,
    pub schema_version: i64,
}

impl StatusResponse {
    pub fn new(database: String, counts: GraphCounts, meta: Option<ImportMeta>) -> Self {
        let (source_path, imported_at, schema_version) = match meta {
            Some(meta) => (meta.source_path, meta.imported_at, meta.schema_version),
            None => (None, None, crate::graph::TOPDOWN_SCHEMA_VERSION),
        };
        StatusResponse {
            database,
            counts,
            source_path,
            imported_at,
            schema_version,
        }
    }
}

/// Response for verify command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub passed: bool,
    pub error_count: usize,
    pub errors: Vec<ValidationIssue>,
    pub warning_count: usize,
    pub warnings: Vec<ValidationIssue>,
}

impl From<ValidationReport> for ValidationResponse {
    fn from(report: ValidationReport) -> Self {
        ValidationResponse {
            passed: report.passed,
            error_count: report.errors.len(),
            errors: report.errors,
            warning_count: report.warnings.len(),
            warnings: report.warnings,
        }
    }
}

/// Response for reindex command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReindexResponse {
    pub children_index_rows: usize,
}

/// Response for errors in JSON mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error category
    pub error: String,
    /// Stable code from [`crate::error_codes`]
    pub code: String,
    pub message: String,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Human,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    Pretty,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Some(OutputFormat::Human),
            "json" => Some(OutputFormat::Json),
            "pretty" => Some(OutputFormat::Pretty),
            _ => None,
        }
    }

    pub fn is_json(&self) -> bool {
        !matches!(self, OutputFormat::Human)
    }
}

/// Generate a unique execution ID for this run
///
/// Uses timestamp + process ID for uniqueness.
pub fn generate_execution_id() -> String {
    let timestamp = chrono::Utc::now().timestamp().max(0) as u64;
    format!("{:x}-{:x}", timestamp, std::process::id())
}

/// Serialize `data` to stdout in the requested JSON flavor
pub fn output_json<T: Serialize>(data: &T, format: OutputFormat) -> anyhow::Result<()> {
    let json = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(data)?,
        _ => serde_json::to_string(data)?,
    };
    println!("{}", json);
    Ok(())
}
