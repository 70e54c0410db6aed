//! Stable error codes for CLI failures
//!
//! Pattern: `TD-{CATEGORY}-{3-digit number}`
//!
//! | Code | Meaning | Remediation |
//! |------|---------|-------------|
//! | TD-QRY-001 | Node ID not found | List IDs with `topdown list` or `topdown find` |
//! | TD-QRY-002 | Invalid query parameter | Check `--sort`, `--format` and `--output` values |
//! | TD-IO-001 | Input export unreadable | Check the path and read permissions |
//! | TD-IO-002 | Database cannot be opened | The file is not a topdown database, or its schema is older; delete it and import again |
//! | TD-V-001 | Graph invariant violated | Run `topdown verify`, then `topdown reindex` or re-import with `--fresh` |
//!
//! Codes are never reused.

/// Node ID not found
pub const TD_QRY_001_NODE_NOT_FOUND: &str = "TD-QRY-001";

/// Invalid query parameter
pub const TD_QRY_002_INVALID_PARAMS: &str = "TD-QRY-002";

/// Input export unreadable
pub const TD_IO_001_INPUT_UNREADABLE: &str = "TD-IO-001";

/// Database cannot be opened
pub const TD_IO_002_DATABASE_UNUSABLE: &str = "TD-IO-002";

/// Graph invariant violated
pub const TD_V_001_GRAPH_INVALID: &str = "TD-V-001";

/// Pick the code for a failed command from its error chain.
pub fn classify(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if cause.downcast_ref::<crate::ingest::IngestError>().is_some() {
            return TD_IO_001_INPUT_UNREADABLE;
        }
        if cause.downcast_ref::<crate::graph::StoreError>().is_some() {
            return TD_IO_002_DATABASE_UNUSABLE;
        }
    }
    TD_IO_002_DATABASE_UNUSABLE
}
