//! Call graph persistence on SQLite
pub mod children_index;
pub mod db_compat;
pub mod export;
pub mod query;
pub mod schema;
pub mod sink;
pub mod validation;

use anyhow::Result;
use rusqlite::OpenFlags;
use std::path::{Path, PathBuf};

use crate::importer::{run_import, ImportReport};
use crate::ingest::{ImportConfig, ProfileExport};

pub use db_compat::{PreflightOk, StoreError};
pub use export::{ExportConfig, ExportFormat, NodeRecord};
pub use query::{GraphCounts, SortKey};
pub use schema::{CallEdge, CallNode, ImportMeta, TOPDOWN_SCHEMA_VERSION};
pub use sink::{GraphSink, SqliteSink};
pub use validation::{validate_graph, ValidationIssue, ValidationReport};

/// Handle on one call graph database
///
/// Writers go through [`CallGraph::import`] and [`CallGraph::rebuild_children_index`];
/// everything else is a read.
pub struct CallGraph {
    conn: rusqlite::Connection,
    db_path: PathBuf,
}

impl CallGraph {
    /// Open (or create) a graph database for reading and writing
    ///
    /// The file is checked read-only first; an incompatible database is
    /// refused with a [`StoreError`] before anything is written.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        db_compat::preflight(db_path)?;

        let conn = rusqlite::Connection::open(db_path).map_err(|source| StoreError::Open {
            path: db_path.to_path_buf(),
            source,
        })?;
        schema::ensure_schema(&conn)
            .map_err(|e| anyhow::anyhow!("{} ({})", e, db_path.display()))?;

        Ok(Self {
            conn,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    /// Open an existing database without write access
    ///
    /// Readers never observe a partially written import.
    pub fn open_read_only<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        if !db_compat::is_in_memory_path(db_path) && !db_path.exists() {
            anyhow::bail!("Database not found: {}", db_path.display());
        }
        if db_compat::preflight(db_path)? == PreflightOk::NewDb {
            anyhow::bail!("Database has no call graph: {}", db_path.display());
        }

        let conn = rusqlite::Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| StoreError::Open {
                path: db_path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            conn,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Raw connection, for validation and ad-hoc reads.
    pub fn connection(&self) -> &rusqlite::Connection {
        &self.conn
    }

    /// Import a buffered export in one transaction
    ///
    /// Either every node, edge, index row and the metadata row is committed,
    /// or nothing is: the transaction rolls back when dropped on error.
    pub fn import(&mut self, export: &ProfileExport, config: &ImportConfig) -> Result<ImportReport> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| anyhow::anyhow!("Failed to begin import transaction: {}", e))?;

        let report = {
            let mut sink = SqliteSink::new(&tx);
            if config.fresh {
                sink.clear()?;
            }
            run_import(&mut sink, export, config)?
        };

        let source_path = export.source().map(|p| p.to_string_lossy().into_owned());
        schema::write_meta(&tx, report.root_total_time, source_path.as_deref())?;

        tx.commit()
            .map_err(|e| anyhow::anyhow!("Failed to commit import into {}: {}", self.db_path.display(), e))?;

        Ok(report)
    }

    /// Recompute the children index from nodes and edges. Returns the row count.
    pub fn rebuild_children_index(&mut self) -> Result<usize> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| anyhow::anyhow!("Failed to begin reindex transaction: {}", e))?;
        let rows = children_index::rebuild(&tx)?;
        tx.commit()
            .map_err(|e| anyhow::anyhow!("Failed to commit reindex: {}", e))?;
        Ok(rows)
    }

    pub fn list_nodes(&self, sort: SortKey, limit: Option<usize>) -> Result<Vec<CallNode>> {
        query::list_nodes(&self.conn, sort, limit)
    }

    pub fn get_node(&self, id: &str) -> Result<Option<CallNode>> {
        query::get_node(&self.conn, id)
    }

    pub fn get_children(&self, parent_id: &str) -> Result<Vec<CallNode>> {
        query::get_children(&self.conn, parent_id)
    }

    pub fn children_direct(&self, parent_id: &str) -> Result<Vec<CallNode>> {
        query::children_direct(&self.conn, parent_id)
    }

    pub fn roots(&self) -> Result<Vec<CallNode>> {
        query::roots(&self.conn)
    }

    pub fn parent_of(&self, id: &str) -> Result<Option<CallNode>> {
        query::parent_of(&self.conn, id)
    }

    pub fn find_nodes(&self, pattern: &str) -> Result<Vec<CallNode>> {
        query::find_nodes(&self.conn, pattern)
    }

    pub fn counts(&self) -> Result<GraphCounts> {
        query::counts(&self.conn)
    }

    pub fn meta(&self) -> Result<Option<ImportMeta>> {
        schema::read_meta(&self.conn)
    }

    pub fn validate(&self) -> Result<ValidationReport> {
        validate_graph(&self.conn)
    }

    pub fn export(&self, config: &ExportConfig) -> Result<String> {
        export::export_graph(&self.conn, config)
    }
}
