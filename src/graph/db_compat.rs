//! Read-only compatibility preflight for graph databases.
//!
//! Runs before any write so that an incompatible file is never touched:
//! - `:memory:` and missing paths are new databases
//! - existing files must be SQLite
//! - an existing `topdown_meta` must carry [`TOPDOWN_SCHEMA_VERSION`]
//! - a non-empty SQLite file without `topdown_meta` belongs to another tool

use std::path::{Path, PathBuf};

use rusqlite::{OpenFlags, OptionalExtension};

use super::schema::TOPDOWN_SCHEMA_VERSION;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreflightOk {
    NewDb,
    CompatibleExisting,
}

/// Store failures with stable, path-bearing messages.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("DB_COMPAT: not a sqlite database: {path}")]
    NotSqlite { path: PathBuf },

    #[error("DB_COMPAT: {path} contains tables from another tool (no topdown_meta)")]
    ForeignDatabase { path: PathBuf },

    #[error("DB_COMPAT: schema mismatch: {path} (found={found}, expected={expected})\n\nDelete the database file and import again.")]
    SchemaMismatch {
        path: PathBuf,
        found: i64,
        expected: i64,
    },

    #[error("cannot open graph database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
}

pub fn is_in_memory_path(db_path: &Path) -> bool {
    db_path.as_os_str() == ":memory:"
}

/// Check an on-disk database without mutating it.
pub fn preflight(db_path: &Path) -> Result<PreflightOk, StoreError> {
    if is_in_memory_path(db_path) || !db_path.exists() {
        return Ok(PreflightOk::NewDb);
    }

    let conn = rusqlite::Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|source| StoreError::Open {
            path: db_path.to_path_buf(),
            source,
        })?;

    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
            [],
            |row| row.get(0),
        )
        .map_err(|e| map_query_err(db_path, e))?;
    if table_count == 0 {
        return Ok(PreflightOk::NewDb);
    }

    let has_meta: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'topdown_meta'",
            [],
            |_| Ok(true),
        )
        .optional()
        .map_err(|e| map_query_err(db_path, e))?
        .unwrap_or(false);
    if !has_meta {
        return Err(StoreError::ForeignDatabase {
            path: db_path.to_path_buf(),
        });
    }

    let found: Option<i64> = conn
        .query_row(
            "SELECT schema_version FROM topdown_meta WHERE id = 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| map_query_err(db_path, e))?;

    match found {
        Some(found) if found != TOPDOWN_SCHEMA_VERSION => Err(StoreError::SchemaMismatch {
            path: db_path.to_path_buf(),
            found,
            expected: TOPDOWN_SCHEMA_VERSION,
        }),
        _ => Ok(PreflightOk::CompatibleExisting),
    }
}

fn map_query_err(db_path: &Path, err: rusqlite::Error) -> StoreError {
    match err.sqlite_error_code() {
        Some(rusqlite::ErrorCode::NotADatabase) => StoreError::NotSqlite {
            path: db_path.to_path_buf(),
        },
        _ => StoreError::Open {
            path: db_path.to_path_buf(),
            source: err,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_and_memory_paths_are_new() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            preflight(&dir.path().join("absent.db")).unwrap(),
            PreflightOk::NewDb
        );
        assert_eq!(preflight(Path::new(":memory:")).unwrap(), PreflightOk::NewDb);
    }

    #[test]
    fn test_text_file_is_not_sqlite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile.csv");
        std::fs::write(&path, "Function Stack;Total;Self;Function\n".repeat(20)).unwrap();

        let err = preflight(&path).unwrap_err();
        assert!(matches!(err, StoreError::NotSqlite { .. }), "{:?}", err);
    }

    #[test]
    fn test_foreign_database_is_refused() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.db");
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute("CREATE TABLE functions (id TEXT PRIMARY KEY)", [])
            .unwrap();
        drop(conn);

        let err = preflight(&path).unwrap_err();
        assert!(matches!(err, StoreError::ForeignDatabase { .. }));
    }

    #[test]
    fn test_schema_mismatch_is_refused() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old.db");
        let conn = rusqlite::Connection::open(&path).unwrap();
        crate::graph::schema::ensure_schema(&conn).unwrap();
        conn.execute("UPDATE topdown_meta SET schema_version = 0 WHERE id = 1", [])
            .unwrap();
        drop(conn);

        match preflight(&path).unwrap_err() {
            StoreError::SchemaMismatch {
                found, expected, ..
            } => {
                assert_eq!(found, 0);
                assert_eq!(expected, TOPDOWN_SCHEMA_VERSION);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
