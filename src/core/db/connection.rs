/// Connection Management Module
///
/// This module owns the single live database connection and its
/// transaction lifecycle. Nothing written through it is ever committed
/// implicitly: mutating statements open a transaction that stays pending
/// until `commit` or `rollback` is called.
use crate::config::SqliteConfig;
use crate::core::{Result, ViewerError};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// An open database file.
#[derive(Debug)]
pub struct Database {
    pub(crate) conn: Connection,
    path: PathBuf,
    pub(crate) pending: bool,
}

impl Database {
    /// Opens the database file at `path` with default settings.
    ///
    /// The file is probed with a schema read so that a file SQLite cannot
    /// use as a database is rejected here rather than on the first query.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dbviewer::core::db::Database;
    ///
    /// let db = Database::open("example.db")?;
    /// for table in db.list_tables()? {
    ///     println!("{}", table);
    /// }
    /// # Ok::<(), dbviewer::core::ViewerError>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &SqliteConfig::default())
    }

    /// Opens the database file at `path`, applying the connection pragmas
    /// from `settings`.
    pub fn open_with<P: AsRef<Path>>(path: P, settings: &SqliteConfig) -> Result<Self> {
        let path = path.as_ref();
        let open_error = |source| ViewerError::ConnectionOpen {
            path: path.display().to_string(),
            source,
        };

        let conn = Connection::open(path).map_err(open_error)?;
        conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
            .map_err(open_error)?;

        if settings.foreign_keys {
            conn.execute_batch("PRAGMA foreign_keys = ON;")
                .map_err(open_error)?;
        }
        if settings.busy_timeout_ms > 0 {
            conn.busy_timeout(std::time::Duration::from_millis(settings.busy_timeout_ms))
                .map_err(open_error)?;
        }

        info!("Opened database {}", path.display());
        Ok(Database {
            conn,
            path: path.to_path_buf(),
            pending: false,
        })
    }

    /// Path of the open database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether uncommitted writes exist on this connection.
    pub fn has_pending_changes(&self) -> bool {
        self.pending && !self.conn.is_autocommit()
    }

    /// Persists every pending change atomically.
    ///
    /// Committing with nothing pending is a no-op.
    pub fn commit(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
            info!("Committed pending changes to {}", self.path.display());
        }
        self.pending = false;
        Ok(())
    }

    /// Discards every pending change.
    pub fn rollback(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
            info!("Rolled back pending changes on {}", self.path.display());
        }
        self.pending = false;
        Ok(())
    }

    /// Re-syncs the pending flag after a statement that may have ended the
    /// transaction itself (a user-typed COMMIT or ROLLBACK).
    pub(crate) fn sync_pending(&mut self) {
        if self.conn.is_autocommit() {
            self.pending = false;
        }
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        // Closing the connection discards any open transaction.
        if self.has_pending_changes() {
            warn!(
                "Closing {} with uncommitted changes; they are discarded",
                self.path.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fresh.db");
        let db = Database::open(&path).unwrap();
        assert_eq!(db.path(), path.as_path());
        assert!(!db.has_pending_changes());
    }

    #[test]
    fn test_open_rejects_non_database() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "this is definitely not a sqlite file\n".repeat(64)).unwrap();

        match Database::open(&path) {
            Err(ViewerError::ConnectionOpen { path: p, .. }) => assert!(p.ends_with("notes.txt")),
            other => panic!("Expected ConnectionOpen error, got {:?}", other),
        }
    }

    #[test]
    fn test_open_missing_directory() {
        let result = Database::open("/nonexistent/path/database.db");
        assert!(matches!(result, Err(ViewerError::ConnectionOpen { .. })));
    }

    #[test]
    fn test_write_stays_pending_until_commit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pending.db");
        let mut db = Database::open(&path).unwrap();

        db.run_statement("CREATE TABLE t (x)").unwrap();
        assert!(db.has_pending_changes());

        db.commit().unwrap();
        assert!(!db.has_pending_changes());
        assert!(db.conn.is_autocommit());
    }

    #[test]
    fn test_commit_without_changes_is_noop() {
        let mut db = Database::open(":memory:").unwrap();
        db.commit().unwrap();
        db.rollback().unwrap();
        assert!(!db.has_pending_changes());
    }

    #[test]
    fn test_foreign_keys_setting() {
        let settings = SqliteConfig {
            foreign_keys: true,
            busy_timeout_ms: 250,
        };
        let db = Database::open_with(":memory:", &settings).unwrap();
        let enabled: i64 = db
            .conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
