//! Contract tests for the data access layer
//!
//! These run against real database files in temporary directories and check
//! the behaviour the shell relies on: catalog order, row capping, and that
//! nothing reaches the file until `commit()`.

#[cfg(test)]
mod tests {
    use dbviewer::core::db::{Database, EditTarget};
    use dbviewer::core::{FailureKind, ViewerError};
    use proptest::prelude::*;
    use rusqlite::types::Value;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn temp_path(name: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        (dir, path)
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_users_round_trip() {
        let (_dir, path) = temp_path("users.db");
        let mut db = Database::open(&path).unwrap();
        db.run_statement("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")
            .unwrap();
        db.run_statement("INSERT INTO users VALUES (1, 'a')").unwrap();
        db.commit().unwrap();

        let result = db.fetch_rows("users", 100).unwrap();
        assert_eq!(result.headers, vec!["id", "name"]);
        assert_eq!(result.rows, vec![vec![Value::Integer(1), text("a")]]);
    }

    #[test]
    fn test_select_literal_and_ddl() {
        let (_dir, path) = temp_path("literal.db");
        let mut db = Database::open(&path).unwrap();

        let result = db.run_statement("SELECT 1").unwrap();
        assert_eq!(result.headers, vec!["1"]);
        assert_eq!(result.rows, vec![vec![Value::Integer(1)]]);
        assert!(!db.has_pending_changes());

        let result = db.run_statement("CREATE TABLE t(x)").unwrap();
        assert!(result.headers.is_empty());
        assert!(result.rows.is_empty());
        db.commit().unwrap();
        drop(db);

        let db = Database::open(&path).unwrap();
        assert_eq!(db.list_tables().unwrap(), vec!["t"]);
    }

    #[test]
    fn test_list_tables_matches_catalog() {
        let (_dir, path) = temp_path("catalog.db");
        let mut db = Database::open(&path).unwrap();
        for table in ["zeta", "alpha", "mid"] {
            db.run_statement(&format!("CREATE TABLE {} (v)", table)).unwrap();
        }
        db.run_statement("CREATE VIEW v_alpha AS SELECT * FROM alpha").unwrap();
        db.run_statement("CREATE INDEX idx_mid ON mid (v)").unwrap();

        // Native catalog order, tables only.
        assert_eq!(db.list_tables().unwrap(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_list_columns_declared_types() {
        let (_dir, path) = temp_path("columns.db");
        let mut db = Database::open(&path).unwrap();
        db.run_statement("CREATE TABLE items (id INTEGER PRIMARY KEY, label VARCHAR(20), price NUMERIC, raw)")
            .unwrap();

        let columns: Vec<(String, String)> = db
            .list_columns("items")
            .unwrap()
            .into_iter()
            .map(|c| (c.name, c.declared_type))
            .collect();
        assert_eq!(
            columns,
            vec![
                ("id".to_string(), "INTEGER".to_string()),
                ("label".to_string(), "VARCHAR(20)".to_string()),
                ("price".to_string(), "NUMERIC".to_string()),
                ("raw".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_rollback_restores_contents() {
        let (_dir, path) = temp_path("rollback.db");
        let mut db = Database::open(&path).unwrap();
        db.run_statement("CREATE TABLE t (x INTEGER)").unwrap();
        db.run_statement("INSERT INTO t VALUES (1), (2)").unwrap();
        db.commit().unwrap();
        let before = db.fetch_rows("t", 100).unwrap();

        db.run_statement("DELETE FROM t WHERE x = 1").unwrap();
        db.run_statement("INSERT INTO t VALUES (3)").unwrap();
        assert!(db.has_pending_changes());
        db.rollback().unwrap();

        assert!(!db.has_pending_changes());
        assert_eq!(db.fetch_rows("t", 100).unwrap(), before);
    }

    #[test]
    fn test_commit_survives_reopen_once() {
        let (_dir, path) = temp_path("commit.db");
        {
            let mut db = Database::open(&path).unwrap();
            db.run_statement("CREATE TABLE t (x TEXT)").unwrap();
            db.run_statement("INSERT INTO t VALUES ('only')").unwrap();
            db.commit().unwrap();
        }
        let db = Database::open(&path).unwrap();
        let result = db.fetch_rows("t", 100).unwrap();
        assert_eq!(result.rows, vec![vec![text("only")]]);
    }

    #[test]
    fn test_uncommitted_write_is_lost_on_close() {
        let (_dir, path) = temp_path("lost.db");
        {
            let mut db = Database::open(&path).unwrap();
            db.run_statement("CREATE TABLE t (x)").unwrap();
            db.commit().unwrap();
            db.run_statement("INSERT INTO t VALUES (1)").unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert!(db.fetch_rows("t", 10).unwrap().rows.is_empty());
    }

    #[test]
    fn test_engine_errors_are_classified() {
        let (_dir, path) = temp_path("errors.db");
        let mut db = Database::open(&path).unwrap();
        db.run_statement("CREATE TABLE t (x UNIQUE)").unwrap();
        db.run_statement("INSERT INTO t VALUES (1)").unwrap();

        let syntax = db.run_statement("SELEC 1").unwrap_err();
        assert_eq!(syntax.kind(), FailureKind::Syntax);

        let constraint = db.run_statement("INSERT INTO t VALUES (1)").unwrap_err();
        assert_eq!(constraint.kind(), FailureKind::Constraint);
        assert!(constraint.to_string().contains("UNIQUE"));

        let missing = db.fetch_rows("nope", 10).unwrap_err();
        assert!(matches!(missing, ViewerError::UnknownTable(_)));
        assert_eq!(missing.kind(), FailureKind::NotFound);
    }

    #[test]
    fn test_edit_statements_against_file() {
        let (_dir, path) = temp_path("edit.db");
        let mut db = Database::open(&path).unwrap();
        db.run_statement("CREATE TABLE notes (body TEXT, id INTEGER PRIMARY KEY)")
            .unwrap();
        db.run_statement("INSERT INTO notes VALUES ('first', 7)").unwrap();

        let target = EditTarget::resolve(&db, "notes").unwrap();
        let grid = db.fetch_rows("notes", 100).unwrap();
        let update = target
            .update_cell(&grid.headers, &grid.rows[0], "body", text("changed"))
            .unwrap();
        db.run_bound(&update).unwrap();
        db.commit().unwrap();

        let result = db.run_statement("SELECT body FROM notes WHERE id = 7").unwrap();
        assert_eq!(result.rows, vec![vec![text("changed")]]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_fetch_rows_caps_at_limit(rows in 0usize..40, limit in 0usize..60) {
            let (_dir, path) = temp_path("cap.db");
            let mut db = Database::open(&path).unwrap();
            db.run_statement("CREATE TABLE t (n INTEGER)").unwrap();
            for n in 0..rows {
                db.run_statement_with("INSERT INTO t VALUES (?1)", &[Value::Integer(n as i64)])
                    .unwrap();
            }

            let result = db.fetch_rows("t", limit).unwrap();
            prop_assert_eq!(result.row_count(), rows.min(limit));
            prop_assert_eq!(result.headers, vec!["n".to_string()]);
        }
    }
}
