/// Row Editing Module
///
/// Builds the bound statements behind cell edits, row inserts and row
/// deletes. Identifiers are only interpolated after they have been found in
/// the engine's own metadata; values always travel as parameters.
use super::query::quote_identifier;
use super::schema::ColumnInfo;
use super::Database;
use crate::core::{Result, ViewerError};
use rusqlite::types::Value;

/// A generated statement plus the values bound to its placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Database {
    /// Runs a statement produced by an `EditTarget`.
    pub fn run_bound(&mut self, statement: &BoundStatement) -> Result<()> {
        self.run_statement_with(&statement.sql, &statement.params)
            .map(|_| ())
    }
}

/// How a displayed row is located in its table.
#[derive(Debug, Clone, PartialEq)]
enum RowMatch {
    /// Match on the declared primary-key columns.
    Key(Vec<(String, Value)>),
    /// No usable key: match every displayed column, first row only.
    FullRow(Vec<(String, Value)>),
}

/// A table that has been checked against the catalog, with its columns.
#[derive(Debug, Clone, PartialEq)]
pub struct EditTarget {
    table: String,
    columns: Vec<ColumnInfo>,
    key_columns: Vec<String>,
}

impl EditTarget {
    /// Looks `table` up in the catalog and loads its column metadata.
    ///
    /// # Errors
    ///
    /// `ViewerError::UnknownTable` if the catalog does not list `table`.
    pub fn resolve(db: &Database, table: &str) -> Result<Self> {
        db.ensure_table(table)?;
        let columns = db.list_columns(table)?;
        let key_columns = db.primary_key_columns(table)?;
        Ok(EditTarget {
            table: table.to_string(),
            columns,
            key_columns,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    /// Primary-key column names, empty when the table declares none.
    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    /// `UPDATE t SET column = ? WHERE <row match>`.
    pub fn update_cell(
        &self,
        headers: &[String],
        row: &[Value],
        column: &str,
        new_value: Value,
    ) -> Result<BoundStatement> {
        let column = self.checked_column(column)?;
        let (clause, mut key_params) = self.where_clause(headers, row)?;

        let mut params = vec![new_value];
        params.append(&mut key_params);
        Ok(BoundStatement {
            sql: format!(
                "UPDATE {} SET {} = ? WHERE {}",
                quote_identifier(&self.table),
                quote_identifier(column),
                clause
            ),
            params,
        })
    }

    /// `INSERT INTO t (all columns) VALUES (?, ...)` in schema order.
    pub fn insert_row(&self, values: Vec<Value>) -> Result<BoundStatement> {
        if values.len() != self.columns.len() {
            return Err(ViewerError::Ui(format!(
                "Expected {} values for {}, got {}",
                self.columns.len(),
                self.table,
                values.len()
            )));
        }
        let names: Vec<String> = self
            .columns
            .iter()
            .map(|c| quote_identifier(&c.name))
            .collect();
        let placeholders = vec!["?"; names.len()].join(", ");
        Ok(BoundStatement {
            sql: format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote_identifier(&self.table),
                names.join(", "),
                placeholders
            ),
            params: values,
        })
    }

    /// `DELETE FROM t WHERE <row match>`.
    pub fn delete_row(&self, headers: &[String], row: &[Value]) -> Result<BoundStatement> {
        let (clause, params) = self.where_clause(headers, row)?;
        Ok(BoundStatement {
            sql: format!("DELETE FROM {} WHERE {}", quote_identifier(&self.table), clause),
            params,
        })
    }

    fn checked_column<'a>(&self, column: &'a str) -> Result<&'a str> {
        if self.columns.iter().any(|c| c.name == column) {
            Ok(column)
        } else {
            Err(ViewerError::UnknownColumn {
                table: self.table.clone(),
                column: column.to_string(),
            })
        }
    }

    fn row_match(&self, headers: &[String], row: &[Value]) -> Result<RowMatch> {
        let value_of = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .and_then(|i| row.get(i))
                .cloned()
        };

        if !self.key_columns.is_empty() {
            let key: Option<Vec<(String, Value)>> = self
                .key_columns
                .iter()
                .map(|k| value_of(k).map(|v| (k.clone(), v)))
                .collect();
            if let Some(key) = key {
                return Ok(RowMatch::Key(key));
            }
        }

        let mut all = Vec::with_capacity(headers.len());
        for (name, value) in headers.iter().zip(row) {
            self.checked_column(name)?;
            all.push((name.clone(), value.clone()));
        }
        if all.is_empty() {
            return Err(ViewerError::Ui(format!(
                "Cannot identify a row of {} without columns",
                self.table
            )));
        }
        Ok(RowMatch::FullRow(all))
    }

    fn where_clause(&self, headers: &[String], row: &[Value]) -> Result<(String, Vec<Value>)> {
        let conditions = |pairs: &[(String, Value)]| {
            pairs
                .iter()
                .map(|(name, _)| format!("{} IS ?", quote_identifier(name)))
                .collect::<Vec<_>>()
                .join(" AND ")
        };

        match self.row_match(headers, row)? {
            RowMatch::Key(pairs) => {
                let clause = conditions(&pairs);
                Ok((clause, pairs.into_iter().map(|(_, v)| v).collect()))
            }
            RowMatch::FullRow(pairs) => {
                let clause = format!(
                    "rowid = (SELECT rowid FROM {} WHERE {} LIMIT 1)",
                    quote_identifier(&self.table),
                    conditions(&pairs)
                );
                Ok((clause, pairs.into_iter().map(|(_, v)| v).collect()))
            }
        }
    }
}

/// Converts text typed by the user into a bound value.
///
/// Blank input becomes NULL, which lets the engine assign an integer primary
/// key. Anything else is bound as text and left to column affinity.
pub fn input_value(text: &str) -> Value {
    if text.is_empty() {
        Value::Null
    } else {
        Value::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_with(schema: &str) -> Database {
        let mut db = Database::open(":memory:").unwrap();
        for statement in schema.split(';').filter(|s| !s.trim().is_empty()) {
            db.run_statement(statement).unwrap();
        }
        db.commit().unwrap();
        db
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_resolve_rejects_unknown_table() {
        let db = open_with("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)");
        assert!(matches!(
            EditTarget::resolve(&db, "users; DROP TABLE users"),
            Err(ViewerError::UnknownTable(_))
        ));
    }

    #[test]
    fn test_update_by_primary_key_not_first_column() {
        let mut db = open_with(
            "CREATE TABLE items (label TEXT, code TEXT PRIMARY KEY);
             INSERT INTO items VALUES ('same', 'a');
             INSERT INTO items VALUES ('same', 'b')",
        );
        let target = EditTarget::resolve(&db, "items").unwrap();
        assert_eq!(target.key_columns(), ["code".to_string()]);

        let result = db.fetch_rows("items", 100).unwrap();
        let statement = target
            .update_cell(&result.headers, &result.rows[1], "label", text("changed"))
            .unwrap();
        assert_eq!(
            statement.sql,
            "UPDATE \"items\" SET \"label\" = ? WHERE \"code\" IS ?"
        );
        db.run_bound(&statement).unwrap();

        let after = db
            .run_statement("SELECT code, label FROM items ORDER BY code")
            .unwrap();
        assert_eq!(
            after.rows,
            vec![vec![text("a"), text("same")], vec![text("b"), text("changed")]]
        );
        assert!(db.has_pending_changes());
    }

    #[test]
    fn test_update_rejects_unknown_column() {
        let db = open_with("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)");
        let target = EditTarget::resolve(&db, "users").unwrap();
        let headers = vec!["id".to_string(), "name".to_string()];
        let err = target
            .update_cell(&headers, &[Value::Integer(1), text("a")], "name = 1 --", Value::Null)
            .unwrap_err();
        assert!(matches!(err, ViewerError::UnknownColumn { .. }));
    }

    #[test]
    fn test_full_row_fallback_touches_one_duplicate() {
        let mut db = open_with(
            "CREATE TABLE log (msg TEXT, level INTEGER);
             INSERT INTO log VALUES ('dup', 1);
             INSERT INTO log VALUES ('dup', 1);
             INSERT INTO log VALUES (NULL, 2)",
        );
        let target = EditTarget::resolve(&db, "log").unwrap();
        assert!(target.key_columns().is_empty());

        let result = db.fetch_rows("log", 100).unwrap();
        let statement = target.delete_row(&result.headers, &result.rows[0]).unwrap();
        db.run_bound(&statement).unwrap();
        assert_eq!(db.fetch_rows("log", 100).unwrap().row_count(), 2);

        // NULL cells still match thanks to IS.
        let statement = target.delete_row(&result.headers, &result.rows[2]).unwrap();
        db.run_bound(&statement).unwrap();
        let remaining = db.fetch_rows("log", 100).unwrap();
        assert_eq!(remaining.rows, vec![vec![text("dup"), Value::Integer(1)]]);
    }

    #[test]
    fn test_key_missing_from_grid_falls_back_to_full_row() {
        let db = open_with("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)");
        let target = EditTarget::resolve(&db, "users").unwrap();
        let statement = target.delete_row(&["name".to_string()], &[text("a")]).unwrap();
        assert!(statement.sql.contains("SELECT rowid FROM \"users\""));
        assert_eq!(statement.params, vec![text("a")]);
    }

    #[test]
    fn test_insert_row_schema_order_with_blank_as_null() {
        let mut db = open_with("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)");
        let target = EditTarget::resolve(&db, "users").unwrap();

        let statement = target
            .insert_row(vec![input_value(""), input_value("zoe")])
            .unwrap();
        assert_eq!(
            statement.sql,
            "INSERT INTO \"users\" (\"id\", \"name\") VALUES (?, ?)"
        );
        db.run_bound(&statement).unwrap();

        let rows = db.fetch_rows("users", 100).unwrap().rows;
        assert_eq!(rows, vec![vec![Value::Integer(1), text("zoe")]]);
    }

    #[test]
    fn test_insert_row_wrong_arity() {
        let db = open_with("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)");
        let target = EditTarget::resolve(&db, "users").unwrap();
        assert!(target.insert_row(vec![text("1")]).is_err());
    }

    #[test]
    fn test_failed_edit_surfaces_engine_error() {
        let mut db = open_with(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             INSERT INTO users VALUES (1, 'a')",
        );
        let target = EditTarget::resolve(&db, "users").unwrap();
        let result = db.fetch_rows("users", 100).unwrap();
        let statement = target
            .update_cell(&result.headers, &result.rows[0], "name", Value::Null)
            .unwrap();
        let err = db.run_bound(&statement).unwrap_err();
        assert_eq!(err.kind(), crate::core::FailureKind::Constraint);
    }
}
