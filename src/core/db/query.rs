/// Query Execution Module
///
/// Runs statements against the open database and collects their results.
/// Every call prepares its own statement, so no result set outlives the
/// operation that produced it.
use super::Database;
use crate::core::{Result, ViewerError};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Statement};
use tracing::{debug, warn};

/// Default row cap for table fetches.
pub const DEFAULT_ROW_LIMIT: usize = 100;

/// Represents the result of a SQL statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Column names, empty for statements that produce no result set
    pub headers: Vec<String>,
    /// Rows of engine values
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Whether the statement reported column metadata.
    pub fn has_columns(&self) -> bool {
        !self.headers.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl Database {
    /// Fetches at most `limit` rows of `table`.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::UnknownTable` if the catalog does not list
    /// `table`, or `ViewerError::Query` if the engine rejects the read.
    pub fn fetch_rows(&self, table: &str, limit: usize) -> Result<ResultSet> {
        self.ensure_table(table)?;
        let sql = format!("SELECT * FROM {} LIMIT ?1", quote_identifier(table));
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut stmt = self.conn.prepare(&sql)?;
        let result = collect_rows(&mut stmt, [limit])?;
        debug!("Fetched {} rows from {}", result.row_count(), table);
        Ok(result)
    }

    /// Runs one statement exactly as written.
    ///
    /// If the engine reports column metadata the rows and headers are
    /// returned; otherwise both are empty. Statements that write are left
    /// inside an open transaction until `commit` or `rollback`.
    pub fn run_statement(&mut self, text: &str) -> Result<ResultSet> {
        self.run_statement_with(text, &[])
    }

    /// Runs one statement with bound parameter values.
    pub fn run_statement_with(&mut self, text: &str, params: &[Value]) -> Result<ResultSet> {
        debug!("Executing statement: {}", text.trim());
        let outcome = self.execute_prepared(text, params);
        self.sync_pending();
        if let Err(e) = &outcome {
            warn!("Statement failed: {}", e);
        }
        outcome
    }

    fn execute_prepared(&mut self, text: &str, params: &[Value]) -> Result<ResultSet> {
        let mut stmt = self.conn.prepare(text)?;
        if !stmt.readonly() {
            // SQLite would autocommit the write; keep it pending instead.
            if self.conn.is_autocommit() {
                debug!("Opening implicit transaction");
                self.conn.execute_batch("BEGIN")?;
            }
            self.pending = true;
        }

        if stmt.column_count() > 0 {
            collect_rows(&mut stmt, params_from_iter(params.iter()))
        } else {
            let changed = stmt.execute(params_from_iter(params.iter()))?;
            debug!("Statement changed {} rows", changed);
            Ok(ResultSet::default())
        }
    }

    /// Rejects a table name the catalog does not report.
    pub(crate) fn ensure_table(&self, table: &str) -> Result<()> {
        if self.list_tables()?.iter().any(|t| t == table) {
            Ok(())
        } else {
            Err(ViewerError::UnknownTable(table.to_string()))
        }
    }
}

fn collect_rows<P: rusqlite::Params>(stmt: &mut Statement<'_>, params: P) -> Result<ResultSet> {
    let headers: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let column_count = headers.len();

    let mut rows = Vec::new();
    let mut cursor = stmt.query(params)?;
    while let Some(row) = cursor.next()? {
        let mut values = Vec::with_capacity(column_count);
        for i in 0..column_count {
            values.push(row.get::<_, Value>(i)?);
        }
        rows.push(values);
    }

    Ok(ResultSet { headers, rows })
}

/// Quotes an identifier for interpolation into generated SQL.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Formats a SQLite value for display
pub fn format_value(value: ValueRef) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).to_string(),
        ValueRef::Blob(b) => format!("<BLOB: {} bytes>", b.len()),
    }
}
