/// Schema Introspection Module
///
/// Reads table and column metadata from the engine catalog. Nothing here is
/// cached: every call goes back to `sqlite_master` / `pragma_table_info`.
use super::Database;
use crate::core::Result;
use rusqlite::Row;

/// Represents a database column with its metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Declared type exactly as written in the schema (may be empty)
    pub declared_type: String,
    /// 1-based position within the primary key, 0 if not part of it
    pub primary_key_position: u32,
}

impl ColumnInfo {
    /// Creates a ColumnInfo from a `pragma_table_info` result row
    fn from_pragma_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(ColumnInfo {
            name: row.get(0)?,
            declared_type: row.get(1)?,
            primary_key_position: row.get(2)?,
        })
    }

    /// Tree label, e.g. `name (TEXT)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.declared_type)
    }
}

/// A table name with its ordered columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
}

impl Database {
    /// Lists the tables the engine catalog reports, in catalog order.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    /// Lists the columns of `table` in declaration order.
    ///
    /// The table name is bound, not interpolated. An unknown table yields
    /// an empty list.
    pub fn list_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, type, pk FROM pragma_table_info(?1) ORDER BY cid")?;
        let columns = stmt
            .query_map([table], |row| ColumnInfo::from_pragma_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    }

    /// Names of the primary-key columns of `table`, in key order.
    pub fn primary_key_columns(&self, table: &str) -> Result<Vec<String>> {
        let mut key: Vec<ColumnInfo> = self
            .list_columns(table)?
            .into_iter()
            .filter(|c| c.primary_key_position > 0)
            .collect();
        key.sort_by_key(|c| c.primary_key_position);
        Ok(key.into_iter().map(|c| c.name).collect())
    }

    /// Every table with its columns, for the schema tree.
    pub fn table_descriptors(&self) -> Result<Vec<TableDescriptor>> {
        self.list_tables()?
            .into_iter()
            .map(|name| {
                let columns = self.list_columns(&name)?;
                Ok(TableDescriptor { name, columns })
            })
            .collect()
    }
}
