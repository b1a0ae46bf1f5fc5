use crate::core::db::{format_value, EditTarget, ResultSet};
use crate::core::{Result, ViewerError};
use rusqlite::types::Value;

// Results Grid Module
//
// Holds the rows currently on screen together with the cell cursor, the
// rows marked for deletion and the column widths. It also exports the
// grid as text for the non-interactive mode.

use std::collections::BTreeSet;

/// Rows sampled when sizing columns.
const WIDTH_SAMPLE_ROWS: usize = 10;

/// Where the grid's rows came from.
#[derive(Debug, Clone, PartialEq)]
pub enum GridSource {
    /// Nothing loaded yet.
    Empty,
    /// A table fetch; cells can be edited through the target.
    Table(EditTarget),
    /// An ad-hoc statement; read-only.
    Query,
}

/// Represents the viewport for virtualized scrolling.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub start: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(start: usize, height: usize) -> Self {
        Viewport { start, height }
    }

    /// Index range of the visible rows.
    pub fn visible(&self, total_rows: usize) -> std::ops::Range<usize> {
        let start = self.start.min(total_rows);
        let end = (self.start + self.height).min(total_rows);
        start..end
    }

    /// Scrolls just enough to bring `row` into view.
    pub fn follow(&mut self, row: usize) {
        if row < self.start {
            self.start = row;
        } else if self.height > 0 && row >= self.start + self.height {
            self.start = row + 1 - self.height;
        }
    }
}

/// Represents the entire grid structure.
#[derive(Debug, Clone)]
pub struct ResultsGrid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub source: GridSource,
    pub cursor_row: usize,
    pub cursor_col: usize,
    pub marked: BTreeSet<usize>,
    pub viewport: Viewport,
    pub column_widths: Vec<u16>,
}

impl Default for ResultsGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultsGrid {
    /// Creates a new, empty ResultsGrid.
    pub fn new() -> Self {
        ResultsGrid {
            headers: Vec::new(),
            rows: Vec::new(),
            source: GridSource::Empty,
            cursor_row: 0,
            cursor_col: 0,
            marked: BTreeSet::new(),
            viewport: Viewport::new(0, 10),
            column_widths: Vec::new(),
        }
    }

    /// Replaces the contents with a result set, resetting cursor and marks.
    pub fn load(&mut self, result: ResultSet, source: GridSource) {
        self.headers = result.headers;
        self.rows = result.rows;
        self.source = source;
        self.cursor_row = 0;
        self.cursor_col = 0;
        self.marked.clear();
        self.viewport.start = 0;
    }

    /// Empties the grid.
    pub fn clear(&mut self) {
        self.load(ResultSet::default(), GridSource::Empty);
        self.column_widths.clear();
    }

    /// Sizes each column from its header and the first rows, clamped to
    /// `[min, max]` characters.
    pub fn fit_columns(&mut self, min: u16, max: u16) {
        self.column_widths = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let sample = self
                    .rows
                    .iter()
                    .take(WIDTH_SAMPLE_ROWS)
                    .filter_map(|row| row.get(i))
                    .map(|v| format_value(v.into()).chars().count())
                    .max()
                    .unwrap_or(0);
                let wanted = header.chars().count().max(sample) + 2;
                (wanted.min(u16::MAX as usize) as u16).clamp(min, max)
            })
            .collect();
    }

    pub fn is_editable(&self) -> bool {
        matches!(self.source, GridSource::Table(_))
    }

    pub fn edit_target(&self) -> Option<&EditTarget> {
        match &self.source {
            GridSource::Table(target) => Some(target),
            _ => None,
        }
    }

    pub fn cell_text(&self, row: usize, col: usize) -> Option<String> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|v| format_value(v.into()))
    }

    pub fn move_up(&mut self) {
        self.cursor_row = self.cursor_row.saturating_sub(1);
        self.viewport.follow(self.cursor_row);
    }

    pub fn move_down(&mut self) {
        if self.cursor_row + 1 < self.rows.len() {
            self.cursor_row += 1;
        }
        self.viewport.follow(self.cursor_row);
    }

    pub fn move_left(&mut self) {
        self.cursor_col = self.cursor_col.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor_col + 1 < self.headers.len() {
            self.cursor_col += 1;
        }
    }

    pub fn page_down(&mut self) {
        let step = self.viewport.height.max(1);
        self.cursor_row = (self.cursor_row + step).min(self.rows.len().saturating_sub(1));
        self.viewport.follow(self.cursor_row);
    }

    pub fn page_up(&mut self) {
        let step = self.viewport.height.max(1);
        self.cursor_row = self.cursor_row.saturating_sub(step);
        self.viewport.follow(self.cursor_row);
    }

    /// Marks or unmarks the cursor row for deletion.
    pub fn toggle_mark(&mut self) {
        if self.cursor_row >= self.rows.len() {
            return;
        }
        if !self.marked.remove(&self.cursor_row) {
            self.marked.insert(self.cursor_row);
        }
    }

    /// Rows a delete applies to, highest index first: the marked rows, or
    /// the cursor row when nothing is marked.
    pub fn rows_for_delete(&self) -> Vec<usize> {
        if self.marked.is_empty() {
            if self.cursor_row < self.rows.len() {
                vec![self.cursor_row]
            } else {
                Vec::new()
            }
        } else {
            self.marked.iter().rev().copied().collect()
        }
    }

    /// Exports the grid data to a specified format.
    /// Supported formats: table, CSV, JSON, Markdown.
    pub fn export(&self, format: &str) -> Result<String> {
        match format.to_lowercase().as_str() {
            "table" => Ok(self.export_to_table()),
            "csv" => Ok(self.export_to_csv()),
            "json" => self.export_to_json(),
            "markdown" => Ok(self.export_to_markdown()),
            _ => Err(ViewerError::Ui(format!(
                "Unsupported export format: '{}'. Supported formats: table, csv, json, markdown",
                format
            ))),
        }
    }

    fn export_to_table(&self) -> String {
        if self.headers.is_empty() {
            return String::new();
        }
        let rows: Vec<Vec<String>> = self.rows.iter().map(|r| display_row(r)).collect();
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                rows.iter()
                    .filter_map(|r| r.get(i))
                    .map(|s| s.chars().count())
                    .max()
                    .unwrap_or(0)
                    .max(h.chars().count())
            })
            .collect();

        let pad = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:width$}", c, width = *w))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut output = pad(&self.headers);
        output.push('\n');
        let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        output.push_str(&sep.join("-+-"));
        output.push('\n');
        for row in &rows {
            output.push_str(&pad(row));
            output.push('\n');
        }
        output.push_str(&format!("({} rows)\n", rows.len()));
        output
    }

    fn export_to_csv(&self) -> String {
        let mut output = String::new();
        if !self.headers.is_empty() {
            let headers: Vec<String> = self.headers.iter().map(|h| csv_field(h)).collect();
            output.push_str(&headers.join(","));
            output.push('\n');
        }
        for row in &self.rows {
            let fields: Vec<String> = display_row(row).iter().map(|f| csv_field(f)).collect();
            output.push_str(&fields.join(","));
            output.push('\n');
        }
        output
    }

    /// One object per row, keys in column order. A repeated column name
    /// gets a `_2`, `_3`, ... suffix so no value is dropped.
    fn export_to_json(&self) -> Result<String> {
        let keys = json_keys(&self.headers);
        let mut rows = Vec::new();
        for row in &self.rows {
            let mut row_map = serde_json::Map::new();
            for (key, value) in keys.iter().zip(row) {
                row_map.insert(key.clone(), json_value(value));
            }
            rows.push(serde_json::Value::Object(row_map));
        }
        // serde_json error will automatically convert due to From trait in ViewerError
        Ok(serde_json::to_string(&rows)?)
    }

    fn export_to_markdown(&self) -> String {
        let mut output = String::new();
        if !self.headers.is_empty() {
            output.push_str(&self.headers.join(" | "));
            output.push('\n');
            let underline: Vec<String> = self.headers.iter().map(|h| "-".repeat(h.len().max(3))).collect();
            output.push_str(&underline.join(" | "));
            output.push('\n');
        }
        for row in &self.rows {
            output.push_str(&display_row(row).join(" | "));
            output.push('\n');
        }
        output
    }
}

fn display_row(row: &[Value]) -> Vec<String> {
    row.iter().map(|v| format_value(v.into())).collect()
}

fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn json_keys(headers: &[String]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::with_capacity(headers.len());
    for header in headers {
        let mut key = header.clone();
        let mut n = 2;
        while keys.contains(&key) {
            key = format!("{}_{}", header, n);
            n += 1;
        }
        keys.push(key);
    }
    keys
}

fn json_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Real(f) => serde_json::Value::from(*f),
        Value::Text(t) => serde_json::Value::from(t.as_str()),
        Value::Blob(b) => serde_json::Value::from(format!("<BLOB: {} bytes>", b.len())),
    }
}
