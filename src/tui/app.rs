use std::path::Path;

use rusqlite::types::Value;
use tracing::{info, warn};

use crate::config::Config;
use crate::core::db::{format_value, Database, EditTarget};
use crate::core::ViewerError;
use crate::query_editor::QueryEditor;
use crate::results_grid::{GridSource, ResultsGrid};
use crate::schema_navigator::SchemaNavigator;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Focus {
    Tree,
    Grid,
    Query,
}

/// What to do once the unsaved-changes question is answered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Continuation {
    Open,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Answer {
    Save,
    Discard,
    Cancel,
}

/// A modal dialog. While one is open it receives every key.
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    OpenFile {
        input: QueryEditor,
    },
    EditCell {
        row: usize,
        col: usize,
        /// The cell value when the prompt opened.
        original: Value,
        input: QueryEditor,
    },
    AddRow {
        target: EditTarget,
        values: Vec<Value>,
        input: QueryEditor,
    },
    ConfirmDelete {
        rows: Vec<usize>,
    },
    UnsavedChanges {
        then: Continuation,
    },
}

impl Prompt {
    pub fn title(&self) -> String {
        match self {
            Prompt::OpenFile { .. } => " Open database ".to_string(),
            Prompt::EditCell { .. } => " Edit cell ".to_string(),
            Prompt::AddRow { target, .. } => format!(" Add row to {} ", target.table()),
            Prompt::ConfirmDelete { .. } => " Confirm delete ".to_string(),
            Prompt::UnsavedChanges { .. } => " Unsaved changes ".to_string(),
        }
    }

    /// The text field of the prompt, if it has one.
    pub fn input(&self) -> Option<&QueryEditor> {
        match self {
            Prompt::OpenFile { input }
            | Prompt::EditCell { input, .. }
            | Prompt::AddRow { input, .. } => Some(input),
            _ => None,
        }
    }

    pub fn input_mut(&mut self) -> Option<&mut QueryEditor> {
        match self {
            Prompt::OpenFile { input }
            | Prompt::EditCell { input, .. }
            | Prompt::AddRow { input, .. } => Some(input),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
}

pub struct App {
    pub config: Config,
    pub db: Option<Database>,
    pub navigator: SchemaNavigator,
    pub grid: ResultsGrid,
    pub editor: QueryEditor,
    pub current_table: Option<String>,
    pub focus: Focus,
    pub prompt: Option<Prompt>,
    pub status: Status,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            db: None,
            navigator: SchemaNavigator::new(),
            grid: ResultsGrid::new(),
            editor: QueryEditor::new(),
            current_table: None,
            focus: Focus::Tree,
            prompt: None,
            status: Status {
                text: "Ready".to_string(),
                is_error: false,
            },
            should_quit: false,
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Status {
            text: text.into(),
            is_error: false,
        };
    }

    /// Shows a failure, prefixed with what was being attempted.
    pub fn set_error(&mut self, context: &str, err: &ViewerError) {
        warn!("{}: {}", context, err);
        self.status = Status {
            text: format!("{} ({}): {}", context, err.kind().label(), err),
            is_error: true,
        };
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.db
            .as_ref()
            .map(Database::has_pending_changes)
            .unwrap_or(false)
    }

    /// Window title: file name plus a modified marker.
    pub fn title(&self) -> String {
        match &self.db {
            Some(db) => {
                let name = file_name(db.path());
                if self.has_unsaved_changes() {
                    format!("dbviewer - {} [modified]", name)
                } else {
                    format!("dbviewer - {}", name)
                }
            }
            None => "dbviewer".to_string(),
        }
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Tree => Focus::Grid,
            Focus::Grid => Focus::Query,
            Focus::Query => Focus::Tree,
        };
    }

    pub fn cycle_focus_back(&mut self) {
        self.focus = match self.focus {
            Focus::Tree => Focus::Query,
            Focus::Grid => Focus::Tree,
            Focus::Query => Focus::Grid,
        };
    }

    // ----- files -------------------------------------------------------

    /// Asks about pending changes first, then for a path.
    pub fn request_open(&mut self) {
        if self.has_unsaved_changes() {
            self.prompt = Some(Prompt::UnsavedChanges {
                then: Continuation::Open,
            });
        } else {
            self.prompt_for_path();
        }
    }

    fn prompt_for_path(&mut self) {
        self.prompt = Some(Prompt::OpenFile {
            input: QueryEditor::new(),
        });
    }

    /// Asks about pending changes first, then quits.
    pub fn request_quit(&mut self) {
        if self.has_unsaved_changes() {
            self.prompt = Some(Prompt::UnsavedChanges {
                then: Continuation::Quit,
            });
        } else {
            self.should_quit = true;
        }
    }

    pub fn answer_unsaved(&mut self, answer: Answer, then: Continuation) {
        match answer {
            Answer::Save => {
                self.save_changes();
                if self.has_unsaved_changes() {
                    // Saving failed; stay put so nothing is lost.
                    return;
                }
            }
            Answer::Discard => {
                if let Some(db) = self.db.as_mut() {
                    if let Err(e) = db.rollback() {
                        warn!("Rollback before {:?} failed: {}", then, e);
                    }
                }
            }
            Answer::Cancel => return,
        }
        match then {
            Continuation::Open => self.prompt_for_path(),
            Continuation::Quit => self.should_quit = true,
        }
    }

    /// Opens `path`, replacing the current database. On failure the
    /// current database stays open.
    pub fn open_database(&mut self, path: &Path) {
        match Database::open_with(path, &self.config.sqlite) {
            Ok(db) => {
                self.db = Some(db);
                self.current_table = None;
                self.grid.clear();
                self.navigator.clear();
                self.refresh_tree();
                self.focus = Focus::Tree;
                self.set_status(format!("Connected to database: {}", file_name(path)));
            }
            Err(e) => self.set_error("Cannot open database", &e),
        }
    }

    /// Commits pending changes.
    pub fn save_changes(&mut self) {
        let Some(db) = self.db.as_mut() else {
            return;
        };
        if !db.has_pending_changes() {
            self.set_status("No changes to save");
            return;
        }
        match db.commit() {
            Ok(()) => self.set_status("All changes saved"),
            Err(e) => self.set_error("Save failed", &e),
        }
    }

    /// Rolls back pending changes and re-reads what is on screen.
    pub fn revert_changes(&mut self) {
        let Some(db) = self.db.as_mut() else {
            return;
        };
        if !db.has_pending_changes() {
            self.set_status("No changes to revert");
            return;
        }
        match db.rollback() {
            Ok(()) => {
                self.refresh_tree();
                self.refresh_current_table();
                self.set_status("All unsaved changes discarded");
            }
            Err(e) => self.set_error("Revert failed", &e),
        }
    }

    // ----- tree and table display -------------------------------------

    /// Re-reads tables and columns from the catalog.
    pub fn refresh_tree(&mut self) {
        let Some(db) = self.db.as_ref() else {
            return;
        };
        match db.table_descriptors() {
            Ok(tables) => self.navigator.set_tables(tables),
            Err(e) => self.set_error("Cannot read schema", &e),
        }
    }

    /// Loads the table under the tree selection into the grid.
    pub fn open_selected_table(&mut self) {
        if let Some(name) = self.navigator.selected_table().map(str::to_string) {
            self.current_table = Some(name.clone());
            self.display_table(&name);
        }
    }

    pub fn display_table(&mut self, name: &str) {
        let Some(db) = self.db.as_ref() else {
            return;
        };
        let loaded = EditTarget::resolve(db, name)
            .and_then(|target| Ok((db.fetch_rows(name, self.config.grid.row_limit)?, target)));
        match loaded {
            Ok((result, target)) => {
                let count = result.row_count();
                self.grid.load(result, GridSource::Table(target));
                self.grid
                    .fit_columns(self.config.grid.min_column_width, self.config.grid.max_column_width);
                self.set_status(format!("Table '{}' loaded ({} rows)", name, count));
            }
            Err(e) => self.set_error(&format!("Cannot load table '{}'", name), &e),
        }
    }

    /// Re-reads the current table, keeping the cursor where it was.
    pub fn refresh_current_table(&mut self) {
        let Some(name) = self.current_table.clone() else {
            return;
        };
        let (row, col) = (self.grid.cursor_row, self.grid.cursor_col);
        self.display_table(&name);
        if !self.status.is_error {
            self.grid.cursor_row = row.min(self.grid.rows.len().saturating_sub(1));
            self.grid.cursor_col = col.min(self.grid.headers.len().saturating_sub(1));
            self.grid.viewport.follow(self.grid.cursor_row);
        }
    }

    /// F5: schema and current table.
    pub fn refresh_all(&mut self) {
        self.refresh_tree();
        self.refresh_current_table();
    }

    // ----- editing -----------------------------------------------------

    fn editable_target(&mut self) -> Option<EditTarget> {
        if self.db.is_none() {
            self.set_status("Open a database first");
            return None;
        }
        match self.grid.edit_target() {
            Some(target) => Some(target.clone()),
            None => {
                self.set_status("Select a table first; query results cannot be edited");
                None
            }
        }
    }

    pub fn begin_cell_edit(&mut self) {
        if self.editable_target().is_none() {
            return;
        }
        let (row, col) = (self.grid.cursor_row, self.grid.cursor_col);
        let Some(original) = self.grid.rows.get(row).and_then(|r| r.get(col)).cloned() else {
            return;
        };
        if let Value::Blob(_) = original {
            self.set_status("BLOB cells cannot be edited here");
            return;
        }
        self.prompt = Some(Prompt::EditCell {
            row,
            col,
            input: QueryEditor::with_text(&prompt_text(&original)),
            original,
        });
    }

    /// Stores `value` in a grid cell. Nothing runs if the cell already holds
    /// that exact value.
    pub fn apply_cell_edit(&mut self, row: usize, col: usize, value: Value) {
        let Some(target) = self.editable_target() else {
            return;
        };
        let (Some(values), Some(column)) = (self.grid.rows.get(row), self.grid.headers.get(col))
        else {
            return;
        };
        if values.get(col) == Some(&value) {
            self.set_status("Cell unchanged");
            return;
        }
        let column = column.clone();

        let outcome = target
            .update_cell(&self.grid.headers, values, &column, value)
            .and_then(|statement| self.database()?.run_bound(&statement));
        match outcome {
            Ok(()) => {
                info!("Updated {}.{}", target.table(), column);
                self.refresh_current_table();
                self.set_status(format!("Updated {}.{} (unsaved)", target.table(), column));
            }
            Err(e) => {
                self.refresh_current_table();
                self.set_error("Update failed", &e);
            }
        }
    }

    pub fn begin_add_row(&mut self) {
        let Some(target) = self.editable_target() else {
            return;
        };
        if target.columns().is_empty() {
            self.set_status(format!("Table {} has no columns", target.table()));
            return;
        }
        self.prompt = Some(Prompt::AddRow {
            target,
            values: Vec::new(),
            input: QueryEditor::new(),
        });
    }

    /// Inserts a row with one value per column in schema order.
    pub fn insert_row(&mut self, target: &EditTarget, values: Vec<Value>) {
        let outcome = target
            .insert_row(values)
            .and_then(|statement| self.database()?.run_bound(&statement));
        match outcome {
            Ok(()) => {
                self.refresh_current_table();
                self.set_status(format!("Added a row to {} (unsaved)", target.table()));
            }
            Err(e) => self.set_error("Add row failed", &e),
        }
    }

    pub fn begin_delete(&mut self) {
        if self.editable_target().is_none() {
            return;
        }
        let rows = self.grid.rows_for_delete();
        if rows.is_empty() {
            self.set_status("Select the rows to delete first");
            return;
        }
        self.prompt = Some(Prompt::ConfirmDelete { rows });
    }

    /// Deletes the given grid rows, one statement per row.
    pub fn delete_rows(&mut self, rows: &[usize]) {
        let Some(target) = self.editable_target() else {
            return;
        };
        let statements: Result<Vec<_>, _> = rows
            .iter()
            .filter_map(|&i| self.grid.rows.get(i))
            .map(|values| target.delete_row(&self.grid.headers, values))
            .collect();

        let mut deleted = 0;
        let outcome = statements.and_then(|statements| {
            let db = self.database()?;
            for statement in &statements {
                db.run_bound(statement)?;
                deleted += 1;
            }
            Ok(())
        });

        self.refresh_current_table();
        match outcome {
            Ok(()) => self.set_status(format!(
                "Deleted {} rows from {} (unsaved)",
                deleted,
                target.table()
            )),
            Err(e) => self.set_error("Delete failed", &e),
        }
    }

    // ----- statements --------------------------------------------------

    /// Runs the statement box.
    pub fn execute_query(&mut self) {
        if self.db.is_none() {
            self.set_status("Open a database first");
            return;
        }
        let Some(statement) = self.editor.submit() else {
            return;
        };

        let outcome = self.database().and_then(|db| db.run_statement(&statement));
        match outcome {
            Ok(result) if result.has_columns() => {
                let count = result.row_count();
                self.grid.load(result, GridSource::Query);
                self.grid
                    .fit_columns(self.config.grid.min_column_width, self.config.grid.max_column_width);
                self.focus = Focus::Grid;
                self.set_status(format!("Query executed, {} rows returned", count));
            }
            Ok(_) => {
                self.refresh_tree();
                if let Some(name) = self.current_table.clone() {
                    if self.navigator.tables().iter().any(|t| t.name == name) {
                        self.refresh_current_table();
                    } else {
                        self.current_table = None;
                        self.grid.clear();
                    }
                }
                if self.has_unsaved_changes() {
                    self.set_status("Statement executed (unsaved)");
                } else {
                    self.set_status("Statement executed");
                }
            }
            Err(e) => self.set_error("SQL error", &e),
        }
    }

    fn database(&mut self) -> Result<&mut Database, ViewerError> {
        self.db.as_mut().ok_or(ViewerError::NoConnection)
    }
}

/// Text an edit prompt starts with. NULL starts empty.
pub fn prompt_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => format_value(other.into()),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
