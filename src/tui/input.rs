use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rusqlite::types::Value;
use std::path::PathBuf;
use std::time::Duration;

use super::app::{prompt_text, Answer, App, Focus, Prompt};
use crate::core::db::input_value;

pub fn handle_events(app: &mut App) -> std::io::Result<bool> {
    if event::poll(Duration::from_millis(100))? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                handle_key_event(app, key);
            }
        }
    }
    Ok(app.should_quit)
}

pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if app.prompt.is_some() {
        handle_prompt(app, key);
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => app.request_quit(),
            KeyCode::Char('o') => app.request_open(),
            KeyCode::Char('s') => app.save_changes(),
            KeyCode::Char('r') => app.revert_changes(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::F(5) => return app.refresh_all(),
        KeyCode::Tab => return app.cycle_focus(),
        KeyCode::BackTab => return app.cycle_focus_back(),
        _ => {}
    }

    match app.focus {
        Focus::Tree => handle_tree(app, key),
        Focus::Grid => handle_grid(app, key),
        Focus::Query => handle_query(app, key),
    }
}

fn handle_tree(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.request_quit(),
        KeyCode::Char('k') | KeyCode::Up => app.navigator.move_up(),
        KeyCode::Char('j') | KeyCode::Down => app.navigator.move_down(),
        KeyCode::Char(' ') | KeyCode::Right => app.navigator.toggle(),
        KeyCode::Left => app.navigator.collapse(),
        KeyCode::Enter => {
            app.open_selected_table();
            if app.current_table.is_some() && !app.status.is_error {
                app.focus = Focus::Grid;
            }
        }
        _ => {}
    }
}

fn handle_grid(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.request_quit(),
        KeyCode::Char('k') | KeyCode::Up => app.grid.move_up(),
        KeyCode::Char('j') | KeyCode::Down => app.grid.move_down(),
        KeyCode::Char('h') | KeyCode::Left => app.grid.move_left(),
        KeyCode::Char('l') | KeyCode::Right => app.grid.move_right(),
        KeyCode::PageDown => app.grid.page_down(),
        KeyCode::PageUp => app.grid.page_up(),
        KeyCode::Char(' ') => app.grid.toggle_mark(),
        KeyCode::Enter | KeyCode::Char('e') => app.begin_cell_edit(),
        KeyCode::Char('a') => app.begin_add_row(),
        KeyCode::Char('d') | KeyCode::Delete => app.begin_delete(),
        KeyCode::Char('/') => app.focus = Focus::Query,
        _ => {}
    }
}

fn handle_query(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.execute_query(),
        KeyCode::Esc => app.focus = Focus::Grid,
        KeyCode::Up => app.editor.history_prev(),
        KeyCode::Down => app.editor.history_next(),
        _ => edit_text(&mut app.editor, key),
    }
}

/// Line-editing keys shared by the statement box and prompts.
fn edit_text(editor: &mut crate::query_editor::QueryEditor, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) => editor.insert_char(c),
        KeyCode::Backspace => editor.backspace(),
        KeyCode::Delete => editor.delete(),
        KeyCode::Left => editor.move_left(),
        KeyCode::Right => editor.move_right(),
        KeyCode::Home => editor.move_home(),
        KeyCode::End => editor.move_end(),
        _ => {}
    }
}

fn handle_prompt(app: &mut App, key: KeyEvent) {
    let Some(mut prompt) = app.prompt.take() else {
        return;
    };

    match prompt {
        Prompt::UnsavedChanges { then } => match key.code {
            KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Enter => {
                app.answer_unsaved(Answer::Save, then)
            }
            KeyCode::Char('d') | KeyCode::Char('D') => app.answer_unsaved(Answer::Discard, then),
            KeyCode::Char('c') | KeyCode::Char('C') | KeyCode::Esc => {
                app.answer_unsaved(Answer::Cancel, then)
            }
            _ => app.prompt = Some(prompt),
        },
        Prompt::ConfirmDelete { .. } => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Prompt::ConfirmDelete { rows } = prompt {
                    app.delete_rows(&rows);
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Enter => {
                app.set_status("Delete cancelled")
            }
            _ => app.prompt = Some(prompt),
        },
        Prompt::EditCell { row, col, .. }
            if key.code == KeyCode::Char('n') && key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.apply_cell_edit(row, col, Value::Null)
        }
        _ => match key.code {
            KeyCode::Esc => app.set_status("Cancelled"),
            KeyCode::Enter => submit_prompt(app, prompt),
            _ => {
                if let Some(input) = prompt.input_mut() {
                    edit_text(input, key);
                }
                app.prompt = Some(prompt);
            }
        },
    }
}

fn submit_prompt(app: &mut App, prompt: Prompt) {
    match prompt {
        Prompt::OpenFile { input } => {
            let path = input.text().trim();
            if path.is_empty() {
                app.set_status("Cancelled");
            } else {
                app.open_database(&PathBuf::from(path));
            }
        }
        Prompt::EditCell {
            row,
            col,
            original,
            input,
        } => {
            // Submitting the text the prompt opened with is not an edit.
            if input.text() == prompt_text(&original) {
                app.set_status("Cell unchanged");
            } else {
                app.apply_cell_edit(row, col, Value::Text(input.text().to_string()));
            }
        }
        Prompt::AddRow {
            target,
            mut values,
            input,
        } => {
            values.push(input_value(input.text()));
            if values.len() == target.columns().len() {
                app.insert_row(&target, values);
            } else {
                app.prompt = Some(Prompt::AddRow {
                    target,
                    values,
                    input: Default::default(),
                });
            }
        }
        other => app.prompt = Some(other),
    }
}
