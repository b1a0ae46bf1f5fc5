use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
    Frame,
};

use rusqlite::types::Value;
use unicode_width::UnicodeWidthChar;

use super::app::{App, Focus, Prompt};
use crate::query_editor::QueryEditor;
use crate::schema_navigator::TreeNode;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(6),    // Tree + grid
            Constraint::Length(3), // Statement box
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(chunks[1]);

    draw_header(frame, app, chunks[0]);
    draw_tree(frame, app, panes[0]);
    draw_grid(frame, app, panes[1]);
    draw_query_box(frame, app, chunks[2]);
    draw_status_bar(frame, app, chunks[3]);

    if let Some(prompt) = &app.prompt {
        draw_prompt(frame, prompt);
    }
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(" dbviewer", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
    ];
    match &app.db {
        Some(db) => spans.push(Span::raw(db.path().display().to_string())),
        None => spans.push(Span::styled("no database", Style::default().fg(Color::DarkGray))),
    }
    if app.has_unsaved_changes() {
        spans.push(Span::styled(" [modified]", Style::default().fg(Color::Yellow)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

fn draw_tree(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Schema ")
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == Focus::Tree));

    let nodes = app.navigator.nodes();
    if nodes.is_empty() {
        let hint = if app.db.is_some() { "No tables" } else { "Ctrl+O to open a database" };
        let paragraph = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = nodes
        .iter()
        .map(|node| {
            let style = match node {
                TreeNode::Root => Style::default().add_modifier(Modifier::BOLD),
                TreeNode::Table { name, .. } if app.current_table.as_deref() == Some(name) => {
                    Style::default().fg(Color::Yellow)
                }
                TreeNode::Table { .. } => Style::default(),
                TreeNode::Column { .. } => Style::default().fg(Color::DarkGray),
            };
            ListItem::new(node.display()).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(Some(app.navigator.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

/// First column to draw so that the cursor column fits in `width`.
fn first_visible_column(widths: &[u16], cursor_col: usize, width: u16) -> usize {
    let mut first = cursor_col.min(widths.len().saturating_sub(1));
    let mut used = widths.get(first).copied().unwrap_or(0).saturating_add(1);
    while first > 0 {
        let next = widths[first - 1].saturating_add(1);
        if used.saturating_add(next) > width {
            break;
        }
        used = used.saturating_add(next);
        first -= 1;
    }
    first
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    } else {
        s.chars().take(max_len).collect()
    }
}

fn draw_grid(frame: &mut Frame, app: &mut App, area: Rect) {
    let grid = &mut app.grid;
    let title = match app.current_table.as_deref() {
        Some(name) if grid.is_editable() => format!(" {} ({} rows) ", name, grid.rows.len()),
        _ if !grid.headers.is_empty() => format!(" Results ({} rows) ", grid.rows.len()),
        _ => " Data ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == Focus::Grid));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if grid.headers.is_empty() {
        let help = Paragraph::new("Select a table and press Enter, or run a statement below")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        frame.render_widget(help, inner);
        return;
    }

    // One line for the header row.
    grid.viewport.height = inner.height.saturating_sub(1).max(1) as usize;
    grid.viewport.follow(grid.cursor_row);

    let first_col = first_visible_column(&grid.column_widths, grid.cursor_col, inner.width);
    let width_of = |i: usize| grid.column_widths.get(i).copied().unwrap_or(10);

    let header_cells: Vec<Cell> = grid
        .headers
        .iter()
        .enumerate()
        .skip(first_col)
        .map(|(i, name)| {
            Cell::from(truncate_string(name, width_of(i) as usize))
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        })
        .collect();
    let header = Row::new(header_cells).height(1);

    let visible = grid.viewport.visible(grid.rows.len());
    let rows: Vec<Row> = visible
        .map(|r| {
            let cells: Vec<Cell> = (first_col..grid.headers.len())
                .map(|c| {
                    let text = grid.cell_text(r, c).unwrap_or_default();
                    let mut style = Style::default();
                    if grid.rows[r].get(c).map_or(false, |v| *v == Value::Null) {
                        style = style.fg(Color::DarkGray);
                    }
                    if r == grid.cursor_row && c == grid.cursor_col {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    Cell::from(truncate_string(&text, width_of(c) as usize)).style(style)
                })
                .collect();
            let mut row = Row::new(cells);
            if grid.marked.contains(&r) {
                row = row.style(Style::default().bg(Color::Red));
            } else if r == grid.cursor_row {
                row = row.style(Style::default().bg(Color::DarkGray));
            }
            row
        })
        .collect();

    let widths: Vec<Constraint> = (first_col..grid.headers.len())
        .map(|i| Constraint::Length(width_of(i)))
        .collect();

    let table = Table::new(rows, widths).header(header);
    frame.render_widget(table, inner);
}

fn draw_query_box(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Query;
    let block = Block::default()
        .title(" SQL (Enter: run, Up/Down: history) ")
        .borders(Borders::ALL)
        .border_style(border_style(focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    render_input(frame, &app.editor, inner, focused && app.prompt.is_none());
}

/// Draws a one-line input, scrolled so the cursor stays visible.
fn render_input(frame: &mut Frame, editor: &QueryEditor, area: Rect, show_cursor: bool) {
    let (shown, cursor_x) = visible_window(editor.text(), editor.cursor(), area.width);
    frame.render_widget(Paragraph::new(shown), area);

    if show_cursor {
        frame.set_cursor_position((area.x + cursor_x, area.y));
    }
}

/// Slice of `text` that fits in `width` terminal cells with the char
/// cursor visible, and the cursor's cell offset within that slice.
fn visible_window(text: &str, cursor: usize, width: u16) -> (String, u16) {
    let width = width.max(1) as usize;
    let chars: Vec<char> = text.chars().collect();
    let cursor = cursor.min(chars.len());
    let cell = |c: &char| UnicodeWidthChar::width(*c).unwrap_or(0);

    // Drop chars from the left until the cursor cell fits.
    let mut start = 0;
    let mut before: usize = chars[..cursor].iter().map(cell).sum();
    let cursor_cell = chars.get(cursor).map_or(1, |c| cell(c).max(1));
    while start < cursor && before + cursor_cell > width {
        before -= cell(&chars[start]);
        start += 1;
    }

    let mut used = 0;
    let mut shown = String::new();
    for c in &chars[start..] {
        let w = cell(c);
        if used + w > width {
            break;
        }
        used += w;
        shown.push(*c);
    }
    (shown, before.min(width - 1) as u16)
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let focus = match app.focus {
        Focus::Tree => "Schema",
        Focus::Grid => "Data",
        Focus::Query => "SQL",
    };
    let help = match app.focus {
        Focus::Tree => "Enter:open  Space:expand  Tab:focus  ^O:open  ^S:save  ^R:revert  ^Q:quit",
        Focus::Grid => "Enter:edit  a:add  Space:mark  d:delete  F5:refresh  ^S:save  ^Q:quit",
        Focus::Query => "Enter:run  Esc:data  Tab:focus  ^S:save  ^Q:quit",
    };
    let status_style = if app.status.is_error {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    };

    let line = Line::from(vec![
        Span::styled(format!(" {} ", focus), Style::default().fg(Color::Black).bg(Color::Blue)),
        Span::raw(" "),
        Span::styled(app.status.text.clone(), status_style),
        Span::raw("  "),
        Span::styled(help, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn draw_prompt(frame: &mut Frame, prompt: &Prompt) {
    let area = centered_rect(60, 5, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(prompt.title())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let question = match prompt {
        Prompt::OpenFile { .. } => "Path to SQLite database file:".to_string(),
        Prompt::EditCell { original, .. } if *original == Value::Null => {
            "New value (currently NULL, Ctrl+N keeps NULL):".to_string()
        }
        Prompt::EditCell { .. } => "New value (Ctrl+N for NULL):".to_string(),
        Prompt::AddRow { target, values, .. } => {
            let column = target
                .columns()
                .get(values.len())
                .map(|c| c.name.as_str())
                .unwrap_or_default();
            format!(
                "{} ({}/{}, empty for NULL):",
                column,
                values.len() + 1,
                target.columns().len()
            )
        }
        Prompt::ConfirmDelete { rows } => {
            format!("Delete {} row(s)? This cannot be undone once saved. [y/n]", rows.len())
        }
        Prompt::UnsavedChanges { .. } => {
            "There are unsaved changes. [s]ave, [d]iscard or [c]ancel?".to_string()
        }
    };
    frame.render_widget(
        Paragraph::new(question).wrap(Wrap { trim: true }),
        if prompt.input().is_some() { rows[0] } else { inner },
    );

    if let Some(input) = prompt.input() {
        render_input(frame, input, rows[1], true);
    }
}
