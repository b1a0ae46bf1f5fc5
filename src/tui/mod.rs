pub mod app;
pub mod input;
pub mod ui;

use std::io::{stdout, Write};

use crossterm::{
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use ratatui::prelude::*;
use tracing::{info, warn};

use crate::core::Result;
use app::App;

/// Runs the interactive shell until the user quits.
pub fn run(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut terminal = match enter_screen(stdout()) {
        Ok(terminal) => terminal,
        Err(e) => {
            // Leave raw mode, or the shell the user returns to is unusable.
            if let Err(restore) = disable_raw_mode() {
                warn!("Could not leave raw mode: {}", restore);
            }
            return Err(e);
        }
    };

    let outcome = event_loop(&mut terminal, &mut app);

    // Restore the terminal even when the loop failed.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if app.has_unsaved_changes() {
        info!("Exiting with unsaved changes; they are rolled back");
    }
    outcome
}

/// Switches `writer` to the alternate screen and wraps it in a terminal.
fn enter_screen<W: Write>(mut writer: W) -> Result<Terminal<CrosstermBackend<W>>> {
    execute!(writer, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(writer))?)
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut shown_title = String::new();
    loop {
        let title = app.title();
        if title != shown_title {
            execute!(stdout(), SetTitle(&title))?;
            shown_title = title;
        }
        terminal.draw(|frame| ui::draw(frame, app))?;

        if input::handle_events(app)? {
            return Ok(());
        }
    }
}
