use std::fs::{self, OpenOptions};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;

use tracing::{error, info};

use dbviewer::cli::{Cli, OutputFormat};
use dbviewer::config::{resolve_config, Config};
use dbviewer::core::db::Database;
use dbviewer::core::Result;
use dbviewer::results_grid::{GridSource, ResultsGrid};
use dbviewer::tui::{self, app::App};

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = resolve_config(cli.config.as_deref())?;
    if let Some(limit) = cli.limit {
        config.grid.row_limit = limit;
    }
    config.validate()?;

    match (&cli.query, &cli.path) {
        (Some(statement), Some(path)) => {
            init_logging(&config, false)?;
            run_query(&config, path, statement, cli.format, cli.commit)
        }
        _ => {
            init_logging(&config, true)?;
            info!("Starting dbviewer...");
            let mut app = App::new(config);
            if let Some(path) = &cli.path {
                app.open_database(path);
            }
            tui::run(app)
        }
    }
}

/// Logs go to stderr for one-shot queries and to a file for the shell, so
/// the terminal screen is never written over.
fn init_logging(config: &Config, to_file: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_max_level(config.log.level()?)
        .with_ansi(false)
        .with_target(false);

    if !to_file {
        builder.with_writer(std::io::stderr).init();
        return Ok(());
    }

    match config.log.file_path() {
        Some(path) => {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            builder.with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::sink).init(),
    }
    Ok(())
}

fn run_query(
    config: &Config,
    path: &Path,
    statement: &str,
    format: OutputFormat,
    commit: bool,
) -> Result<()> {
    let mut db = Database::open_with(path, &config.sqlite)?;
    let result = db.run_statement(statement)?;

    if result.has_columns() {
        let mut grid = ResultsGrid::new();
        grid.load(result, GridSource::Query);
        print!("{}", grid.export(format.as_str())?);
    }

    if db.has_pending_changes() {
        if commit {
            db.commit()?;
            eprintln!("Changes committed");
        } else {
            db.rollback()?;
            eprintln!("Changes rolled back; pass --commit to keep them");
        }
    }
    Ok(())
}
