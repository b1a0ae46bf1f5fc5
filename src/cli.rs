use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dbviewer")]
#[command(author, version, about = "Browse and edit SQLite database files from the terminal")]
pub struct Cli {
    /// Database file to open at start-up
    pub path: Option<PathBuf>,

    /// Run one statement and print its result (non-interactive mode)
    #[arg(short, long, requires = "path")]
    pub query: Option<String>,

    /// Output format for non-interactive mode
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Commit a write statement run with --query (it is rolled back otherwise)
    #[arg(long, requires = "query")]
    pub commit: bool,

    /// Maximum rows fetched when a table is opened
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Configuration file (defaults to <config dir>/dbviewer/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
    Markdown,
}

impl OutputFormat {
    /// Name understood by `ResultsGrid::export`.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "markdown",
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
