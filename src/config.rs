use crate::core::{Result, ViewerError};
use crate::core::db::DEFAULT_ROW_LIMIT;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration structure parsed from a TOML file.
///
/// Every section and field is optional; missing values take the defaults.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub grid: GridConfig,
    pub sqlite: SqliteConfig,
    pub log: LogConfig,
}

/// Grid sizing.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    /// Maximum rows fetched when a table is opened.
    pub row_limit: usize,
    pub min_column_width: u16,
    pub max_column_width: u16,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            row_limit: DEFAULT_ROW_LIMIT,
            min_column_width: 10,
            max_column_width: 30,
        }
    }
}

/// SQLite connection settings applied right after opening a file.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SqliteConfig {
    pub foreign_keys: bool,
    /// 0 leaves SQLite's default (fail immediately on a locked file).
    pub busy_timeout_ms: u64,
}

/// Logging settings.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    /// Log file used by the interactive shell. Defaults to the user cache dir.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LogConfig {
    pub fn level(&self) -> Result<tracing::Level> {
        self.level
            .parse()
            .map_err(|_| ViewerError::Config(format!("unknown log level '{}'", self.level)))
    }

    /// Where the interactive shell writes its log.
    pub fn file_path(&self) -> Option<PathBuf> {
        self.file
            .clone()
            .or_else(|| dirs::cache_dir().map(|d| d.join("dbviewer").join("dbviewer.log")))
    }
}

/// Widest grid column a config may ask for.
pub const MAX_COLUMN_WIDTH: u16 = 1000;

impl Config {
    /// Checks values serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.grid.min_column_width == 0 || self.grid.min_column_width > self.grid.max_column_width {
            return Err(ViewerError::Config(format!(
                "grid column widths must satisfy 0 < min ({}) <= max ({})",
                self.grid.min_column_width, self.grid.max_column_width
            )));
        }
        if self.grid.max_column_width > MAX_COLUMN_WIDTH {
            return Err(ViewerError::Config(format!(
                "grid max_column_width ({}) must not exceed {}",
                self.grid.max_column_width, MAX_COLUMN_WIDTH
            )));
        }
        self.log.level()?;
        Ok(())
    }
}

/// Default configuration file location, e.g. `~/.config/dbviewer/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dbviewer").join("config.toml"))
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = dbviewer::config::load_config("config.toml").expect("Failed to load config");
/// println!("{:?}", config);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config =
        toml::from_str(&content).map_err(|e| ViewerError::Config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Loads the explicitly requested file, or the default file if it exists,
/// or falls back to defaults.
pub fn resolve_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => load_config(path),
        None => match default_config_path() {
            Some(path) if path.exists() => load_config(path),
            _ => Ok(Config::default()),
        },
    }
}
