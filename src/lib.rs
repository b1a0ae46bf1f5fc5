// Core infrastructure modules
pub mod cli;
pub mod config;
pub mod core;

// Feature-specific modules
pub mod query_editor;
pub mod results_grid;
pub mod schema_navigator;
pub mod tui;

#[cfg(test)]
mod test_utils;
