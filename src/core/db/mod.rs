/// Database Module
///
/// This module is the data access layer: one `Database` owns one live
/// connection and exposes the operations the shell is allowed to call.
///
/// ## Architecture
///
/// - **Connection Management** (`connection.rs`): opening, commit, rollback, the pending-changes flag
/// - **Schema Introspection** (`schema.rs`): tables and columns from the engine catalog
/// - **Query Execution** (`query.rs`): table fetches and ad-hoc statements
/// - **Row Editing** (`edit.rs`): bound statements for cell edits, inserts and deletes
///
/// ## Error Handling
///
/// All operations return `ViewerError`; engine failures keep SQLite's message text.
pub mod connection;
pub mod edit;
pub mod query;
pub mod schema;

pub use connection::*;
pub use edit::*;
pub use query::*;
pub use schema::*;
