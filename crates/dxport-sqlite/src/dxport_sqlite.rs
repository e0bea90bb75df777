//! SQLite collaborators for dxport
//!
//! [`SqliteDatabase`] implements all three destination traits:
//!
//! - `CatalogProvider` via `pragma_table_info`; the identity column is a
//!   single-column `INTEGER PRIMARY KEY`
//! - `BulkWriteSink`, committing each batch in its own transaction
//! - `RowSource`, reading `SELECT *` and rendering cells as text

mod catalog;
mod connection;
mod sink;
mod source;

pub use connection::SqliteDatabase;
pub use sink::SqliteBulkWriter;
