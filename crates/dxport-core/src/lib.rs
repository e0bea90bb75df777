//! dxport Core - shared abstractions for the data exchange engine
//!
//! This crate provides the types and traits every other dxport crate
//! depends on. It defines:
//!
//! - `TabularDataset` - the format-neutral interchange table
//! - `Value` - a typed destination cell value
//! - `ColumnSchema` / `SemanticType` - destination column metadata
//! - `CatalogProvider`, `BulkWriteSink`, `RowSource` - traits implemented by
//!   destination drivers

mod catalog;
mod error;
mod schema;
mod types;

pub use catalog::*;
pub use error::*;
pub use schema::*;
pub use types::*;
