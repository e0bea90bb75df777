//! Collaborator traits implemented by destination drivers

use crate::{CatalogColumn, Result, TableRef, TabularDataset, Value};
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;

/// Source of destination table metadata
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Columns of a table, ordered by ordinal position.
    ///
    /// Returns an empty list when the table does not exist.
    async fn get_columns(&self, table: &TableRef) -> Result<Vec<CatalogColumn>>;

    /// Names of the table's identity (system-generated) columns
    async fn get_identity_columns(&self, table: &TableRef) -> Result<HashSet<String>>;
}

/// Mapping of one source column onto a destination column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub source: String,
    pub destination: String,
}

impl ColumnMapping {
    /// Identity mapping (source and destination share a name)
    pub fn identity(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source: name.clone(),
            destination: name,
        }
    }
}

/// Parameters for opening a bulk write session
#[derive(Debug, Clone)]
pub struct BulkWriteRequest {
    pub table: TableRef,
    pub column_mapping: Vec<ColumnMapping>,
    pub batch_size: usize,
    pub timeout: Duration,
}

/// Destination-side component that accepts column-mapped batches
#[async_trait]
pub trait BulkWriteSink: Send + Sync {
    /// Open a write session for one job
    async fn open(&self, request: BulkWriteRequest) -> Result<Box<dyn BulkWriter>>;

    /// Remove every row from the table
    async fn truncate(&self, table: &TableRef) -> Result<u64>;
}

/// An open bulk write session.
///
/// Each `write_batch` call is atomic: either every row is committed or none is.
#[async_trait]
pub trait BulkWriter: Send {
    /// Write one batch. Rows are ordered by the request's column mapping.
    async fn write_batch(&mut self, rows: &[Vec<Value>]) -> Result<u64>;

    /// Signal that no further batches follow
    async fn complete(self: Box<Self>) -> Result<()>;
}

/// Full-table reader used for export
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Equivalent of `SELECT * FROM schema.table`
    async fn read_table(&self, table: &TableRef) -> Result<TabularDataset>;
}
