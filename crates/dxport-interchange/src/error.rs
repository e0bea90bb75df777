//! Job-level errors

use thiserror::Error;

use dxport_core::{DxportError, TableRef};

use crate::format::FormatError;

/// Errors that end an import or export job
#[derive(Debug, Error)]
pub enum JobError {
    /// The source file could not be parsed, or the output could not be produced
    #[error("Format error: {0}")]
    FormatParse(#[from] FormatError),

    #[error("Schema resolution failed for {table}: {message}")]
    SchemaResolution { table: TableRef, message: String },

    #[error("Missing required value: {0}")]
    MissingRequiredColumn(String),

    /// A batch was rejected or timed out; earlier batches stay committed
    #[error("Bulk transfer failed: {0}")]
    BulkTransfer(String),

    #[error("Failed to read source table: {0}")]
    SourceRead(String),

    #[error("Job cancelled")]
    Cancelled,

    #[error("Table {0} already has an active job")]
    TableBusy(TableRef),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl JobError {
    pub fn schema(table: &TableRef, error: DxportError) -> Self {
        JobError::SchemaResolution {
            table: table.clone(),
            message: error.to_string(),
        }
    }

    /// Map a sink error, keeping cancellation distinct
    pub fn transfer(error: DxportError) -> Self {
        match error {
            DxportError::Cancelled => JobError::Cancelled,
            other => JobError::BulkTransfer(other.to_string()),
        }
    }
}
