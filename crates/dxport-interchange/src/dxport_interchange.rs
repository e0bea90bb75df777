//! Schema-driven data exchange between files and database tables
//!
//! # Architecture
//!
//! ```text
//! import:  file bytes → FileFormat::read → TabularDataset
//!                     → SchemaResolver (catalog) → coercion → batches → BulkWriteSink
//!
//! export:  RowSource → TabularDataset → FileFormat::write → file bytes
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let runner = JobRunner::new(catalog, sink, source);
//! let params = JobParameters::from_file(Path::new("people.toml"))?;
//! let summary = runner.run_import(&params, CancellationToken::new()).await;
//! println!("{} rows written", summary.rows_written);
//! ```

mod coercion;
mod csv_format;
mod error;
mod format;
mod job;
mod json_format;
mod spreadsheet;
mod sql_script;
mod summary;
mod text_encoding;
mod transfer;
mod type_mapping;
mod xml_format;

pub use coercion::{
    CoercedRow, Coercer, CoercionOutcome, CoercionWarning, DateTimeDefault, DefaultPolicy,
    DefaultReason, GuidDefault, coerce, parse_datetime, parse_value,
};
pub use error::JobError;
pub use format::{
    ExportContext, FieldDelimiter, FileFormat, FormatError, FormatOptions, TextEncoding,
};
pub use job::{JobParameters, JobRunner};
pub use summary::{JobKind, JobStatus, JobSummary, MAX_EXAMPLE_MESSAGES};
pub use transfer::{Batch, TransferConfig, batch_count, transfer};
pub use type_mapping::{ResolvedSchema, SchemaResolver, semantic_type_for};
