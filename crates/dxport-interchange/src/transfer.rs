//! Batched, sequential hand-off of coerced rows to a bulk writer

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use dxport_core::{BulkWriter, ColumnSchema, Value};

use crate::coercion::CoercedRow;
use crate::error::JobError;
use crate::summary::JobSummary;

/// Settings for one transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferConfig {
    pub batch_size: usize,
    /// Upper bound for a single batch write. The batch future is dropped when
    /// it runs out, so writers doing blocking work must run it off the async
    /// thread (the SQLite sink uses the blocking pool) or it cannot fire.
    pub timeout: Duration,
    /// Downgrade unresolvable cells to warnings instead of failing
    pub skip_row_errors: bool,
}

impl TransferConfig {
    pub fn validate(&self) -> Result<(), JobError> {
        if self.batch_size == 0 {
            return Err(JobError::Configuration(
                "batch size must be at least 1".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(JobError::Configuration(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Bounded buffer of rows awaiting a write
#[derive(Debug)]
pub struct Batch {
    rows: Vec<Vec<Value>>,
    capacity: usize,
}

impl Batch {
    pub fn new(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }

    pub fn is_full(&self) -> bool {
        self.rows.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    fn take(&mut self) -> Vec<Vec<Value>> {
        std::mem::replace(&mut self.rows, Vec::with_capacity(self.capacity))
    }
}

/// Number of batches `rows` rows split into at `batch_size`
pub fn batch_count(rows: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    rows.div_ceil(batch_size)
}

async fn flush(
    writer: &mut dyn BulkWriter,
    batch: &mut Batch,
    config: &TransferConfig,
    cancel: &CancellationToken,
    summary: &mut JobSummary,
) -> Result<(), JobError> {
    if cancel.is_cancelled() {
        return Err(JobError::Cancelled);
    }

    let batch_number = summary.batches_written + 1;
    let rows = batch.take();
    tracing::debug!(batch = batch_number, rows = rows.len(), "writing batch");

    let written = match tokio::time::timeout(config.timeout, writer.write_batch(&rows)).await {
        Ok(Ok(written)) => written,
        Ok(Err(e)) => {
            return Err(match JobError::transfer(e) {
                JobError::BulkTransfer(message) => {
                    JobError::BulkTransfer(format!("batch {}: {}", batch_number, message))
                }
                other => other,
            });
        }
        Err(_) => {
            return Err(JobError::BulkTransfer(format!(
                "batch {} timed out after {:?}",
                batch_number, config.timeout
            )));
        }
    };

    summary.record_batch(written);
    Ok(())
}

/// Send coerced rows to the writer in batches of `config.batch_size`.
///
/// Rows keep dataset order. Cancellation is checked before each batch is
/// written, never while one is in flight. On error the writer is dropped
/// without completing; batches already written stay committed.
pub async fn transfer<I>(
    rows: I,
    columns: &[ColumnSchema],
    mut writer: Box<dyn BulkWriter>,
    config: &TransferConfig,
    cancel: &CancellationToken,
    summary: &mut JobSummary,
) -> Result<(), JobError>
where
    I: IntoIterator<Item = CoercedRow>,
{
    config.validate()?;

    let mut batch = Batch::new(config.batch_size);
    for row in rows {
        summary.record_row(&row);

        if row.has_unresolvable() {
            let messages: Vec<String> = row.unresolvable_messages(columns).collect();
            if !config.skip_row_errors {
                return Err(JobError::MissingRequiredColumn(messages.join("; ")));
            }
            for message in messages {
                summary.add_warning(message);
            }
        }

        batch.push(row.into_values());
        if batch.is_full() {
            flush(writer.as_mut(), &mut batch, config, cancel, summary).await?;
        }
    }

    if !batch.is_empty() {
        flush(writer.as_mut(), &mut batch, config, cancel, summary).await?;
    }

    if cancel.is_cancelled() {
        return Err(JobError::Cancelled);
    }
    writer.complete().await.map_err(JobError::transfer)
}
