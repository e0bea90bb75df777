//! Import and export jobs
//!
//! A [`JobRunner`] drives one job end to end: read the file, resolve the
//! destination schema, coerce, then hand batches to the sink (import), or
//! read the table and render it to a file (export). Every run returns a
//! [`JobSummary`], whatever the outcome.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use dxport_core::{
    BulkWriteRequest, BulkWriteSink, CatalogProvider, ColumnMapping, ColumnSchema, RowSource,
    TableRef, TabularDataset,
};

use crate::coercion::{Coercer, DefaultPolicy, coerce};
use crate::error::JobError;
use crate::format::{ExportContext, FieldDelimiter, FileFormat, FormatOptions, TextEncoding};
use crate::summary::{JobKind, JobSummary};
use crate::transfer::{TransferConfig, transfer};
use crate::type_mapping::{ResolvedSchema, SchemaResolver};

/// Everything needed to run one import or export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobParameters {
    pub format: FileFormat,
    pub file_path: PathBuf,
    pub include_headers: bool,
    pub encoding: TextEncoding,
    pub delimiter: FieldDelimiter,
    pub target_schema: String,
    pub target_table: String,
    pub truncate_before_import: bool,
    pub skip_row_errors: bool,
    pub validate_before_import: bool,
    pub batch_size: usize,
    pub timeout_secs: u64,
    pub defaults: DefaultPolicy,
}

impl Default for JobParameters {
    fn default() -> Self {
        Self {
            format: FileFormat::Csv,
            file_path: PathBuf::new(),
            include_headers: true,
            encoding: TextEncoding::Utf8,
            delimiter: FieldDelimiter::Comma,
            target_schema: "main".to_string(),
            target_table: String::new(),
            truncate_before_import: false,
            skip_row_errors: false,
            validate_before_import: false,
            batch_size: 1000,
            timeout_secs: 30,
            defaults: DefaultPolicy::default(),
        }
    }
}

impl JobParameters {
    /// Load parameters from a TOML or JSON job file, chosen by extension
    pub fn from_file(path: &Path) -> Result<Self, JobError> {
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => serde_json::from_str(&text).map_err(|e| {
                JobError::Configuration(format!("invalid job file {}: {}", path.display(), e))
            }),
            Some("toml") | None => toml::from_str(&text).map_err(|e| {
                JobError::Configuration(format!("invalid job file {}: {}", path.display(), e))
            }),
            Some(other) => Err(JobError::Configuration(format!(
                "unsupported job file extension '.{}'",
                other
            ))),
        }
    }

    pub fn table(&self) -> TableRef {
        TableRef::new(&self.target_schema, &self.target_table)
    }

    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            include_headers: self.include_headers,
            encoding: self.encoding,
            delimiter: self.delimiter,
        }
    }

    pub fn transfer_config(&self) -> TransferConfig {
        TransferConfig {
            batch_size: self.batch_size,
            timeout: Duration::from_secs(self.timeout_secs),
            skip_row_errors: self.skip_row_errors,
        }
    }

    /// Reject parameter combinations no job can run with
    pub fn validate(&self) -> Result<(), JobError> {
        if self.target_table.trim().is_empty() {
            return Err(JobError::Configuration("target table is required".to_string()));
        }
        if self.target_schema.trim().is_empty() {
            return Err(JobError::Configuration("target schema is required".to_string()));
        }
        if self.file_path.as_os_str().is_empty() {
            return Err(JobError::Configuration("file path is required".to_string()));
        }
        self.transfer_config().validate()
    }
}

/// Removes the table from the active set when the job ends
struct TableGuard {
    active: Arc<Mutex<HashSet<TableRef>>>,
    table: TableRef,
}

impl Drop for TableGuard {
    fn drop(&mut self) {
        self.active.lock().remove(&self.table);
    }
}

/// Runs import and export jobs against one set of collaborators
#[derive(Clone)]
pub struct JobRunner {
    resolver: SchemaResolver,
    sink: Arc<dyn BulkWriteSink>,
    source: Arc<dyn RowSource>,
    active: Arc<Mutex<HashSet<TableRef>>>,
}

impl JobRunner {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        sink: Arc<dyn BulkWriteSink>,
        source: Arc<dyn RowSource>,
    ) -> Self {
        Self {
            resolver: SchemaResolver::new(catalog),
            sink,
            source,
            active: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Tables that currently have a running job
    pub fn active_tables(&self) -> Vec<TableRef> {
        self.active.lock().iter().cloned().collect()
    }

    fn acquire(&self, table: &TableRef) -> Result<TableGuard, JobError> {
        let mut active = self.active.lock();
        if !active.insert(table.clone()) {
            return Err(JobError::TableBusy(table.clone()));
        }
        Ok(TableGuard {
            active: self.active.clone(),
            table: table.clone(),
        })
    }

    /// Import `params.file_path` into the target table
    pub async fn run_import(
        &self,
        params: &JobParameters,
        cancel: CancellationToken,
    ) -> JobSummary {
        let table = params.table();
        let mut summary = JobSummary::new(JobKind::Import, &table);
        let started = Instant::now();
        tracing::info!(
            table = %table,
            file = %params.file_path.display(),
            format = %params.format,
            "import started"
        );

        let result = self.import(params, &table, &cancel, &mut summary).await;
        summary.finish(result, started.elapsed());
        log_finished(&summary);
        summary
    }

    /// Export the target table to `params.file_path`
    pub async fn run_export(
        &self,
        params: &JobParameters,
        cancel: CancellationToken,
    ) -> JobSummary {
        let table = params.table();
        let mut summary = JobSummary::new(JobKind::Export, &table);
        let started = Instant::now();
        tracing::info!(
            table = %table,
            file = %params.file_path.display(),
            format = %params.format,
            "export started"
        );

        let result = self.export(params, &table, &cancel, &mut summary).await;
        summary.finish(result, started.elapsed());
        log_finished(&summary);
        summary
    }

    async fn import(
        &self,
        params: &JobParameters,
        table: &TableRef,
        cancel: &CancellationToken,
        summary: &mut JobSummary,
    ) -> Result<(), JobError> {
        params.validate()?;
        if !params.format.supports_import() {
            return Err(JobError::Configuration(format!(
                "{} cannot be used as an import source",
                params.format
            )));
        }
        let _guard = self.acquire(table)?;

        let bytes = tokio::fs::read(&params.file_path).await?;
        let dataset = params.format.read(&bytes, &params.format_options())?;
        summary.rows_read = dataset.row_count() as u64;
        tracing::debug!(
            columns = dataset.column_count(),
            rows = dataset.row_count(),
            "source file parsed"
        );
        check_cancelled(cancel)?;

        let schema = self
            .resolver
            .resolve(table)
            .await
            .map_err(|e| JobError::schema(table, e))?;
        check_cancelled(cancel)?;

        let columns = import_columns(&schema, &dataset);
        let coercer = Coercer::new(dataset.columns(), &columns, params.defaults);

        if params.validate_before_import && !params.skip_row_errors {
            validate_rows(&dataset, &columns, params.defaults)?;
        }

        if params.truncate_before_import {
            let removed = self
                .sink
                .truncate(table)
                .await
                .map_err(JobError::transfer)?;
            tracing::info!(table = %table, rows = removed, "destination truncated");
        }
        check_cancelled(cancel)?;

        let column_mapping = (0..columns.len())
            .map(|idx| ColumnMapping {
                source: coercer
                    .source_column(dataset.columns(), idx)
                    .unwrap_or(columns[idx].name.as_str())
                    .to_string(),
                destination: columns[idx].name.clone(),
            })
            .collect();
        let config = params.transfer_config();
        let writer = self
            .sink
            .open(BulkWriteRequest {
                table: table.clone(),
                column_mapping,
                batch_size: config.batch_size,
                timeout: config.timeout,
            })
            .await
            .map_err(JobError::transfer)?;

        let rows = dataset
            .rows()
            .iter()
            .enumerate()
            .map(|(idx, row)| coercer.coerce_row(idx + 1, row));
        transfer(rows, &columns, writer, &config, cancel, summary).await
    }

    async fn export(
        &self,
        params: &JobParameters,
        table: &TableRef,
        cancel: &CancellationToken,
        summary: &mut JobSummary,
    ) -> Result<(), JobError> {
        params.validate()?;
        let _guard = self.acquire(table)?;

        let schema = self
            .resolver
            .resolve(table)
            .await
            .map_err(|e| JobError::schema(table, e))?;
        check_cancelled(cancel)?;

        let dataset = self
            .source
            .read_table(table)
            .await
            .map_err(|e| JobError::SourceRead(e.to_string()))?;
        summary.rows_read = dataset.row_count() as u64;
        check_cancelled(cancel)?;

        let context = ExportContext {
            table: table.clone(),
            columns: schema.columns,
            identity_columns: schema.identity_columns,
        };
        let bytes = params
            .format
            .write(&dataset, &context, &params.format_options())?;
        tokio::fs::write(&params.file_path, &bytes).await?;

        summary.rows_written = dataset.row_count() as u64;
        tracing::info!(
            table = %table,
            rows = dataset.row_count(),
            bytes = bytes.len(),
            "export written"
        );
        Ok(())
    }
}

fn check_cancelled(cancel: &CancellationToken) -> Result<(), JobError> {
    if cancel.is_cancelled() {
        return Err(JobError::Cancelled);
    }
    Ok(())
}

/// Destination columns written by an import. Identity columns the source
/// does not provide are left to the destination to generate.
fn import_columns(schema: &ResolvedSchema, dataset: &TabularDataset) -> Vec<ColumnSchema> {
    // A headerless file carries identity values only when it is as wide as the table
    let positional_identity =
        dataset.has_synthesized_columns() && dataset.column_count() >= schema.columns.len();
    schema
        .columns
        .iter()
        .filter(|c| {
            !schema.is_identity(&c.name)
                || positional_identity
                || dataset.column_index(&c.name).is_some()
        })
        .cloned()
        .collect()
}

/// Dry coercion pass; fails on the first row with an unresolvable cell
fn validate_rows(
    dataset: &TabularDataset,
    columns: &[ColumnSchema],
    policy: DefaultPolicy,
) -> Result<(), JobError> {
    let unresolvable = coerce(dataset, columns, policy).find(|row| row.has_unresolvable());
    if let Some(row) = unresolvable {
        let messages: Vec<String> = row.unresolvable_messages(columns).collect();
        return Err(JobError::MissingRequiredColumn(format!(
            "validation failed: {}",
            messages.join("; ")
        )));
    }
    Ok(())
}

fn log_finished(summary: &JobSummary) {
    if summary.is_success() {
        tracing::info!(
            kind = %summary.kind,
            table = %summary.table,
            rows_read = summary.rows_read,
            rows_written = summary.rows_written,
            warnings = summary.warnings,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "job completed"
        );
    } else {
        tracing::warn!(
            kind = %summary.kind,
            table = %summary.table,
            status = %summary.status,
            rows_written = summary.rows_written,
            "job did not complete"
        );
    }
}
