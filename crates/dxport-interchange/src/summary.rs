//! Per-job summary returned by the job runner

use std::time::Duration;

use serde::Serialize;

use dxport_core::TableRef;

use crate::coercion::CoercedRow;
use crate::error::JobError;

/// Number of example messages kept verbatim
pub const MAX_EXAMPLE_MESSAGES: usize = 5;

/// Direction of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Import,
    Export,
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Import => f.write_str("import"),
            Self::Export => f.write_str("export"),
        }
    }
}

/// Final state of a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "message")]
pub enum JobStatus {
    /// Not yet finalized
    Running,
    Completed,
    Failed(String),
    Cancelled,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => f.write_str("running"),
            Self::Completed => f.write_str("completed"),
            Self::Failed(message) => write!(f, "failed: {}", message),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Counters and example messages for one import or export
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub kind: JobKind,
    pub table: String,
    pub status: JobStatus,
    pub rows_read: u64,
    pub rows_written: u64,
    /// Rows with at least one substituted default
    pub rows_defaulted: u64,
    /// Rows with at least one unresolvable cell
    pub rows_unresolvable: u64,
    pub warnings: u64,
    pub batches_written: u64,
    /// First few warning and error messages
    pub messages: Vec<String>,
    /// Messages beyond the first few
    pub suppressed_messages: u64,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}

impl JobSummary {
    pub fn new(kind: JobKind, table: &TableRef) -> Self {
        Self {
            kind,
            table: table.to_string(),
            status: JobStatus::Running,
            rows_read: 0,
            rows_written: 0,
            rows_defaulted: 0,
            rows_unresolvable: 0,
            warnings: 0,
            batches_written: 0,
            messages: Vec::new(),
            suppressed_messages: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Record an example message, keeping only the first few
    pub fn add_message(&mut self, message: impl Into<String>) {
        if self.messages.len() < MAX_EXAMPLE_MESSAGES {
            self.messages.push(message.into());
        } else {
            self.suppressed_messages += 1;
        }
    }

    /// Count a warning and keep it as an example message
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings += 1;
        self.add_message(message);
    }

    /// Fold one coerced row's counters and warnings into the summary
    pub fn record_row(&mut self, row: &CoercedRow) {
        if row.has_default() {
            self.rows_defaulted += 1;
        }
        if row.has_unresolvable() {
            self.rows_unresolvable += 1;
        }
        for warning in &row.warnings {
            self.add_warning(warning.to_string());
        }
    }

    pub fn record_batch(&mut self, rows_written: u64) {
        self.rows_written += rows_written;
        self.batches_written += 1;
    }

    /// Set the final status from the job's outcome
    pub fn finish(&mut self, result: Result<(), JobError>, elapsed: Duration) {
        self.elapsed = elapsed;
        self.status = match result {
            Ok(()) => JobStatus::Completed,
            Err(JobError::Cancelled) => JobStatus::Cancelled,
            Err(e) => {
                let message = e.to_string();
                self.add_message(message.clone());
                JobStatus::Failed(message)
            }
        };
    }

    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Completed
    }

    /// Total number of messages, including the suppressed ones
    pub fn total_messages(&self) -> u64 {
        self.messages.len() as u64 + self.suppressed_messages
    }
}
