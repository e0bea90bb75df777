//! Core types for dxport

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Textual layout used whenever a `DateTime` value is rendered.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A typed value ready to be written to a destination column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean (`bit`)
    Bool(bool),
    /// Unsigned 8-bit integer (`tinyint`)
    Byte(u8),
    /// 16-bit signed integer
    Int16(i16),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 64-bit floating point
    Float64(f64),
    /// Decimal/Numeric (stored as string for precision)
    Decimal(String),
    /// UTF-8 string
    String(String),
    /// UUID
    Uuid(Uuid),
    /// DateTime without timezone
    DateTime(NaiveDateTime),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Uuid(v) => write!(f, "{}", v),
            Value::DateTime(v) => write!(f, "{}", v.format(DATETIME_FORMAT)),
        }
    }
}

/// A raw, untyped cell as it appeared in an external source
pub type Cell = Option<String>;

/// Generic in-memory table used as the interchange shape between format
/// readers, the coercion engine and format writers.
///
/// Every row has exactly `columns.len()` cells. Rows are addressed by
/// position, never by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularDataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl TabularDataset {
    /// Create an empty dataset with the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create a dataset from columns and rows, normalising ragged rows
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut dataset = Self::new(columns);
        for row in rows {
            dataset.push_row(row);
        }
        dataset
    }

    /// Append a row. Short rows are padded with NULL, long rows truncated.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    /// Column names in source order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows in source order
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Get a cell by row and column position
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|c| c.as_deref())
    }

    /// Case-insensitive column lookup
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.to_lowercase();
        self.columns.iter().position(|c| c.to_lowercase() == wanted)
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Whether the column names were synthesized because the source had no header row
    pub fn has_synthesized_columns(&self) -> bool {
        !self.columns.is_empty() && self.columns == synthesized_columns(self.columns.len())
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the dataset has rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Synthesized column names (`Column1..N`) for sources without a header row
pub fn synthesized_columns(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("Column{}", i)).collect()
}
