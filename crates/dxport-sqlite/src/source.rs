//! Full-table reads for export

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rusqlite::types::ValueRef;

use dxport_core::{Cell, DxportError, Result, RowSource, TableRef, TabularDataset};

use crate::connection::SqliteDatabase;

/// Render a stored value as raw cell text
fn cell_text(value: ValueRef<'_>) -> Cell {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(s) => Some(String::from_utf8_lossy(s).into_owned()),
        ValueRef::Blob(b) => Some(BASE64.encode(b)),
    }
}

#[async_trait]
impl RowSource for SqliteDatabase {
    #[tracing::instrument(skip(self, table), fields(table = %table))]
    async fn read_table(&self, table: &TableRef) -> Result<TabularDataset> {
        let conn = self.conn.lock();
        let sql = format!("SELECT * FROM {}", table.double_quoted());
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DxportError::Query(format!("Failed to prepare query: {}", e)))?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let column_count = columns.len();
        let mut dataset = TabularDataset::new(columns);

        let mut rows = stmt
            .query([])
            .map_err(|e| DxportError::Query(format!("Failed to execute query: {}", e)))?;
        while let Some(row) = rows
            .next()
            .map_err(|e| DxportError::Query(format!("Failed to fetch row: {}", e)))?
        {
            let mut cells = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                let value = row
                    .get_ref(idx)
                    .map_err(|e| DxportError::Query(e.to_string()))?;
                cells.push(cell_text(value));
            }
            dataset.push_row(cells);
        }

        tracing::debug!(rows = dataset.row_count(), "table read");
        Ok(dataset)
    }
}
