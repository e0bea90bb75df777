//! Bulk writes: one transaction per batch
//!
//! Each batch runs on the blocking pool so a caller's timeout can fire while
//! SQLite is busy. Dropping an in-flight `write_batch` future interrupts the
//! statement and the batch's transaction rolls back.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{Connection as RusqliteConnection, InterruptHandle, params_from_iter};

use dxport_core::{
    BulkWriteRequest, BulkWriteSink, BulkWriter, DxportError, Result, TableRef, Value,
};

use crate::connection::{SqliteDatabase, value_to_rusqlite};

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn insert_sql(table: &TableRef, columns: &[String]) -> String {
    let column_list = columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.double_quoted(),
        column_list,
        placeholders
    )
}

/// Interrupts the connection unless disarmed first
struct InterruptOnDrop(Option<Arc<InterruptHandle>>);

impl InterruptOnDrop {
    fn disarm(mut self) {
        self.0 = None;
    }
}

impl Drop for InterruptOnDrop {
    fn drop(&mut self) {
        if let Some(handle) = self.0.take() {
            tracing::debug!("batch abandoned mid-write, interrupting");
            handle.interrupt();
        }
    }
}

/// Insert every row in one transaction
fn insert_batch(
    conn: &mut RusqliteConnection,
    sql: &str,
    column_count: usize,
    rows: &[Vec<Value>],
) -> Result<()> {
    let tx = conn
        .transaction()
        .map_err(|e| DxportError::Query(format!("Failed to begin transaction: {}", e)))?;

    {
        let mut stmt = tx
            .prepare_cached(sql)
            .map_err(|e| DxportError::Query(format!("Failed to prepare insert: {}", e)))?;
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != column_count {
                return Err(DxportError::Query(format!(
                    "row {} has {} values, expected {}",
                    idx + 1,
                    row.len(),
                    column_count
                )));
            }
            let params: Vec<rusqlite::types::Value> = row.iter().map(value_to_rusqlite).collect();
            stmt.execute(params_from_iter(params.iter())).map_err(|e| {
                DxportError::Constraint(format!("row {} of batch rejected: {}", idx + 1, e))
            })?;
        }
    }

    // Dropping `tx` on any error above rolls the whole batch back
    tx.commit()
        .map_err(|e| DxportError::Query(format!("Failed to commit batch: {}", e)))
}

/// Open write session against one table
pub struct SqliteBulkWriter {
    conn: Arc<Mutex<RusqliteConnection>>,
    interrupt: Arc<InterruptHandle>,
    table: TableRef,
    sql: String,
    column_count: usize,
    batches: u64,
}

#[async_trait]
impl BulkWriteSink for SqliteDatabase {
    #[tracing::instrument(skip(self, request), fields(table = %request.table))]
    async fn open(&self, request: BulkWriteRequest) -> Result<Box<dyn BulkWriter>> {
        if request.column_mapping.is_empty() {
            return Err(DxportError::Configuration(
                "bulk write needs at least one mapped column".into(),
            ));
        }
        let columns: Vec<String> = request
            .column_mapping
            .iter()
            .map(|m| m.destination.clone())
            .collect();

        let interrupt = {
            let conn = self.conn.lock();
            conn.busy_timeout(request.timeout).map_err(|e| {
                DxportError::Connection(format!("Failed to set busy timeout: {}", e))
            })?;
            Arc::new(conn.get_interrupt_handle())
        };

        tracing::debug!(columns = columns.len(), batch_size = request.batch_size, "bulk write opened");
        Ok(Box::new(SqliteBulkWriter {
            conn: Arc::clone(&self.conn),
            interrupt,
            sql: insert_sql(&request.table, &columns),
            column_count: columns.len(),
            table: request.table,
            batches: 0,
        }))
    }

    #[tracing::instrument(skip(self, table), fields(table = %table))]
    async fn truncate(&self, table: &TableRef) -> Result<u64> {
        let removed = self
            .conn
            .lock()
            .execute(&format!("DELETE FROM {}", table.double_quoted()), [])
            .map_err(|e| DxportError::Query(format!("Failed to truncate {}: {}", table, e)))?;
        tracing::debug!(rows = removed, "table truncated");
        Ok(removed as u64)
    }
}

#[async_trait]
impl BulkWriter for SqliteBulkWriter {
    async fn write_batch(&mut self, rows: &[Vec<Value>]) -> Result<u64> {
        let conn = Arc::clone(&self.conn);
        let sql = self.sql.clone();
        let column_count = self.column_count;
        let owned = rows.to_vec();
        let guard = InterruptOnDrop(Some(Arc::clone(&self.interrupt)));

        let parent_span = tracing::Span::current();
        let result = tokio::task::spawn_blocking(move || {
            let _enter = parent_span.enter();
            insert_batch(&mut conn.lock(), &sql, column_count, &owned)
        })
        .await;
        guard.disarm();
        result.map_err(|e| DxportError::Query(format!("batch task failed: {}", e)))??;

        self.batches += 1;
        tracing::debug!(table = %self.table, batch = self.batches, rows = rows.len(), "batch committed");
        Ok(rows.len() as u64)
    }

    async fn complete(self: Box<Self>) -> Result<()> {
        tracing::debug!(table = %self.table, batches = self.batches, "bulk write complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dxport_core::ColumnMapping;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn database() -> SqliteDatabase {
        let db = SqliteDatabase::open_in_memory().unwrap();
        db.execute_batch(
            "CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE, age INT)",
        )
        .unwrap();
        db
    }

    fn request(columns: &[&str]) -> BulkWriteRequest {
        BulkWriteRequest {
            table: TableRef::new("main", "people"),
            column_mapping: columns.iter().map(|c| ColumnMapping::identity(*c)).collect(),
            batch_size: 100,
            timeout: Duration::from_secs(5),
        }
    }

    fn person(id: i64, name: &str) -> Vec<Value> {
        vec![Value::Int64(id), Value::String(name.into()), Value::Null]
    }

    #[test]
    fn insert_sql_quotes_identifiers() {
        let sql = insert_sql(
            &TableRef::new("main", "odd\"name"),
            &["a".to_string(), "b c".to_string()],
        );
        assert_eq!(
            sql,
            "INSERT INTO \"main\".\"odd\"\"name\" (\"a\", \"b c\") VALUES (?1, ?2)"
        );
    }

    #[tokio::test]
    async fn batches_are_committed() {
        let db = database();
        let mut writer = db.open(request(&["id", "name", "age"])).await.unwrap();
        assert_eq!(
            writer
                .write_batch(&[person(1, "a"), person(2, "b")])
                .await
                .unwrap(),
            2
        );
        writer.write_batch(&[person(3, "c")]).await.unwrap();
        writer.complete().await.unwrap();
        assert_eq!(db.row_count(&TableRef::new("main", "people")).unwrap(), 3);
    }

    #[tokio::test]
    async fn rejected_batch_is_rolled_back_entirely() {
        let db = database();
        let mut writer = db.open(request(&["id", "name", "age"])).await.unwrap();
        writer.write_batch(&[person(1, "a")]).await.unwrap();

        let err = writer
            .write_batch(&[person(2, "b"), person(3, "a")])
            .await
            .unwrap_err();
        assert!(matches!(err, DxportError::Constraint(_)));
        // the first batch survives, nothing from the second does
        assert_eq!(db.row_count(&TableRef::new("main", "people")).unwrap(), 1);
    }

    #[tokio::test]
    async fn truncate_removes_every_row() {
        let db = database();
        db.execute_batch("INSERT INTO people (name) VALUES ('a'), ('b')")
            .unwrap();
        let removed = db.truncate(&TableRef::new("main", "people")).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(db.row_count(&TableRef::new("main", "people")).unwrap(), 0);
    }

    #[tokio::test]
    async fn caller_timeout_fires_while_the_table_is_locked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.db");
        let db = SqliteDatabase::open(&path).unwrap();
        db.execute_batch("CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE, age INT)")
            .unwrap();

        let other = RusqliteConnection::open(&path).unwrap();
        other.execute_batch("BEGIN IMMEDIATE").unwrap();

        let mut writer = db
            .open(BulkWriteRequest {
                timeout: Duration::from_millis(300),
                ..request(&["id", "name", "age"])
            })
            .await
            .unwrap();
        let outcome =
            tokio::time::timeout(Duration::from_millis(50), writer.write_batch(&[person(1, "a")]))
                .await;
        assert!(outcome.is_err(), "write should still be waiting on the lock");

        // waits for the abandoned batch to give up
        assert_eq!(db.row_count(&TableRef::new("main", "people")).unwrap(), 0);
        other.execute_batch("ROLLBACK").unwrap();

        writer.write_batch(&[person(2, "b")]).await.unwrap();
        assert_eq!(db.row_count(&TableRef::new("main", "people")).unwrap(), 1);
    }

    #[tokio::test]
    async fn open_requires_columns() {
        let db = database();
        assert!(db.open(request(&[])).await.is_err());
    }
}
