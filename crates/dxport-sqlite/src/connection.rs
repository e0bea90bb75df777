//! SQLite database handle shared by the catalog, sink and row source

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{Connection as RusqliteConnection, OpenFlags};

use dxport_core::{DxportError, Result, TableRef, Value};

/// SQLite database used as an exchange destination and export source
#[derive(Clone, Debug)]
pub struct SqliteDatabase {
    pub(crate) conn: Arc<Mutex<RusqliteConnection>>,
}

impl SqliteDatabase {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = expand_path(path.as_ref())?;
        tracing::info!(path = %path.display(), "opening SQLite database");

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            return Err(DxportError::Connection(format!(
                "Parent directory does not exist: {}",
                parent.display()
            )));
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = RusqliteConnection::open_with_flags(&path, flags).map_err(|e| {
            DxportError::Connection(format!(
                "Failed to open SQLite database at '{}': {}",
                path.display(),
                e
            ))
        })?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DxportError::Connection(format!("Failed to set journal mode: {}", e)))?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(|e| DxportError::Connection(format!("Failed to set synchronous mode: {}", e)))?;

        Self::from_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = RusqliteConnection::open_in_memory().map_err(|e| {
            DxportError::Connection(format!("Failed to open in-memory database: {}", e))
        })?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: RusqliteConnection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| DxportError::Connection(format!("Failed to enable foreign keys: {}", e)))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run one or more statements with no parameters (DDL, fixtures)
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn
            .lock()
            .execute_batch(sql)
            .map_err(|e| DxportError::Query(format!("Failed to execute batch: {}", e)))
    }

    /// Number of rows currently in a table
    pub fn row_count(&self, table: &TableRef) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.double_quoted());
        let count: i64 = self
            .conn
            .lock()
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| DxportError::Query(format!("Failed to count rows: {}", e)))?;
        Ok(count as u64)
    }
}

/// Expand a leading `~/` to the home directory
fn expand_path(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => {
            let home = dirs::home_dir().ok_or_else(|| {
                DxportError::Configuration("Unable to determine home directory".into())
            })?;
            Ok(home.join(rest))
        }
        Err(_) => Ok(path.to_path_buf()),
    }
}

/// Convert a destination value to its SQLite storage form
pub(crate) fn value_to_rusqlite(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;

    match value {
        Value::Null => Sql::Null,
        Value::Bool(b) => Sql::Integer(i64::from(*b)),
        Value::Byte(i) => Sql::Integer(i64::from(*i)),
        Value::Int16(i) => Sql::Integer(i64::from(*i)),
        Value::Int32(i) => Sql::Integer(i64::from(*i)),
        Value::Int64(i) => Sql::Integer(*i),
        Value::Float64(f) => Sql::Real(*f),
        Value::Decimal(d) => Sql::Text(d.clone()),
        Value::String(s) => Sql::Text(s.clone()),
        Value::Uuid(u) => Sql::Text(u.to_string()),
        Value::DateTime(_) => Sql::Text(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_map_to_sqlite_storage_classes() {
        use rusqlite::types::Value as Sql;
        assert_eq!(value_to_rusqlite(&Value::Bool(true)), Sql::Integer(1));
        assert_eq!(value_to_rusqlite(&Value::Int16(-3)), Sql::Integer(-3));
        assert_eq!(value_to_rusqlite(&Value::Float64(2.5)), Sql::Real(2.5));
        assert_eq!(
            value_to_rusqlite(&Value::Decimal("1.50".into())),
            Sql::Text("1.50".into())
        );
        assert_eq!(value_to_rusqlite(&Value::Null), Sql::Null);
    }

    #[test]
    fn home_relative_paths_are_expanded() {
        let expanded = expand_path(Path::new("~/data/app.db")).unwrap();
        assert!(expanded.ends_with("data/app.db"));
        assert!(!expanded.starts_with("~"));
        assert_eq!(
            expand_path(Path::new("/tmp/x.db")).unwrap(),
            PathBuf::from("/tmp/x.db")
        );
    }

    #[test]
    fn open_rejects_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("db.sqlite");
        assert!(matches!(
            SqliteDatabase::open(&path),
            Err(DxportError::Connection(_))
        ));
    }

    #[test]
    fn open_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.sqlite");
        let db = SqliteDatabase::open(&path).unwrap();
        db.execute_batch("CREATE TABLE t (a INTEGER)").unwrap();
        assert!(path.exists());
        assert_eq!(db.row_count(&TableRef::new("main", "t")).unwrap(), 0);
    }
}
