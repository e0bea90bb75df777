//! Table metadata from `pragma_table_info`

use std::collections::HashSet;

use async_trait::async_trait;

use dxport_core::{CatalogColumn, CatalogProvider, DxportError, Result, TableRef};

use crate::connection::SqliteDatabase;

#[derive(Debug)]
struct PragmaColumn {
    name: String,
    declared_type: String,
    not_null: bool,
    pk: i64,
}

impl SqliteDatabase {
    fn table_info(&self, table: &TableRef) -> Result<Vec<PragmaColumn>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1, ?2) ORDER BY cid",
            )
            .map_err(|e| DxportError::Query(format!("Failed to prepare table_info: {}", e)))?;

        let rows = stmt
            .query_map([table.table.as_str(), table.schema.as_str()], |row| {
                Ok(PragmaColumn {
                    name: row.get(0)?,
                    declared_type: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    not_null: row.get::<_, i64>(2)? != 0,
                    pk: row.get(3)?,
                })
            })
            .map_err(|e| DxportError::Query(format!("Failed to read table_info: {}", e)))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| DxportError::Query(format!("Failed to read table_info: {}", e)))
    }
}

/// The single-column `INTEGER PRIMARY KEY` (rowid alias), if the table has one
fn rowid_alias(columns: &[PragmaColumn]) -> Option<&PragmaColumn> {
    let mut keys = columns.iter().filter(|c| c.pk > 0);
    match (keys.next(), keys.next()) {
        (Some(key), None) if key.declared_type.eq_ignore_ascii_case("INTEGER") => Some(key),
        _ => None,
    }
}

#[async_trait]
impl CatalogProvider for SqliteDatabase {
    #[tracing::instrument(skip(self, table), fields(table = %table))]
    async fn get_columns(&self, table: &TableRef) -> Result<Vec<CatalogColumn>> {
        let columns = self.table_info(table)?;
        let alias = rowid_alias(&columns).map(|c| c.name.clone());

        let catalog_columns = columns
            .into_iter()
            .map(|c| {
                let is_alias = alias.as_deref() == Some(c.name.as_str());
                let native_type = if c.declared_type.trim().is_empty() {
                    "TEXT".to_string()
                } else {
                    c.declared_type
                };
                CatalogColumn::new(c.name, native_type, !c.not_null && !is_alias)
            })
            .collect::<Vec<_>>();

        tracing::trace!(columns = catalog_columns.len(), "fetched column information");
        Ok(catalog_columns)
    }

    #[tracing::instrument(skip(self, table), fields(table = %table))]
    async fn get_identity_columns(&self, table: &TableRef) -> Result<HashSet<String>> {
        let columns = self.table_info(table)?;
        Ok(rowid_alias(&columns)
            .map(|c| c.name.clone())
            .into_iter()
            .collect())
    }
}
