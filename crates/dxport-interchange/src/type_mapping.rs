//! Destination schema resolution
//!
//! Maps the catalog's native column types onto the fixed set of
//! [`SemanticType`]s that drive coercion and SQL literal rendering.

use std::collections::HashSet;
use std::sync::Arc;

use dxport_core::{
    CatalogProvider, ColumnSchema, DxportError, Result, SemanticType, TableRef,
};

/// Map a native type name onto its semantic type.
///
/// Matching is case-insensitive and ignores any `(length)` or
/// `(precision, scale)` suffix. Unknown types map to `String`.
pub fn semantic_type_for(native_type: &str) -> SemanticType {
    let base = native_type
        .split('(')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match base.as_str() {
        "int" | "integer" => SemanticType::Integer,
        "bigint" => SemanticType::BigInteger,
        "smallint" => SemanticType::SmallInteger,
        "tinyint" => SemanticType::Byte,
        "bit" => SemanticType::Boolean,
        "decimal" | "numeric" | "money" | "smallmoney" => SemanticType::Decimal,
        "float" | "real" => SemanticType::Float,
        "datetime" | "datetime2" | "smalldatetime" | "date" | "time" => SemanticType::DateTime,
        "uniqueidentifier" => SemanticType::Guid,
        _ => SemanticType::String,
    }
}

/// Destination schema for one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSchema {
    pub table: TableRef,
    /// Columns in ordinal order
    pub columns: Vec<ColumnSchema>,
    pub identity_columns: HashSet<String>,
}

impl ResolvedSchema {
    /// Case-insensitive identity column check
    pub fn is_identity(&self, column: &str) -> bool {
        self.identity_columns
            .iter()
            .any(|c| c.eq_ignore_ascii_case(column))
    }
}

/// Resolves destination tables through a catalog provider
#[derive(Clone)]
pub struct SchemaResolver {
    catalog: Arc<dyn CatalogProvider>,
}

impl SchemaResolver {
    pub fn new(catalog: Arc<dyn CatalogProvider>) -> Self {
        Self { catalog }
    }

    /// Fetch and map the table's columns and identity columns.
    ///
    /// A table with no columns is treated as missing.
    #[tracing::instrument(skip(self, table), fields(table = %table))]
    pub async fn resolve(&self, table: &TableRef) -> Result<ResolvedSchema> {
        let catalog_columns = self.catalog.get_columns(table).await?;
        if catalog_columns.is_empty() {
            return Err(DxportError::Schema(format!(
                "table {} not found or has no columns",
                table
            )));
        }

        let columns: Vec<ColumnSchema> = catalog_columns
            .into_iter()
            .map(|c| ColumnSchema {
                semantic_type: semantic_type_for(&c.native_type),
                name: c.name,
                native_type: c.native_type,
                nullable: c.is_nullable,
            })
            .collect();

        let identity_columns = self.catalog.get_identity_columns(table).await?;

        tracing::debug!(
            columns = columns.len(),
            identity = identity_columns.len(),
            "resolved destination schema"
        );

        Ok(ResolvedSchema {
            table: table.clone(),
            columns,
            identity_columns,
        })
    }
}
