//! Destination table metadata

use serde::{Deserialize, Serialize};

/// Semantic type a destination column's native type maps to.
///
/// Drives value parsing during coercion and literal rendering in SQL scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticType {
    Integer,
    BigInteger,
    SmallInteger,
    Byte,
    Boolean,
    Decimal,
    Float,
    DateTime,
    Guid,
    String,
}

impl SemanticType {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Integer => "Integer",
            Self::BigInteger => "BigInteger",
            Self::SmallInteger => "SmallInteger",
            Self::Byte => "Byte",
            Self::Boolean => "Boolean",
            Self::Decimal => "Decimal",
            Self::Float => "Float",
            Self::DateTime => "DateTime",
            Self::Guid => "Guid",
            Self::String => "String",
        }
    }

    /// Whether SQL literals of this type are written single-quoted
    pub fn is_quoted_literal(&self) -> bool {
        matches!(self, Self::String | Self::DateTime | Self::Guid)
    }
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Column as reported by a catalog provider, before type mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogColumn {
    pub name: String,
    pub native_type: String,
    pub is_nullable: bool,
}

impl CatalogColumn {
    pub fn new(name: impl Into<String>, native_type: impl Into<String>, is_nullable: bool) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.into(),
            is_nullable,
        }
    }
}

/// A destination column with its mapped semantic type.
///
/// Produced once per job by the schema resolver and never mutated afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub native_type: String,
    pub semantic_type: SemanticType,
    pub nullable: bool,
}

/// Fully qualified destination table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: String,
    pub table: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// `[schema].[table]` with closing brackets escaped
    pub fn bracket_quoted(&self) -> String {
        format!(
            "{}.{}",
            bracket_quote(&self.schema),
            bracket_quote(&self.table)
        )
    }

    /// `"schema"."table"` with embedded double quotes escaped
    pub fn double_quoted(&self) -> String {
        format!(
            "\"{}\".\"{}\"",
            self.schema.replace('"', "\"\""),
            self.table.replace('"', "\"\"")
        )
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Quote an identifier with square brackets
pub fn bracket_quote(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}
