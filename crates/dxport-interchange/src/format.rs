//! File formats supported by the exchange engine
//!
//! `FileFormat` is a closed set; each variant knows how to read a source
//! into a [`TabularDataset`] and how to write one back out. The SQL script
//! variant is export-only.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use dxport_core::{ColumnSchema, TableRef, TabularDataset};

use crate::{csv_format, json_format, spreadsheet, sql_script, xml_format};

/// Errors raised while parsing or producing a formatted file.
///
/// Any of these during a read is fatal for the job: there is no partial-row
/// recovery.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("CSV parse error at line {line}: {message}")]
    Csv { line: u64, message: String },

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("XML error at position {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("Write error: {0}")]
    Write(String),

    #[error("{0} is not supported")]
    Unsupported(String),
}

/// Closed set of external file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileFormat {
    #[default]
    Csv,
    Spreadsheet,
    Json,
    Xml,
    /// Generated `INSERT` script; export only
    SqlScript,
}

impl FileFormat {
    pub fn all() -> &'static [Self] {
        &[
            Self::Csv,
            Self::Spreadsheet,
            Self::Json,
            Self::Xml,
            Self::SqlScript,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Spreadsheet => "Spreadsheet",
            Self::Json => "JSON",
            Self::Xml => "XML",
            Self::SqlScript => "SQL Script",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Spreadsheet => "xlsx",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::SqlScript => "sql",
        }
    }

    /// Whether the format can be used as an import source
    pub fn supports_import(&self) -> bool {
        !matches!(self, Self::SqlScript)
    }

    /// Infer the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "txt" | "tsv" => Some(Self::Csv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Spreadsheet),
            "json" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            "sql" => Some(Self::SqlScript),
            _ => None,
        }
    }

    /// Parse raw file bytes into a dataset
    pub fn read(
        &self,
        bytes: &[u8],
        options: &FormatOptions,
    ) -> Result<TabularDataset, FormatError> {
        match self {
            Self::Csv => csv_format::read(bytes, options),
            Self::Spreadsheet => spreadsheet::read(bytes, options),
            Self::Json => json_format::read(bytes, options),
            Self::Xml => xml_format::read(bytes, options),
            Self::SqlScript => Err(FormatError::Unsupported(
                "Importing from a SQL script".to_string(),
            )),
        }
    }

    /// Render a dataset into file bytes
    pub fn write(
        &self,
        dataset: &TabularDataset,
        context: &ExportContext,
        options: &FormatOptions,
    ) -> Result<Vec<u8>, FormatError> {
        match self {
            Self::Csv => csv_format::write(dataset, options),
            Self::Spreadsheet => spreadsheet::write(dataset, context, options),
            Self::Json => json_format::write(dataset, options),
            Self::Xml => xml_format::write(dataset, context, options),
            Self::SqlScript => sql_script::write(dataset, context, options),
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "spreadsheet" | "xlsx" | "excel" => Ok(Self::Spreadsheet),
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            "sql" | "sql-script" => Ok(Self::SqlScript),
            other => Err(format!("unknown format '{}'", other)),
        }
    }
}

/// Field delimiter for delimited text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FieldDelimiter {
    #[default]
    #[serde(rename = ",", alias = "comma")]
    Comma,
    #[serde(rename = ";", alias = "semicolon")]
    Semicolon,
    #[serde(rename = "\t", alias = "tab")]
    Tab,
    #[serde(rename = "|", alias = "pipe")]
    Pipe,
}

impl FieldDelimiter {
    pub fn as_byte(&self) -> u8 {
        match self {
            FieldDelimiter::Comma => b',',
            FieldDelimiter::Semicolon => b';',
            FieldDelimiter::Tab => b'\t',
            FieldDelimiter::Pipe => b'|',
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Comma => "Comma (,)",
            Self::Semicolon => "Semicolon (;)",
            Self::Tab => "Tab",
            Self::Pipe => "Pipe (|)",
        }
    }
}

impl FromStr for FieldDelimiter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "," | "comma" => Ok(Self::Comma),
            ";" | "semicolon" => Ok(Self::Semicolon),
            "\t" | "\\t" | "tab" => Ok(Self::Tab),
            "|" | "pipe" => Ok(Self::Pipe),
            other => Err(format!("unsupported delimiter '{}'", other)),
        }
    }
}

/// Character encoding of a text-based file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextEncoding {
    #[default]
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "utf-16le", alias = "utf-16")]
    Utf16Le,
    #[serde(rename = "utf-16be")]
    Utf16Be,
    #[serde(rename = "ascii")]
    Ascii,
    /// Windows code page number (e.g. 1252)
    #[serde(rename = "codepage")]
    Codepage(u16),
}

impl TextEncoding {
    pub fn display_name(&self) -> String {
        match self {
            Self::Utf8 => "UTF-8".to_string(),
            Self::Utf16Le => "UTF-16 LE".to_string(),
            Self::Utf16Be => "UTF-16 BE".to_string(),
            Self::Ascii => "ASCII".to_string(),
            Self::Codepage(cp) => format!("Code page {}", cp),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "utf-16" | "utf16" | "utf-16le" | "unicode" => Ok(Self::Utf16Le),
            "utf-16be" => Ok(Self::Utf16Be),
            "ascii" | "us-ascii" => Ok(Self::Ascii),
            _ => {
                let digits = lower
                    .trim_start_matches("windows-")
                    .trim_start_matches("cp")
                    .trim_start_matches("codepage");
                digits
                    .parse::<u16>()
                    .map(Self::Codepage)
                    .map_err(|_| format!("unknown encoding '{}'", s))
            }
        }
    }
}

/// Reader/writer options shared by every format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// First row (CSV, spreadsheet) carries column names
    pub include_headers: bool,
    /// Character encoding for text formats
    pub encoding: TextEncoding,
    /// Field delimiter (CSV only)
    pub delimiter: FieldDelimiter,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            include_headers: true,
            encoding: TextEncoding::Utf8,
            delimiter: FieldDelimiter::Comma,
        }
    }
}

impl FormatOptions {
    pub fn with_headers(mut self, include_headers: bool) -> Self {
        self.include_headers = include_headers;
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_delimiter(mut self, delimiter: FieldDelimiter) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Destination metadata available to writers during export
#[derive(Debug, Clone)]
pub struct ExportContext {
    pub table: TableRef,
    pub columns: Vec<ColumnSchema>,
    pub identity_columns: HashSet<String>,
}

impl ExportContext {
    /// Context without column metadata, for formats that do not need it
    pub fn for_table(table: TableRef) -> Self {
        Self {
            table,
            columns: Vec::new(),
            identity_columns: HashSet::new(),
        }
    }
}
