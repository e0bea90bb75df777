//! JSON reader and writer (array of flat objects)

use serde_json::{Map, Value as JsonValue};

use dxport_core::{Cell, TabularDataset};

use crate::format::{FormatError, FormatOptions};
use crate::text_encoding;

fn json_cell(value: &JsonValue, column: &str, row: usize) -> Result<Cell, FormatError> {
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::String(s) => Ok(Some(s.clone())),
        JsonValue::Number(n) => Ok(Some(n.to_string())),
        JsonValue::Bool(b) => Ok(Some(b.to_string())),
        JsonValue::Array(_) | JsonValue::Object(_) => Err(FormatError::Json(format!(
            "nested value in column '{}' of object {} (objects must be flat)",
            column,
            row + 1
        ))),
    }
}

/// Read a JSON array of flat objects.
///
/// Column names come from the keys of the first object; every object is
/// read against that fixed list, so keys missing from later objects become
/// NULL and keys absent from the first object are ignored.
pub fn read(bytes: &[u8], options: &FormatOptions) -> Result<TabularDataset, FormatError> {
    let text = text_encoding::decode(bytes, options.encoding)?;
    if text.trim().is_empty() {
        return Ok(TabularDataset::default());
    }

    let document: JsonValue =
        serde_json::from_str(&text).map_err(|e| FormatError::Json(e.to_string()))?;
    let JsonValue::Array(items) = document else {
        return Err(FormatError::Json(
            "expected a top-level array of objects".to_string(),
        ));
    };

    let mut objects = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        match item {
            JsonValue::Object(map) => objects.push(map),
            other => {
                return Err(FormatError::Json(format!(
                    "element {} is not an object (found {})",
                    idx + 1,
                    json_kind(other)
                )));
            }
        }
    }

    let Some(first) = objects.first() else {
        return Ok(TabularDataset::default());
    };
    let columns: Vec<String> = first.keys().cloned().collect();

    let mut dataset = TabularDataset::new(columns.clone());
    for (row_idx, object) in objects.iter().enumerate() {
        let row = columns
            .iter()
            .map(|column| match object.get(column) {
                Some(value) => json_cell(value, column, row_idx),
                None => Ok(None),
            })
            .collect::<Result<Vec<_>, _>>()?;
        dataset.push_row(row);
    }
    Ok(dataset)
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Write a pretty-printed array of objects, keys in column order
pub fn write(dataset: &TabularDataset, options: &FormatOptions) -> Result<Vec<u8>, FormatError> {
    let items: Vec<JsonValue> = dataset
        .rows()
        .iter()
        .map(|row| {
            let object: Map<String, JsonValue> = dataset
                .columns()
                .iter()
                .zip(row)
                .map(|(column, cell)| {
                    let value = match cell {
                        Some(text) => JsonValue::String(text.clone()),
                        None => JsonValue::Null,
                    };
                    (column.clone(), value)
                })
                .collect();
            JsonValue::Object(object)
        })
        .collect();

    let text = serde_json::to_string_pretty(&JsonValue::Array(items))
        .map_err(|e| FormatError::Write(e.to_string()))?;
    text_encoding::encode(&text, options.encoding)
}
