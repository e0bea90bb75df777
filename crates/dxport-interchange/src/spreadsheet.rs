//! Spreadsheet reader (xlsx/xls/ods) and xlsx writer

use std::io::Cursor;

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use rust_xlsxwriter::{Format, Workbook};

use dxport_core::{Cell, TabularDataset, synthesized_columns};

use crate::format::{ExportContext, FormatError, FormatOptions};

const MAX_SHEET_NAME: usize = 31;
const MAX_COLUMNS: usize = 16_384;
const MAX_ROWS: usize = 1_048_576;

fn spreadsheet_error(e: impl std::fmt::Display) -> FormatError {
    FormatError::Spreadsheet(e.to_string())
}

/// Render a cell as raw text; empty cells become NULL
fn cell_text(data: &Data) -> Cell {
    match data {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(match dt.as_datetime() {
            Some(ndt) => ndt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        }),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Error(e) => Some(e.to_string()),
    }
}

/// Read the first worksheet.
///
/// Coordinates are absolute: row 1 is the header row (when enabled) even if
/// the sheet's used range starts further down or right.
pub fn read(bytes: &[u8], options: &FormatOptions) -> Result<TabularDataset, FormatError> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(spreadsheet_error)?;

    let range = match workbook.worksheet_range_at(0) {
        Some(result) => result.map_err(spreadsheet_error)?,
        None => return Ok(TabularDataset::default()),
    };

    Ok(range_to_dataset(&range, options.include_headers))
}

fn range_to_dataset(range: &Range<Data>, include_headers: bool) -> TabularDataset {
    let Some((last_row, last_col)) = range.end() else {
        return TabularDataset::default();
    };
    let width = last_col as usize + 1;

    let cell_at = |row: u32, col: usize| -> Cell {
        range
            .get_value((row, col as u32))
            .and_then(cell_text)
    };

    let (columns, first_data_row) = if include_headers {
        let columns = (0..width)
            .map(|col| cell_at(0, col).unwrap_or_else(|| format!("Column{}", col + 1)))
            .collect();
        (columns, 1)
    } else {
        (synthesized_columns(width), 0)
    };

    let mut dataset = TabularDataset::new(columns);
    for row in first_data_row..=last_row {
        dataset.push_row((0..width).map(|col| cell_at(row, col)).collect());
    }
    dataset
}

/// Sheet names are limited to 31 characters and may not contain `[]:*?/\`
fn sheet_name(table: &str) -> String {
    let cleaned: String = table
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(MAX_SHEET_NAME)
        .collect();
    let cleaned = cleaned.trim_matches('\'').to_string();
    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

/// Write an xlsx workbook with a single sheet named after the table.
/// Cells are written as text; NULL cells are left blank.
pub fn write(
    dataset: &TabularDataset,
    context: &ExportContext,
    options: &FormatOptions,
) -> Result<Vec<u8>, FormatError> {
    let header_rows = usize::from(options.include_headers);
    if dataset.column_count() > MAX_COLUMNS {
        return Err(FormatError::Write(format!(
            "{} columns exceed the worksheet limit of {}",
            dataset.column_count(),
            MAX_COLUMNS
        )));
    }
    if dataset.row_count() + header_rows > MAX_ROWS {
        return Err(FormatError::Write(format!(
            "{} rows exceed the worksheet limit of {}",
            dataset.row_count(),
            MAX_ROWS
        )));
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sheet_name(&context.table.table))
        .map_err(spreadsheet_error)?;

    if options.include_headers {
        let bold = Format::new().set_bold();
        for (col, name) in dataset.columns().iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, name, &bold)
                .map_err(spreadsheet_error)?;
        }
    }

    for (row_idx, row) in dataset.rows().iter().enumerate() {
        let sheet_row = (row_idx + header_rows) as u32;
        for (col, cell) in row.iter().enumerate() {
            if let Some(text) = cell {
                worksheet
                    .write_string(sheet_row, col as u16, text)
                    .map_err(spreadsheet_error)?;
            }
        }
    }

    workbook.save_to_buffer().map_err(spreadsheet_error)
}
