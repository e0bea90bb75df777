//! Delimited text reader and writer

use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};

use dxport_core::{Cell, TabularDataset, synthesized_columns};

use crate::format::{FormatError, FormatOptions};
use crate::text_encoding;

fn parse_error(e: csv::Error) -> FormatError {
    let line = e.position().map(|p| p.line()).unwrap_or(0);
    FormatError::Csv {
        line,
        message: e.to_string(),
    }
}

/// A record whose raw text is nothing but whitespace. A quoted empty
/// field (`""`) is a value, not a blank line.
fn is_blank(text: &str, record: &StringRecord, next_record_start: u64) -> bool {
    let Some(start) = record.position().map(|p| p.byte() as usize) else {
        return false;
    };
    text.get(start..next_record_start as usize)
        .is_some_and(|raw| raw.trim().is_empty())
}

/// Read delimited text.
///
/// Quoted fields may contain the delimiter; the surrounding quotes are
/// removed. Empty fields are kept as empty strings.
pub fn read(bytes: &[u8], options: &FormatOptions) -> Result<TabularDataset, FormatError> {
    let text = text_encoding::decode(bytes, options.encoding)?;

    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter.as_byte())
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut headers: Option<Vec<String>> = None;
    let mut records: Vec<Vec<Cell>> = Vec::new();

    let mut record = StringRecord::new();
    while reader.read_record(&mut record).map_err(parse_error)? {
        if is_blank(&text, &record, reader.position().byte()) {
            continue;
        }

        if options.include_headers && headers.is_none() {
            headers = Some(record.iter().map(|f| f.trim().to_string()).collect());
            continue;
        }

        records.push(record.iter().map(|f| Some(f.to_string())).collect());
    }

    let columns = match headers {
        Some(headers) => headers,
        None => {
            let widest = records.iter().map(Vec::len).max().unwrap_or(0);
            synthesized_columns(widest)
        }
    };

    tracing::debug!(
        columns = columns.len(),
        rows = records.len(),
        "parsed delimited text"
    );
    Ok(TabularDataset::from_rows(columns, records))
}

/// Write delimited text with minimal quoting and CRLF record terminators.
/// NULL cells are written as empty fields.
pub fn write(dataset: &TabularDataset, options: &FormatOptions) -> Result<Vec<u8>, FormatError> {
    let mut writer = WriterBuilder::new()
        .delimiter(options.delimiter.as_byte())
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    let to_write_error = |e: csv::Error| FormatError::Write(e.to_string());

    if options.include_headers {
        writer
            .write_record(dataset.columns())
            .map_err(to_write_error)?;
    }

    for row in dataset.rows() {
        writer
            .write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))
            .map_err(to_write_error)?;
    }

    let buffer = writer
        .into_inner()
        .map_err(|e| FormatError::Write(e.to_string()))?;
    let text = String::from_utf8(buffer).map_err(|e| FormatError::Write(e.to_string()))?;
    text_encoding::encode(&text, options.encoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{FieldDelimiter, TextEncoding};
    use pretty_assertions::assert_eq;

    fn row(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn reads_header_and_rows() {
        let dataset = read(b"id,name,age\n1,Alice,30\n2,Bob,\n", &FormatOptions::default()).unwrap();
        assert_eq!(dataset.columns(), &["id", "name", "age"]);
        assert_eq!(dataset.rows(), &[row(&["1", "Alice", "30"]), row(&["2", "Bob", ""])]);
    }

    #[test]
    fn skips_blank_lines() {
        let dataset = read(b"id,name\n\n1,a\n   \n2,b\n\n", &FormatOptions::default()).unwrap();
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.cell(1, 1), Some("b"));
    }

    #[test]
    fn quoted_empty_field_is_a_row() {
        let dataset = read(b"note\r\na\r\n\"\"\r\nb\r\n", &FormatOptions::default()).unwrap();
        assert_eq!(dataset.rows(), &[row(&["a"]), row(&[""]), row(&["b"])]);
    }

    #[test]
    fn single_column_nulls_survive_write_and_read() {
        let dataset = TabularDataset::from_rows(
            vec!["note".into()],
            vec![vec![Some("a".into())], vec![None], vec![Some("b".into())]],
        );
        let bytes = write(&dataset, &FormatOptions::default()).unwrap();
        assert_eq!(String::from_utf8(bytes.clone()).unwrap(), "note\r\na\r\n\"\"\r\nb\r\n");

        let back = read(&bytes, &FormatOptions::default()).unwrap();
        assert_eq!(back.row_count(), 3);
        assert_eq!(back.cell(1, 0), Some(""));
    }

    #[test]
    fn strips_quotes_and_keeps_embedded_delimiters() {
        let input = b"\"id\",\"full name\"\n1,\"Smith, John\"\n2,\"say \"\"hi\"\"\"\n";
        let dataset = read(input, &FormatOptions::default()).unwrap();
        assert_eq!(dataset.columns(), &["id", "full name"]);
        assert_eq!(dataset.cell(0, 1), Some("Smith, John"));
        assert_eq!(dataset.cell(1, 1), Some("say \"hi\""));
    }

    #[test]
    fn synthesizes_columns_without_headers() {
        let options = FormatOptions::default().with_headers(false);
        let dataset = read(b"1,a\n2,b,extra\n", &options).unwrap();
        assert_eq!(dataset.columns(), &["Column1", "Column2", "Column3"]);
        assert_eq!(dataset.rows()[0], vec![Some("1".to_string()), Some("a".to_string()), None]);
        assert_eq!(dataset.row_count(), 2);
    }

    #[test]
    fn honours_delimiter_option() {
        for (delimiter, input) in [
            (FieldDelimiter::Semicolon, "a;b\n1;2\n"),
            (FieldDelimiter::Tab, "a\tb\n1\t2\n"),
            (FieldDelimiter::Pipe, "a|b\n1|2\n"),
        ] {
            let options = FormatOptions::default().with_delimiter(delimiter);
            let dataset = read(input.as_bytes(), &options).unwrap();
            assert_eq!(dataset.columns(), &["a", "b"], "{:?}", delimiter);
            assert_eq!(dataset.rows(), &[row(&["1", "2"])]);
        }
    }

    #[test]
    fn ragged_rows_are_normalised_to_header_width() {
        let dataset = read(b"a,b,c\n1\n1,2,3,4\n", &FormatOptions::default()).unwrap();
        assert_eq!(dataset.rows()[0], vec![Some("1".to_string()), None, None]);
        assert_eq!(dataset.rows()[1], row(&["1", "2", "3"]));
    }

    #[test]
    fn empty_input_yields_empty_dataset() {
        let dataset = read(b"", &FormatOptions::default()).unwrap();
        assert_eq!(dataset.column_count(), 0);
        assert!(dataset.is_empty());

        let dataset = read(b"id,name\n", &FormatOptions::default()).unwrap();
        assert_eq!(dataset.column_count(), 2);
        assert!(dataset.is_empty());
    }

    #[test]
    fn reading_twice_is_identical() {
        let input = b"id,name\r\n1,\"x, y\"\r\n2,z\r\n";
        let first = read(input, &FormatOptions::default()).unwrap();
        let second = read(input, &FormatOptions::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn write_quotes_only_when_needed() {
        let dataset = TabularDataset::from_rows(
            vec!["id".into(), "note".into()],
            vec![
                vec![Some("1".into()), Some("plain".into())],
                vec![Some("2".into()), Some("a,b".into())],
                vec![Some("3".into()), None],
            ],
        );
        let bytes = write(&dataset, &FormatOptions::default()).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "id,note\r\n1,plain\r\n2,\"a,b\"\r\n3,\r\n"
        );
    }

    #[test]
    fn write_then_read_preserves_values() {
        let dataset = TabularDataset::from_rows(
            vec!["a".into(), "b".into()],
            vec![row(&["x|y", "quote \" inside"]), row(&["ü", "line"])],
        );
        let options = FormatOptions::default()
            .with_delimiter(FieldDelimiter::Pipe)
            .with_encoding(TextEncoding::Utf16Le);
        let bytes = write(&dataset, &options).unwrap();
        assert_eq!(read(&bytes, &options).unwrap(), dataset);
    }

    #[test]
    fn write_without_headers() {
        let dataset = TabularDataset::from_rows(vec!["a".into()], vec![row(&["1"])]);
        let bytes = write(&dataset, &FormatOptions::default().with_headers(false)).unwrap();
        assert_eq!(bytes, b"1\r\n");
    }
}
