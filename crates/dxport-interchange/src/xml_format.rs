//! XML reader and writer
//!
//! Expected shape:
//!
//! ```xml
//! <DocumentElement xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
//!   <People><id>1</id><Order_Id name="Order Id">A-7</Order_Id></People>
//!   <People><id>2</id><Order_Id name="Order Id" xsi:nil="true"/></People>
//! </DocumentElement>
//! ```
//!
//! The first child of the root defines the columns; every child of the root
//! (the first included) is a row whose fields are matched by column name.
//! A field's column name is its `name` attribute when present, else the
//! element name. `xsi:nil="true"` marks NULL; an empty element is `""`.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use dxport_core::{Cell, TabularDataset};

use crate::format::{ExportContext, FormatError, FormatOptions};
use crate::text_encoding;

const ROOT_ELEMENT: &str = "DocumentElement";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

type XmlRow = Vec<(String, Cell)>;

fn element_name(name: quick_xml::name::QName<'_>) -> String {
    String::from_utf8_lossy(name.as_ref()).into_owned()
}

/// Column name and nil flag of a field element
fn field_header(start: &BytesStart<'_>) -> Result<(String, bool), String> {
    let mut column = element_name(start.name());
    let mut nil = false;
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        match (attr.key.prefix(), attr.key.local_name().as_ref()) {
            (None, b"name") => column = value.into_owned(),
            (Some(_), b"nil") => nil = value == "true" || value == "1",
            _ => {}
        }
    }
    Ok((column, nil))
}

/// Read an XML document into a dataset
pub fn read(bytes: &[u8], options: &FormatOptions) -> Result<TabularDataset, FormatError> {
    let text = text_encoding::decode(bytes, options.encoding)?;
    if text.trim().is_empty() {
        return Ok(TabularDataset::default());
    }

    let mut reader = Reader::from_str(&text);
    let xml_error = |reader: &Reader<&[u8]>, message: String| FormatError::Xml {
        position: reader.buffer_position() as u64,
        message,
    };

    let mut depth = 0usize;
    let mut saw_root = false;
    let mut rows: Vec<XmlRow> = Vec::new();
    let mut current_row: XmlRow = Vec::new();
    // (column, nil, text)
    let mut current_field: Option<(String, bool, String)> = None;

    loop {
        let event = reader.read_event().map_err(|e| FormatError::Xml {
            position: reader.error_position() as u64,
            message: e.to_string(),
        })?;

        match event {
            Event::Start(e) => {
                match depth {
                    0 if saw_root => {
                        return Err(xml_error(&reader, "multiple root elements".to_string()));
                    }
                    0 => saw_root = true,
                    1 => current_row = Vec::new(),
                    2 => {
                        let (column, nil) =
                            field_header(&e).map_err(|message| xml_error(&reader, message))?;
                        current_field = Some((column, nil, String::new()));
                    }
                    _ => {
                        return Err(xml_error(
                            &reader,
                            format!("unexpected nested element <{}>", element_name(e.name())),
                        ));
                    }
                }
                depth += 1;
            }
            Event::Empty(e) => match depth {
                0 if saw_root => {
                    return Err(xml_error(&reader, "multiple root elements".to_string()));
                }
                0 => saw_root = true,
                1 => rows.push(Vec::new()),
                2 => {
                    let (column, nil) =
                        field_header(&e).map_err(|message| xml_error(&reader, message))?;
                    current_row.push((column, (!nil).then(String::new)));
                }
                _ => {
                    return Err(xml_error(
                        &reader,
                        format!("unexpected nested element <{}>", element_name(e.name())),
                    ));
                }
            },
            Event::Text(t) => {
                if let Some((_, _, value)) = current_field.as_mut() {
                    let unescaped = t
                        .unescape()
                        .map_err(|e| xml_error(&reader, e.to_string()))?;
                    value.push_str(&unescaped);
                }
            }
            Event::CData(t) => {
                if let Some((_, _, value)) = current_field.as_mut() {
                    value.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Event::End(_) => {
                match depth {
                    3 => {
                        if let Some((column, nil, value)) = current_field.take() {
                            current_row.push((column, (!nil).then_some(value)));
                        }
                    }
                    2 => rows.push(std::mem::take(&mut current_row)),
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(xml_error(&reader, "document ended inside an element".to_string()));
    }

    Ok(rows_to_dataset(rows))
}

fn rows_to_dataset(rows: Vec<XmlRow>) -> TabularDataset {
    let Some(first) = rows.first() else {
        return TabularDataset::default();
    };

    let mut columns: Vec<String> = Vec::new();
    for (name, _) in first {
        if !columns.contains(name) {
            columns.push(name.clone());
        }
    }

    let mut dataset = TabularDataset::new(columns.clone());
    for mut row in rows {
        let cells = columns
            .iter()
            .map(|column| {
                row.iter_mut()
                    .find(|(name, _)| name == column)
                    .and_then(|(_, cell)| cell.take())
            })
            .collect();
        dataset.push_row(cells);
    }
    dataset
}

/// Make a string usable as an element name
fn xml_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let starts_ok = out
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    if !starts_ok {
        out.insert(0, '_');
    }
    out
}

/// Write the dataset with one element per row named after the table.
///
/// Every column is written in every row. NULL cells carry `xsi:nil="true"`;
/// empty strings are written as plain empty elements. Columns whose name is
/// not a valid element name keep it in a `name` attribute.
pub fn write(
    dataset: &TabularDataset,
    context: &ExportContext,
    options: &FormatOptions,
) -> Result<Vec<u8>, FormatError> {
    let write_error = |e: quick_xml::Error| FormatError::Write(e.to_string());
    let row_element = xml_name(&context.table.table);
    let fields: Vec<BytesStart<'_>> = dataset
        .columns()
        .iter()
        .map(|column| {
            let element = xml_name(column);
            let mut start = BytesStart::new(element.clone());
            if element != *column {
                start.push_attribute(("name", column.as_str()));
            }
            start
        })
        .collect();
    let label = text_encoding::label(options.encoding);

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some(&label), Some("yes"))))
        .map_err(write_error)?;
    writer
        .write_event(Event::Start(
            BytesStart::new(ROOT_ELEMENT).with_attributes([("xmlns:xsi", XSI_NAMESPACE)]),
        ))
        .map_err(write_error)?;

    for row in dataset.rows() {
        writer
            .write_event(Event::Start(BytesStart::new(row_element.as_str())))
            .map_err(write_error)?;
        for (field, cell) in fields.iter().zip(row) {
            match cell {
                None => {
                    let nil = field.clone().with_attributes([("xsi:nil", "true")]);
                    writer.write_event(Event::Empty(nil)).map_err(write_error)?;
                }
                Some(text) if text.is_empty() => {
                    writer
                        .write_event(Event::Empty(field.borrow()))
                        .map_err(write_error)?;
                }
                Some(text) => {
                    writer
                        .write_event(Event::Start(field.borrow()))
                        .map_err(write_error)?;
                    writer
                        .write_event(Event::Text(BytesText::new(text)))
                        .map_err(write_error)?;
                    writer
                        .write_event(Event::End(field.to_end()))
                        .map_err(write_error)?;
                }
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(row_element.as_str())))
            .map_err(write_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))
        .map_err(write_error)?;

    let text =
        String::from_utf8(writer.into_inner()).map_err(|e| FormatError::Write(e.to_string()))?;
    text_encoding::encode(&text, options.encoding)
}
