//! SQL `INSERT` script writer (export only)

use dxport_core::{ColumnSchema, SemanticType, TabularDataset, Value, bracket_quote};

use crate::coercion::parse_value;
use crate::format::{ExportContext, FormatError, FormatOptions};
use crate::text_encoding;

/// Rows per multi-row `INSERT` statement
const ROWS_PER_INSERT: usize = 1000;

fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Render one cell as a SQL literal for a column of the given type.
/// Text that does not parse as the column's type is written quoted.
fn literal(cell: Option<&str>, semantic_type: SemanticType) -> String {
    let Some(text) = cell else {
        return "NULL".to_string();
    };
    if semantic_type.is_quoted_literal() {
        return quote_literal(text);
    }
    match parse_value(text, semantic_type) {
        Some(Value::Bool(b)) => if b { "1" } else { "0" }.to_string(),
        Some(value) => value.to_string(),
        None => quote_literal(text),
    }
}

fn column_type(columns: &[ColumnSchema], name: &str) -> SemanticType {
    columns
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name))
        .map(|c| c.semantic_type)
        .unwrap_or(SemanticType::String)
}

fn render(dataset: &TabularDataset, context: &ExportContext, rows_per_insert: usize) -> String {
    if dataset.is_empty() {
        return String::new();
    }

    let table = context.table.bracket_quoted();
    let column_list = dataset
        .columns()
        .iter()
        .map(|c| bracket_quote(c))
        .collect::<Vec<_>>()
        .join(", ");
    let types: Vec<SemanticType> = dataset
        .columns()
        .iter()
        .map(|c| column_type(&context.columns, c))
        .collect();
    let has_identity = !context.identity_columns.is_empty();

    let mut out = String::new();
    if has_identity {
        out.push_str(&format!("SET IDENTITY_INSERT {} ON;\n", table));
    }

    for chunk in dataset.rows().chunks(rows_per_insert.max(1)) {
        out.push_str(&format!("INSERT INTO {} ({}) VALUES\n", table, column_list));
        let tuples: Vec<String> = chunk
            .iter()
            .map(|row| {
                let values: Vec<String> = row
                    .iter()
                    .zip(&types)
                    .map(|(cell, ty)| literal(cell.as_deref(), *ty))
                    .collect();
                format!("({})", values.join(", "))
            })
            .collect();
        out.push_str(&tuples.join(",\n"));
        out.push_str(";\n");
    }

    if has_identity {
        out.push_str(&format!("SET IDENTITY_INSERT {} OFF;\n", table));
    }
    out
}

/// Write the dataset as `INSERT` statements against the context's table.
///
/// When the table has identity columns the statements are wrapped in
/// `SET IDENTITY_INSERT ... ON/OFF`. An empty dataset produces an empty script.
pub fn write(
    dataset: &TabularDataset,
    context: &ExportContext,
    options: &FormatOptions,
) -> Result<Vec<u8>, FormatError> {
    let script = render(dataset, context, ROWS_PER_INSERT);
    tracing::debug!(
        table = %context.table,
        rows = dataset.row_count(),
        "rendered SQL script"
    );
    text_encoding::encode(&script, options.encoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dxport_core::TableRef;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn column(name: &str, semantic_type: SemanticType) -> ColumnSchema {
        ColumnSchema {
            name: name.to_string(),
            native_type: semantic_type.display_name().to_lowercase(),
            semantic_type,
            nullable: true,
        }
    }

    fn people_context(identity: &[&str]) -> ExportContext {
        ExportContext {
            table: TableRef::new("dbo", "People"),
            columns: vec![
                column("Id", SemanticType::Integer),
                column("Name", SemanticType::String),
            ],
            identity_columns: identity.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn people() -> TabularDataset {
        TabularDataset::from_rows(
            vec!["Id".into(), "Name".into()],
            vec![
                vec![Some("1".into()), Some("Alice".into())],
                vec![Some("2".into()), Some("O'Brien".into())],
            ],
        )
    }

    #[test]
    fn identity_insert_wraps_the_insert_statement() {
        let script = render(&people(), &people_context(&["Id"]), ROWS_PER_INSERT);
        assert_eq!(
            script,
            indoc! {"
                SET IDENTITY_INSERT [dbo].[People] ON;
                INSERT INTO [dbo].[People] ([Id], [Name]) VALUES
                (1, 'Alice'),
                (2, 'O''Brien');
                SET IDENTITY_INSERT [dbo].[People] OFF;
            "}
        );
    }

    #[test]
    fn no_identity_toggle_without_identity_columns() {
        let script = render(&people(), &people_context(&[]), ROWS_PER_INSERT);
        assert!(!script.contains("IDENTITY_INSERT"));
        assert!(script.starts_with("INSERT INTO [dbo].[People]"));
    }

    #[test]
    fn empty_dataset_renders_nothing() {
        let dataset = TabularDataset::new(vec!["Id".into()]);
        assert_eq!(render(&dataset, &people_context(&["Id"]), ROWS_PER_INSERT), "");
    }

    #[test]
    fn rows_are_grouped_per_insert() {
        let rows = (0..5).map(|i| vec![Some(i.to_string()), None]).collect();
        let dataset = TabularDataset::from_rows(vec!["Id".into(), "Name".into()], rows);
        let script = render(&dataset, &people_context(&["Id"]), 2);
        assert_eq!(script.matches("INSERT INTO").count(), 3);
        assert_eq!(script.matches("IDENTITY_INSERT").count(), 2);
        assert!(script.contains("(4, NULL);"));
    }

    #[test]
    fn literals_follow_column_types() {
        assert_eq!(literal(Some("true"), SemanticType::Boolean), "1");
        assert_eq!(literal(Some("0"), SemanticType::Boolean), "0");
        assert_eq!(literal(Some(" 42 "), SemanticType::Integer), "42");
        assert_eq!(literal(Some("12.50"), SemanticType::Decimal), "12.50");
        assert_eq!(literal(Some("2.5"), SemanticType::Float), "2.5");
        assert_eq!(
            literal(Some("2024-01-02 03:04:05"), SemanticType::DateTime),
            "'2024-01-02 03:04:05'"
        );
        assert_eq!(
            literal(Some("6f9619ff-8b86-d011-b42d-00c04fc964ff"), SemanticType::Guid),
            "'6f9619ff-8b86-d011-b42d-00c04fc964ff'"
        );
        assert_eq!(literal(None, SemanticType::Integer), "NULL");
    }

    #[test]
    fn unparsable_values_are_quoted() {
        assert_eq!(literal(Some("abc"), SemanticType::Integer), "'abc'");
        assert_eq!(literal(Some("it's"), SemanticType::Float), "'it''s'");
    }

    #[test]
    fn identifiers_escape_closing_brackets() {
        let dataset = TabularDataset::from_rows(vec!["we]ird".into()], vec![vec![Some("x".into())]]);
        let context = ExportContext {
            table: TableRef::new("s", "t]x"),
            columns: Vec::new(),
            identity_columns: HashSet::new(),
        };
        let script = render(&dataset, &context, ROWS_PER_INSERT);
        assert_eq!(script, "INSERT INTO [s].[t]]x] ([we]]ird]) VALUES\n('x');\n");
    }
}
