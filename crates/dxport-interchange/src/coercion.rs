//! Value coercion from raw dataset cells to typed destination values
//!
//! Every destination cell resolves to exactly one [`CoercionOutcome`];
//! coercion itself never fails. Whether an `Unresolvable` cell aborts the job
//! is decided downstream by the transfer engine.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dxport_core::{Cell, ColumnSchema, SemanticType, TabularDataset, Value, synthesized_columns};

/// Why a type default was substituted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultReason {
    /// No source column, NULL, or empty string
    MissingOrEmpty,
    /// The source text did not parse as the column's type
    Unparsable,
}

impl std::fmt::Display for DefaultReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingOrEmpty => f.write_str("missing or empty value"),
            Self::Unparsable => f.write_str("unparsable value"),
        }
    }
}

/// Result of coercing one destination cell
#[derive(Debug, Clone, PartialEq)]
pub enum CoercionOutcome {
    Value(Value),
    Null,
    Default(Value, DefaultReason),
    Unresolvable(String),
}

impl CoercionOutcome {
    /// Value handed to the bulk writer. Unresolvable cells become a NULL
    /// placeholder.
    pub fn into_value(self) -> Value {
        match self {
            Self::Value(v) | Self::Default(v, _) => v,
            Self::Null | Self::Unresolvable(_) => Value::Null,
        }
    }

    pub fn is_unresolvable(&self) -> bool {
        matches!(self, Self::Unresolvable(_))
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default(..))
    }
}

/// Default substituted for a missing non-nullable `DateTime`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateTimeDefault {
    /// Timestamp at coercion time
    #[default]
    CurrentTimestamp,
    Fixed(NaiveDateTime),
    /// Never fabricate; the cell is unresolvable
    Unresolvable,
}

/// Default substituted for a missing non-nullable `Guid`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidDefault {
    /// Fresh random (v4) identifier per cell
    #[default]
    Generate,
    /// The all-zero identifier
    Nil,
    Unresolvable,
}

/// Policy for the defaults that have to be fabricated rather than taken
/// from a fixed zero value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultPolicy {
    pub datetime: DateTimeDefault,
    pub guid: GuidDefault,
}

impl DefaultPolicy {
    /// Type default for a non-nullable column, if one is available
    pub fn default_for(&self, semantic_type: SemanticType) -> Option<Value> {
        match semantic_type {
            SemanticType::Integer => Some(Value::Int32(0)),
            SemanticType::BigInteger => Some(Value::Int64(0)),
            SemanticType::SmallInteger => Some(Value::Int16(0)),
            SemanticType::Byte => Some(Value::Byte(0)),
            SemanticType::Boolean => Some(Value::Bool(false)),
            SemanticType::Decimal => Some(Value::Decimal("0.0".to_string())),
            SemanticType::Float => Some(Value::Float64(0.0)),
            SemanticType::String => Some(Value::String(String::new())),
            SemanticType::DateTime => match self.datetime {
                DateTimeDefault::CurrentTimestamp => {
                    Some(Value::DateTime(chrono::Local::now().naive_local()))
                }
                DateTimeDefault::Fixed(ts) => Some(Value::DateTime(ts)),
                DateTimeDefault::Unresolvable => None,
            },
            SemanticType::Guid => match self.guid {
                GuidDefault::Generate => Some(Value::Uuid(Uuid::new_v4())),
                GuidDefault::Nil => Some(Value::Uuid(Uuid::nil())),
                GuidDefault::Unresolvable => None,
            },
        }
    }
}

fn is_decimal_literal(text: &str) -> bool {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, f),
        None => (unsigned, ""),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    (!int_part.is_empty() || !frac_part.is_empty()) && all_digits(int_part) && all_digits(frac_part)
}

const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

const TIME_LAYOUTS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// Parse a date/time in any accepted layout. Time-only values are anchored
/// at 1900-01-01.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    for layout in DATETIME_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(dt);
        }
    }
    for layout in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(text, layout) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    let anchor = NaiveDate::from_ymd_opt(1900, 1, 1)?;
    for layout in TIME_LAYOUTS {
        if let Ok(time) = NaiveTime::parse_from_str(text, layout) {
            return Some(anchor.and_time(time));
        }
    }
    None
}

/// Parse raw text as the given semantic type.
///
/// Surrounding whitespace is ignored for every type except `String`, which
/// passes through unchanged.
pub fn parse_value(text: &str, semantic_type: SemanticType) -> Option<Value> {
    if semantic_type == SemanticType::String {
        return Some(Value::String(text.to_string()));
    }

    let text = text.trim();
    match semantic_type {
        SemanticType::Integer => text.parse().ok().map(Value::Int32),
        SemanticType::BigInteger => text.parse().ok().map(Value::Int64),
        SemanticType::SmallInteger => text.parse().ok().map(Value::Int16),
        SemanticType::Byte => text.parse().ok().map(Value::Byte),
        SemanticType::Boolean => {
            if text.eq_ignore_ascii_case("true") || text == "1" {
                Some(Value::Bool(true))
            } else if text.eq_ignore_ascii_case("false") || text == "0" {
                Some(Value::Bool(false))
            } else {
                None
            }
        }
        SemanticType::Decimal => {
            is_decimal_literal(text).then(|| Value::Decimal(text.to_string()))
        }
        SemanticType::Float => text
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::Float64),
        SemanticType::DateTime => parse_datetime(text).map(Value::DateTime),
        SemanticType::Guid => Uuid::parse_str(text).ok().map(Value::Uuid),
        SemanticType::String => Some(Value::String(text.to_string())),
    }
}

/// A non-fatal type coercion problem, reported in the job summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionWarning {
    /// 1-based data row number
    pub row: usize,
    pub column: String,
    pub message: String,
}

impl std::fmt::Display for CoercionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}, column '{}': {}", self.row, self.column, self.message)
    }
}

/// Outcomes for one dataset row, ordered by destination column
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedRow {
    /// 1-based data row number
    pub row: usize,
    pub outcomes: Vec<CoercionOutcome>,
    pub warnings: Vec<CoercionWarning>,
}

impl CoercedRow {
    pub fn has_default(&self) -> bool {
        self.outcomes.iter().any(CoercionOutcome::is_default)
    }

    pub fn has_unresolvable(&self) -> bool {
        self.outcomes.iter().any(CoercionOutcome::is_unresolvable)
    }

    /// Messages for every unresolvable cell in the row
    pub fn unresolvable_messages<'a>(
        &'a self,
        columns: &'a [ColumnSchema],
    ) -> impl Iterator<Item = String> + 'a {
        self.outcomes
            .iter()
            .zip(columns)
            .filter_map(move |(outcome, column)| match outcome {
                CoercionOutcome::Unresolvable(reason) => Some(format!(
                    "row {}, column '{}': {}",
                    self.row, column.name, reason
                )),
                _ => None,
            })
    }

    pub fn into_values(self) -> Vec<Value> {
        self.outcomes
            .into_iter()
            .map(CoercionOutcome::into_value)
            .collect()
    }
}

/// Coerces dataset rows against a fixed list of destination columns
#[derive(Debug, Clone)]
pub struct Coercer {
    columns: Vec<ColumnSchema>,
    /// Source column position for each destination column
    source_index: Vec<Option<usize>>,
    policy: DefaultPolicy,
}

impl Coercer {
    /// Match each destination column to a source column by case-insensitive
    /// name; the first match wins.
    ///
    /// Sources without a header row (`Column1..N`) are matched by position.
    pub fn new(source_columns: &[String], columns: &[ColumnSchema], policy: DefaultPolicy) -> Self {
        let headerless = !source_columns.is_empty()
            && source_columns == synthesized_columns(source_columns.len()).as_slice();
        let source_index = columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                if headerless {
                    return (idx < source_columns.len()).then_some(idx);
                }
                source_columns
                    .iter()
                    .position(|s| s.to_lowercase() == column.name.to_lowercase())
            })
            .collect();
        Self {
            columns: columns.to_vec(),
            source_index,
            policy,
        }
    }

    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    /// Source column name matched to each destination column, if any
    pub fn source_column<'a>(&self, source_columns: &'a [String], column: usize) -> Option<&'a str> {
        self.source_index
            .get(column)
            .copied()
            .flatten()
            .and_then(|idx| source_columns.get(idx))
            .map(String::as_str)
    }

    fn fallback(&self, column: &ColumnSchema, reason: DefaultReason) -> CoercionOutcome {
        if column.nullable {
            return CoercionOutcome::Null;
        }
        match self.policy.default_for(column.semantic_type) {
            Some(value) => CoercionOutcome::Default(value, reason),
            None => CoercionOutcome::Unresolvable(format!(
                "{} for non-nullable {} column and no default available",
                reason, column.semantic_type
            )),
        }
    }

    /// Coerce a single raw cell
    pub fn coerce_cell(&self, raw: Option<&str>, column: &ColumnSchema) -> CoercionOutcome {
        match raw {
            None | Some("") => self.fallback(column, DefaultReason::MissingOrEmpty),
            Some(text) => match parse_value(text, column.semantic_type) {
                Some(value) => CoercionOutcome::Value(value),
                None => self.fallback(column, DefaultReason::Unparsable),
            },
        }
    }

    /// Coerce one dataset row. `row_number` is 1-based.
    pub fn coerce_row(&self, row_number: usize, row: &[Cell]) -> CoercedRow {
        let mut warnings = Vec::new();
        let outcomes = self
            .columns
            .iter()
            .zip(&self.source_index)
            .map(|(column, source)| {
                let raw = source.and_then(|idx| row.get(idx)).and_then(|c| c.as_deref());
                let outcome = self.coerce_cell(raw, column);

                let unparsable = matches!(
                    outcome,
                    CoercionOutcome::Null | CoercionOutcome::Default(_, DefaultReason::Unparsable)
                ) && raw.is_some_and(|r| !r.is_empty());
                if unparsable {
                    warnings.push(CoercionWarning {
                        row: row_number,
                        column: column.name.clone(),
                        message: format!(
                            "'{}' is not a valid {}; {}",
                            raw.unwrap_or_default(),
                            column.semantic_type,
                            match &outcome {
                                CoercionOutcome::Default(value, _) => format!("used default {}", value),
                                _ => "stored NULL".to_string(),
                            }
                        ),
                    });
                }
                outcome
            })
            .collect();

        CoercedRow {
            row: row_number,
            outcomes,
            warnings,
        }
    }
}

/// Lazily coerce every row of the dataset, in order
pub fn coerce<'a>(
    dataset: &'a TabularDataset,
    columns: &[ColumnSchema],
    policy: DefaultPolicy,
) -> impl Iterator<Item = CoercedRow> + 'a {
    let coercer = Coercer::new(dataset.columns(), columns, policy);
    dataset
        .rows()
        .iter()
        .enumerate()
        .map(move |(idx, row)| coercer.coerce_row(idx + 1, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn column(name: &str, semantic_type: SemanticType, nullable: bool) -> ColumnSchema {
        ColumnSchema {
            name: name.to_string(),
            native_type: String::new(),
            semantic_type,
            nullable,
        }
    }

    fn csv_people() -> TabularDataset {
        TabularDataset::from_rows(
            vec!["id".into(), "name".into(), "age".into()],
            vec![
                vec![Some("1".into()), Some("Alice".into()), Some("30".into())],
                vec![Some("2".into()), Some("Bob".into()), Some(String::new())],
            ],
        )
    }

    fn values(dataset: &TabularDataset, columns: &[ColumnSchema]) -> Vec<Vec<CoercionOutcome>> {
        coerce(dataset, columns, DefaultPolicy::default())
            .map(|row| row.outcomes)
            .collect()
    }

    #[test]
    fn headerless_source_maps_by_position() {
        let dataset = TabularDataset::from_rows(
            synthesized_columns(2),
            vec![vec![Some("7".into()), Some("Eve".into())]],
        );
        let columns = [
            column("id", SemanticType::Integer, false),
            column("name", SemanticType::String, false),
            column("age", SemanticType::Integer, true),
        ];
        let coercer = Coercer::new(dataset.columns(), &columns, DefaultPolicy::default());
        assert_eq!(coercer.source_column(dataset.columns(), 1), Some("Column2"));
        assert_eq!(coercer.source_column(dataset.columns(), 2), None);

        let rows = values(&dataset, &columns);
        assert_eq!(
            rows[0],
            vec![
                CoercionOutcome::Value(Value::Int32(7)),
                CoercionOutcome::Value(Value::String("Eve".into())),
                CoercionOutcome::Null,
            ]
        );
    }

    #[test]
    fn nullable_column_with_empty_value_is_null() {
        let columns = [
            column("id", SemanticType::Integer, false),
            column("name", SemanticType::String, false),
            column("age", SemanticType::Integer, true),
        ];
        let rows = values(&csv_people(), &columns);
        assert_eq!(
            rows[1],
            vec![
                CoercionOutcome::Value(Value::Int32(2)),
                CoercionOutcome::Value(Value::String("Bob".into())),
                CoercionOutcome::Null,
            ]
        );
        assert_eq!(rows[0][2], CoercionOutcome::Value(Value::Int32(30)));
    }

    #[test]
    fn non_nullable_column_with_empty_value_gets_default() {
        let columns = [
            column("id", SemanticType::Integer, false),
            column("name", SemanticType::String, false),
            column("age", SemanticType::Integer, false),
        ];
        let rows = values(&csv_people(), &columns);
        assert_eq!(rows[0][2], CoercionOutcome::Value(Value::Int32(30)));
        assert_eq!(
            rows[1][2],
            CoercionOutcome::Default(Value::Int32(0), DefaultReason::MissingOrEmpty)
        );
    }

    #[test]
    fn source_columns_match_case_insensitively() {
        let columns = [column("NAME", SemanticType::String, true)];
        let rows = values(&csv_people(), &columns);
        assert_eq!(rows[0], vec![CoercionOutcome::Value(Value::String("Alice".into()))]);
    }

    #[test]
    fn missing_source_column_uses_fallback() {
        let columns = [
            column("email", SemanticType::String, true),
            column("score", SemanticType::Float, false),
        ];
        let rows = values(&csv_people(), &columns);
        assert_eq!(rows[0][0], CoercionOutcome::Null);
        assert_eq!(
            rows[0][1],
            CoercionOutcome::Default(Value::Float64(0.0), DefaultReason::MissingOrEmpty)
        );
    }

    #[test]
    fn non_nullable_columns_never_produce_null() {
        let dataset = TabularDataset::from_rows(
            vec!["a".into()],
            vec![vec![None], vec![Some(String::new())], vec![Some("junk".into())]],
        );
        for semantic_type in [
            SemanticType::Integer,
            SemanticType::BigInteger,
            SemanticType::SmallInteger,
            SemanticType::Byte,
            SemanticType::Boolean,
            SemanticType::Decimal,
            SemanticType::Float,
            SemanticType::DateTime,
            SemanticType::Guid,
            SemanticType::String,
        ] {
            let columns = [column("a", semantic_type, false)];
            for row in values(&dataset, &columns) {
                assert!(
                    !matches!(row[0], CoercionOutcome::Null),
                    "{} produced NULL",
                    semantic_type
                );
            }
        }
    }

    #[test]
    fn unparsable_nullable_value_is_null_with_warning() {
        let dataset = TabularDataset::from_rows(
            vec!["age".into()],
            vec![vec![Some("thirty".into())]],
        );
        let columns = [column("age", SemanticType::Integer, true)];
        let rows: Vec<_> = coerce(&dataset, &columns, DefaultPolicy::default()).collect();
        assert_eq!(rows[0].outcomes, vec![CoercionOutcome::Null]);
        assert_eq!(rows[0].warnings.len(), 1);
        assert_eq!(rows[0].warnings[0].row, 1);
        assert_eq!(rows[0].warnings[0].column, "age");
    }

    #[test]
    fn unparsable_non_nullable_value_gets_default_with_warning() {
        let dataset = TabularDataset::from_rows(
            vec!["flag".into()],
            vec![vec![Some("maybe".into())]],
        );
        let columns = [column("flag", SemanticType::Boolean, false)];
        let row = coerce(&dataset, &columns, DefaultPolicy::default())
            .next()
            .unwrap();
        assert_eq!(
            row.outcomes,
            vec![CoercionOutcome::Default(Value::Bool(false), DefaultReason::Unparsable)]
        );
        assert_eq!(row.warnings.len(), 1);
        assert!(row.has_default());
    }

    #[test]
    fn default_policy_controls_fabricated_values() {
        let dataset = TabularDataset::from_rows(vec!["x".into()], vec![vec![None]]);
        let when = [column("x", SemanticType::DateTime, false)];
        let guid = [column("x", SemanticType::Guid, false)];

        let row = coerce(&dataset, &when, DefaultPolicy::default()).next().unwrap();
        assert!(matches!(
            row.outcomes[0],
            CoercionOutcome::Default(Value::DateTime(_), DefaultReason::MissingOrEmpty)
        ));
        let row = coerce(&dataset, &guid, DefaultPolicy::default()).next().unwrap();
        match &row.outcomes[0] {
            CoercionOutcome::Default(Value::Uuid(id), _) => assert!(!id.is_nil()),
            other => panic!("unexpected outcome {:?}", other),
        }

        let fixed = NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let policy = DefaultPolicy {
            datetime: DateTimeDefault::Fixed(fixed),
            guid: GuidDefault::Nil,
        };
        let row = coerce(&dataset, &when, policy).next().unwrap();
        assert_eq!(
            row.outcomes[0],
            CoercionOutcome::Default(Value::DateTime(fixed), DefaultReason::MissingOrEmpty)
        );
        let row = coerce(&dataset, &guid, policy).next().unwrap();
        assert_eq!(
            row.outcomes[0],
            CoercionOutcome::Default(Value::Uuid(Uuid::nil()), DefaultReason::MissingOrEmpty)
        );

        let strict = DefaultPolicy {
            datetime: DateTimeDefault::Unresolvable,
            guid: GuidDefault::Unresolvable,
        };
        let row = coerce(&dataset, &when, strict).next().unwrap();
        assert!(row.has_unresolvable());
        assert_eq!(row.clone().into_values(), vec![Value::Null]);
        let messages: Vec<_> = row.unresolvable_messages(&when).collect();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("column 'x'"), "{}", messages[0]);
    }

    #[test]
    fn default_policy_deserializes() {
        let policy: DefaultPolicy =
            serde_json::from_str(r#"{"datetime":"unresolvable","guid":"nil"}"#).unwrap();
        assert_eq!(policy.datetime, DateTimeDefault::Unresolvable);
        assert_eq!(policy.guid, GuidDefault::Nil);
        let policy: DefaultPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, DefaultPolicy::default());
    }

    #[test]
    fn parse_integers_and_booleans() {
        assert_eq!(parse_value(" 42 ", SemanticType::Integer), Some(Value::Int32(42)));
        assert_eq!(parse_value("3000000000", SemanticType::Integer), None);
        assert_eq!(
            parse_value("3000000000", SemanticType::BigInteger),
            Some(Value::Int64(3_000_000_000))
        );
        assert_eq!(parse_value("-5", SemanticType::SmallInteger), Some(Value::Int16(-5)));
        assert_eq!(parse_value("256", SemanticType::Byte), None);
        assert_eq!(parse_value("TRUE", SemanticType::Boolean), Some(Value::Bool(true)));
        assert_eq!(parse_value("0", SemanticType::Boolean), Some(Value::Bool(false)));
        assert_eq!(parse_value("yes", SemanticType::Boolean), None);
    }

    #[test]
    fn parse_decimals_and_floats() {
        assert_eq!(
            parse_value("-12.50", SemanticType::Decimal),
            Some(Value::Decimal("-12.50".into()))
        );
        assert_eq!(parse_value(".5", SemanticType::Decimal), Some(Value::Decimal(".5".into())));
        assert_eq!(parse_value("1e5", SemanticType::Decimal), None);
        assert_eq!(parse_value(".", SemanticType::Decimal), None);
        assert_eq!(parse_value("2.5", SemanticType::Float), Some(Value::Float64(2.5)));
        assert_eq!(parse_value("NaN", SemanticType::Float), None);
        assert_eq!(parse_value("inf", SemanticType::Float), None);
    }

    #[test]
    fn parse_datetimes() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        for text in [
            "2024-03-01 08:30:00",
            "2024-03-01T08:30:00",
            "2024-03-01T08:30:00Z",
            "2024-03-01T08:30:00+02:00",
            "03/01/2024 08:30:00",
            "2024-03-01 08:30",
        ] {
            assert_eq!(parse_datetime(text), Some(expected), "{}", text);
        }
        assert_eq!(
            parse_datetime("2024-03-01"),
            NaiveDate::from_ymd_opt(2024, 3, 1).map(|d| d.and_time(NaiveTime::MIN))
        );
        assert_eq!(
            parse_datetime("13:45:10.5"),
            NaiveDate::from_ymd_opt(1900, 1, 1)
                .unwrap()
                .and_hms_milli_opt(13, 45, 10, 500)
        );
        assert_eq!(parse_datetime("not a date"), None);
    }

    #[test]
    fn parse_guid_forms() {
        let id = Uuid::parse_str("6f9619ff-8b86-d011-b42d-00c04fc964ff").unwrap();
        for text in [
            "6f9619ff-8b86-d011-b42d-00c04fc964ff",
            "6F9619FF8B86D011B42D00C04FC964FF",
            "{6f9619ff-8b86-d011-b42d-00c04fc964ff}",
            "urn:uuid:6f9619ff-8b86-d011-b42d-00c04fc964ff",
        ] {
            assert_eq!(parse_value(text, SemanticType::Guid), Some(Value::Uuid(id)), "{}", text);
        }
    }

    #[test]
    fn strings_pass_through_untrimmed() {
        assert_eq!(
            parse_value("  padded ", SemanticType::String),
            Some(Value::String("  padded ".into()))
        );
    }
}
