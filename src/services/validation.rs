use crate::domain::schema::{ColumnSpec, FieldKind};
use crate::domain::{RawRow, Record, RecordKind, Rejected, SourceDescriptor, TableSchema};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

static INT_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+").unwrap());
static FLOAT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").unwrap());
static NOT_RATING: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d.]").unwrap());

/// What happens to a numeric cell that has text but no leading number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericPolicy {
    /// Store `0` and count the field as coerced.
    #[default]
    Lenient,
    /// Reject the row.
    Strict,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub record: Record,
    /// Non-empty numeric cells that could not be read and were stored as 0.
    pub coerced: usize,
}

/// Screens a Raw Row against the source's schema and, if it passes, maps it
/// to a Record by position.
pub fn validate(
    row: &RawRow,
    source: &SourceDescriptor,
    policy: NumericPolicy,
) -> Result<Validated, Rejected> {
    screen(row, source.schema)?;
    decode(row, source.schema, source.record_kind, policy)
}

/// Structural checks, in order: cell count, name, rank, header labels.
pub fn screen(row: &RawRow, schema: &TableSchema) -> Result<(), Rejected> {
    if row.len() < schema.min_cells {
        return Err(Rejected::TooFewCells {
            found: row.len(),
            min: schema.min_cells,
        });
    }

    let name_column = &schema.name_column;
    let name = row
        .cell(name_column.index)
        .map(|cell| name_column.read.read(cell))
        .unwrap_or("");
    let name_len = name.chars().count();
    if name.is_empty()
        || name_len < name_column.min_len
        || name_column.max_len.is_some_and(|max| name_len > max)
    {
        return Err(Rejected::MissingName);
    }

    if let Some(rank_index) = schema.rank_column {
        let rank = row.cell(rank_index).map(|c| c.text.as_str()).unwrap_or("");
        match rank.parse::<u32>() {
            Ok(n) if n > 0 => {}
            _ => return Err(Rejected::BadRank(rank.to_string())),
        }
    }

    for guard in schema.header_guards {
        if let Some(cell) = row.cell(guard.index) {
            let value = guard.read.read(cell);
            if guard.labels.contains(&value) {
                return Err(Rejected::HeaderRow(value.to_string()));
            }
        }
    }

    Ok(())
}

enum Coerced {
    Value(Value),
    Absent,
    Unparsable,
}

fn coerce(raw: &str, kind: FieldKind) -> Coerced {
    match kind {
        FieldKind::Text => Coerced::Value(Value::String(raw.to_string())),
        FieldKind::OptionalText if raw.is_empty() => Coerced::Absent,
        FieldKind::OptionalText => Coerced::Value(Value::String(raw.to_string())),
        FieldKind::Jersey => {
            Coerced::Value(Value::String(raw.replace('#', "").trim().to_string()))
        }
        FieldKind::Integer => {
            if raw.is_empty() {
                return Coerced::Absent;
            }
            INT_PREFIX
                .find(raw)
                .and_then(|m| m.as_str().parse::<i64>().ok())
                .map(|n| Coerced::Value(Value::from(n)))
                .unwrap_or(Coerced::Unparsable)
        }
        FieldKind::Float | FieldKind::Rating => {
            let cleaned = if kind == FieldKind::Rating {
                NOT_RATING.replace_all(raw, "").into_owned()
            } else {
                raw.to_string()
            };
            if raw.is_empty() {
                return Coerced::Absent;
            }
            FLOAT_PREFIX
                .find(&cleaned)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .and_then(Number::from_f64)
                .map(|n| Coerced::Value(Value::Number(n)))
                .unwrap_or(Coerced::Unparsable)
        }
    }
}

fn zero(kind: FieldKind) -> Option<Value> {
    match kind {
        FieldKind::Integer => Some(Value::from(0i64)),
        FieldKind::Float | FieldKind::Rating => Some(Value::from(0.0)),
        FieldKind::Text | FieldKind::Jersey => Some(Value::String(String::new())),
        FieldKind::OptionalText => None,
    }
}

/// Positional field mapping with numeric coercion.
pub fn decode(
    row: &RawRow,
    schema: &TableSchema,
    kind: RecordKind,
    policy: NumericPolicy,
) -> Result<Validated, Rejected> {
    let mut fields = Map::new();
    let mut coerced = 0;

    for ColumnSpec {
        index,
        field,
        read,
        kind: field_kind,
    } in schema.columns.iter().copied()
    {
        let raw = row.cell(index).map(|cell| read.read(cell)).unwrap_or("");

        let value = match coerce(raw, field_kind) {
            Coerced::Value(value) => Some(value),
            Coerced::Absent => zero(field_kind),
            Coerced::Unparsable => match policy {
                NumericPolicy::Lenient => {
                    coerced += 1;
                    zero(field_kind)
                }
                NumericPolicy::Strict => {
                    return Err(Rejected::Unparsable {
                        field,
                        value: raw.to_string(),
                    })
                }
            },
        };

        if let Some(value) = value {
            fields.insert(field.to_string(), value);
        }
    }

    let record = kind.decode(fields).map_err(|e| Rejected::Unparsable {
        field: "record",
        value: e.to_string(),
    })?;

    Ok(Validated { record, coerced })
}
