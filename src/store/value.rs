use chrono::NaiveDateTime;
use rusqlite::types::{Null, ToSqlOutput, ValueRef};
use rusqlite::ToSql;

use crate::kp::{self, Bag};
use crate::schema::{ColumnInfo, TypeClass};

/// Textual form used both for display and for the stored encoding of
/// temporal values.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A dynamically-typed cell value. One variant per kind the tables can
/// hold, so field and formatter dispatch is exhaustive.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Timestamp(NaiveDateTime),
    /// Decoded key-performance bag; only ever the `key_performance` column
    Bag(Bag),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_id(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Read a cell from a query result, shaping it by the column it came
    /// from: the key-performance column decodes into a bag, temporal
    /// columns parse into timestamps, anything unparseable stays text.
    pub fn read(column: &ColumnInfo, raw: ValueRef<'_>) -> Value {
        match raw {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                let text = String::from_utf8_lossy(bytes).into_owned();
                if column.name == "key_performance" {
                    Value::Bag(kp::decode(Some(&text)))
                } else if column.type_class() == TypeClass::Temporal {
                    parse_timestamp(&text)
                        .map(Value::Timestamp)
                        .unwrap_or(Value::Text(text))
                } else {
                    Value::Text(text)
                }
            }
        }
    }
}

/// Accept the stored `YYYY-MM-DD HH:MM:SS` form and the `T`-separated
/// form a date-time input produces.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M"))
        .ok()
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Value::Null => Null.to_sql(),
            Value::Integer(i) => i.to_sql(),
            Value::Real(f) => f.to_sql(),
            Value::Text(s) => Ok(ToSqlOutput::from(s.as_str())),
            Value::Timestamp(ts) => Ok(ToSqlOutput::from(
                ts.format(TIMESTAMP_FORMAT).to_string(),
            )),
            Value::Bag(bag) => match kp::encode(bag) {
                Some(json) => Ok(ToSqlOutput::from(json)),
                None => Null.to_sql(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_forms() {
        assert!(parse_timestamp("2024-03-01 10:30:00").is_some());
        assert!(parse_timestamp("2024-03-01T10:30").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_read_shapes_by_column() {
        let kp_col = ColumnInfo {
            name: "key_performance".into(),
            decl_type: "TEXT".into(),
            nullable: true,
        };
        let v = Value::read(&kp_col, ValueRef::Text(br#"{"CPU":"i7"}"#));
        match v {
            Value::Bag(bag) => assert_eq!(bag.get("CPU").map(String::as_str), Some("i7")),
            other => panic!("expected bag, got {:?}", other),
        }

        let ts_col = ColumnInfo {
            name: "purchase_date".into(),
            decl_type: "TIMESTAMP".into(),
            nullable: true,
        };
        assert!(matches!(
            Value::read(&ts_col, ValueRef::Text(b"2024-03-01 10:30:00")),
            Value::Timestamp(_)
        ));
        // Unparseable temporal text stays text rather than erroring
        assert!(matches!(
            Value::read(&ts_col, ValueRef::Text(b"soon")),
            Value::Text(_)
        ));
    }
}
