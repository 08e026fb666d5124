//! CRUD orchestration: pagination, the nullability policy applied on
//! every write, and assembly of the key-performance bag from its
//! per-attribute inputs.

use crate::error::Result;
use crate::form::{Field, FieldInput, FieldKind};
use crate::format::{format_row, DisplayRow};
use crate::kp::Bag;
use crate::schema::{ColumnInfo, TableId};
use crate::store::{parse_timestamp, Store, Value};

pub const MAX_PAGE_SIZE: u64 = 1000;

/// One page of a table, display-ready.
#[derive(Debug)]
pub struct Listing {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<DisplayRow>,
    pub total_count: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

/// Fetch one page. Page and page size are clamped before the offset is
/// computed; the page count has a floor of 1 so an empty table still has
/// a page to stand on.
pub fn list(store: &Store, table: TableId, page_size: u64, page: u64) -> Result<Listing> {
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    let page = page.max(1);
    let offset = (page - 1) * page_size;

    let columns = store.describe_columns(table)?;
    let (raw_rows, total_count) = store.count_and_page(table, page_size, offset)?;

    let mut rows = Vec::with_capacity(raw_rows.len());
    for raw in &raw_rows {
        rows.push(format_row(store, &columns, raw)?);
    }

    let total_pages = (total_count.div_ceil(page_size)).max(1);

    Ok(Listing {
        columns,
        rows,
        total_count,
        page,
        page_size,
        total_pages,
    })
}

/// Create a row from submitted form fields; returns the new id.
pub fn create(
    store: &Store,
    table: TableId,
    fields: &[Field],
    kp_attrs: &[(String, String)],
) -> Result<i64> {
    let data = assemble(store, table, fields, kp_attrs)?;
    store.insert(table, &data)
}

/// Update a row from submitted form fields; false when the row vanished.
pub fn update(
    store: &Store,
    table: TableId,
    id: i64,
    fields: &[Field],
    kp_attrs: &[(String, String)],
) -> Result<bool> {
    let data = assemble(store, table, fields, kp_attrs)?;
    Ok(store.update(table, id, &data)? > 0)
}

/// Delete a row. A second delete of the same id returns Ok(false), never
/// an error; the caller reports it as a warning.
pub fn delete(store: &Store, table: TableId, id: i64) -> Result<bool> {
    Ok(store.delete(table, id)? > 0)
}

/// Turn submitted fields into a persisted field set, applying the
/// nullability policy and merging in the encoded key-performance bag.
fn assemble(
    store: &Store,
    table: TableId,
    fields: &[Field],
    kp_attrs: &[(String, String)],
) -> Result<Vec<(String, Value)>> {
    let columns = store.describe_columns(table)?;
    let mut data = Vec::with_capacity(fields.len() + 1);

    for field in fields {
        // Informational placeholders carry no input
        if matches!(field.kind, FieldKind::Unavailable { .. }) {
            continue;
        }
        let nullable = columns
            .iter()
            .find(|c| c.name == field.column)
            .map(|c| c.nullable)
            .unwrap_or(true);
        data.push((field.column.clone(), submitted_value(field, nullable)));
    }

    // Only device rows carry a bag; it is rewritten on every save so a
    // device-type change that emptied the attribute set persists as NULL
    if table == TableId::Devices {
        let bag: Bag = kp_attrs
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        data.push(("key_performance".to_string(), Value::Bag(bag)));
    }

    Ok(data)
}

/// Nullability policy: an empty or absent submission becomes NULL when
/// the column allows it; otherwise the empty value is stored as-is and
/// any store-level constraint failure propagates.
fn submitted_value(field: &Field, nullable: bool) -> Value {
    match &field.input {
        FieldInput::Id(Some(id)) => Value::Integer(*id),
        FieldInput::Id(None) => Value::Null,
        FieldInput::Text(text) => {
            if text.is_empty() {
                if nullable {
                    Value::Null
                } else {
                    Value::Text(String::new())
                }
            } else {
                typed_text(&field.kind, text)
            }
        }
    }
}

fn typed_text(kind: &FieldKind, text: &str) -> Value {
    match kind {
        FieldKind::Number => text
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::Text(text.to_string())),
        FieldKind::DateTime => parse_timestamp(text)
            .map(Value::Timestamp)
            .unwrap_or_else(|| Value::Text(text.to_string())),
        _ => Value::Text(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_field(column: &str, kind: FieldKind, text: &str) -> Field {
        Field {
            column: column.to_string(),
            label: column.to_string(),
            kind,
            input: FieldInput::Text(text.to_string()),
        }
    }

    #[test]
    fn test_empty_nullable_becomes_null() {
        let f = text_field("notes", FieldKind::Text, "");
        assert_eq!(submitted_value(&f, true), Value::Null);
    }

    #[test]
    fn test_empty_required_stored_as_is() {
        let f = text_field("model", FieldKind::Text, "");
        assert_eq!(submitted_value(&f, false), Value::Text(String::new()));
    }

    #[test]
    fn test_cleared_select_becomes_null() {
        let f = Field {
            column: "employee_id".to_string(),
            label: "Employee".to_string(),
            kind: FieldKind::Select { options: vec![] },
            input: FieldInput::Id(None),
        };
        assert_eq!(submitted_value(&f, true), Value::Null);
    }

    #[test]
    fn test_number_and_timestamp_coercion() {
        let n = text_field("count", FieldKind::Number, "42");
        assert_eq!(submitted_value(&n, false), Value::Integer(42));

        let t = text_field("purchase_date", FieldKind::DateTime, "2024-03-01 10:30:00");
        assert!(matches!(submitted_value(&t, true), Value::Timestamp(_)));

        // Unparseable input is handed to the store as text, not dropped
        let bad = text_field("count", FieldKind::Number, "many");
        assert_eq!(submitted_value(&bad, false), Value::Text("many".into()));
    }
}
