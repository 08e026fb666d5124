//! Display formatting for listings: generic scalar formatting, field
//! labels, and assembly of display-ready rows.

use crate::error::Result;
use crate::kp::{self, KpDisplay};
use crate::lookup::FkColumn;
use crate::schema::ColumnInfo;
use crate::store::{RowData, Store, Value, TIMESTAMP_FORMAT};

/// Generic scalar formatting: null shows as empty, temporal values in a
/// fixed textual form, everything else its natural string form.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Timestamp(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
        Value::Bag(bag) => kp::render_for_display(bag).collapsed,
    }
}

/// Column name -> display label: snake_case to Title Case, with the
/// trailing " Id" stripped from foreign-key columns.
pub fn format_label(column: &str) -> String {
    let title: Vec<String> = column
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    let label = title.join(" ");
    label.strip_suffix(" Id").unwrap_or(&label).to_string()
}

/// A listing row ready for display. The raw id rides along as the row
/// key for edit/delete actions.
#[derive(Debug, Clone)]
pub struct DisplayRow {
    pub id: i64,
    /// One formatted cell per introspected column, in column order
    pub cells: Vec<String>,
    /// Present only when the row carries a key-performance bag; both
    /// renderings so the UI can toggle per row
    pub kp: Option<KpDisplay>,
}

/// Format one raw row for the listing. Foreign-key cells resolve to
/// labels, the key-performance cell renders collapsed, everything else
/// goes through the generic formatter.
pub fn format_row(store: &Store, columns: &[ColumnInfo], row: &RowData) -> Result<DisplayRow> {
    let id = row.id().unwrap_or_default();
    let mut cells = Vec::with_capacity(columns.len());
    let mut kp_display = None;

    for col in columns {
        let value = row.get(&col.name).unwrap_or(&Value::Null);

        if col.name == "key_performance" {
            let bag = match value {
                Value::Bag(bag) => bag.clone(),
                Value::Text(text) => kp::decode(Some(text)),
                _ => Default::default(),
            };
            let display = kp::render_for_display(&bag);
            cells.push(display.collapsed.clone());
            kp_display = Some(display);
        } else if let Some(fk) = FkColumn::from_column(&col.name) {
            cells.push(fk.resolve_label(store, value));
        } else {
            cells.push(format_value(value));
        }
    }

    Ok(DisplayRow {
        id,
        cells,
        kp: kp_display,
    })
}
