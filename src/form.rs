//! Dynamic form derivation: decides, per introspected column, which kind
//! of editable field to present, and the cross-field derivations the
//! forms re-apply after relevant selections change.

use crate::error::Result;
use crate::format::{format_label, format_value};
use crate::kp::{self, Bag};
use crate::lookup::FkColumn;
use crate::schema::{ColumnInfo, TableId, TypeClass};
use crate::store::{Store, Value};

/// What kind of input a form renders for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Single-choice selector. A `(None, "(None)")` entry is injected for
    /// nullable columns.
    Select { options: Vec<(Option<i64>, String)> },
    /// Required reference with no referents to choose from; informational
    /// only, signals "cannot proceed" without erroring
    Unavailable { message: String },
    Text,
    Multiline,
    DateTime,
    Number,
}

/// One derived form field with its initial input state.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub column: String,
    pub label: String,
    pub kind: FieldKind,
    pub input: FieldInput,
}

/// Current user input for a field. Selectors carry an id, everything else
/// edits text.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    Id(Option<i64>),
    Text(String),
}

impl Field {
    pub fn selected_id(&self) -> Option<i64> {
        match self.input {
            FieldInput::Id(id) => id,
            FieldInput::Text(_) => None,
        }
    }
}

/// Derive the form field for one column, or None when the column has no
/// generic field (id on creation, store-filled issue date, the
/// key-performance column).
///
/// Unknown table/column combinations fall through to the plain text
/// branch; permissive by design.
pub fn derive_field(
    store: &Store,
    table: TableId,
    column: &ColumnInfo,
    current: Option<&Value>,
    is_new: bool,
) -> Result<Option<Field>> {
    let name = column.name.as_str();

    if name == "id" && current.is_none() {
        return Ok(None);
    }
    // The store fills the issue date on insert
    if table == TableId::DevicesIssued && name == "date_of_issue" && is_new {
        return Ok(None);
    }
    // Rendered as per-attribute inputs driven by the device-type
    // selection, never as a generic field
    if name == "key_performance" {
        return Ok(None);
    }

    let label = format_label(name);

    if let Some(fk) = FkColumn::from_column(name) {
        let referents = fk.options(store, table, is_new)?;

        if referents.is_empty() && !column.nullable {
            return Ok(Some(Field {
                column: name.to_string(),
                label: label.clone(),
                kind: FieldKind::Unavailable {
                    message: format!("{}: no options available", label),
                },
                input: FieldInput::Id(None),
            }));
        }

        let mut options: Vec<(Option<i64>, String)> = Vec::with_capacity(referents.len() + 1);
        if column.nullable {
            options.push((None, "(None)".to_string()));
        }
        options.extend(referents.into_iter().map(|(id, l)| (Some(id), l)));

        return Ok(Some(Field {
            column: name.to_string(),
            label,
            kind: FieldKind::Select { options },
            input: FieldInput::Id(current.and_then(Value::as_id)),
        }));
    }

    if name == "specification" {
        return Ok(Some(Field {
            column: name.to_string(),
            label,
            kind: FieldKind::Multiline,
            input: FieldInput::Text(current.map(format_value).unwrap_or_default()),
        }));
    }

    let (kind, input) = match column.type_class() {
        TypeClass::Temporal => (
            FieldKind::DateTime,
            current.map(format_value).unwrap_or_default(),
        ),
        TypeClass::Integer => (
            FieldKind::Number,
            current
                .filter(|v| !v.is_null())
                .map(format_value)
                .unwrap_or_else(|| "0".to_string()),
        ),
        TypeClass::Text => (
            FieldKind::Text,
            current.map(format_value).unwrap_or_default(),
        ),
    };

    Ok(Some(Field {
        column: name.to_string(),
        label,
        kind,
        input: FieldInput::Text(input),
    }))
}

/// Employee selection changed on the issuance form: the department comes
/// from the employee. One-way derivation, never enforced at save time.
pub fn department_for_employee(store: &Store, employee_id: i64) -> Result<Option<i64>> {
    store.employee_department(employee_id)
}

/// Rebuild the attribute inputs after a device-type change. Names come
/// from the new specification; values survive only for names that still
/// appear, new names start blank.
pub fn rebuild_attributes(names: &[String], existing: &Bag) -> Vec<(String, String)> {
    names
        .iter()
        .map(|name| {
            let value = existing.get(name).cloned().unwrap_or_default();
            (name.clone(), value)
        })
        .collect()
}

/// Attribute inputs for the currently selected device type, seeded from
/// an existing bag (empty on a new record).
pub fn attribute_fields(
    store: &Store,
    device_type_id: Option<i64>,
    existing: &Bag,
) -> Result<Vec<(String, String)>> {
    let Some(type_id) = device_type_id else {
        return Ok(Vec::new());
    };
    let spec = store.device_type_specification(type_id)?.unwrap_or_default();
    let names = kp::parse_specification(&spec);
    Ok(rebuild_attributes(&names, existing))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(entries: &[(&str, &str)]) -> Bag {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_rebuild_preserves_surviving_values_only() {
        let existing = bag(&[("CPU", "i7"), ("RAM", "16GB")]);
        let names = vec!["RAM".to_string(), "Storage".to_string()];

        let fields = rebuild_attributes(&names, &existing);
        assert_eq!(
            fields,
            vec![
                ("RAM".to_string(), "16GB".to_string()),
                ("Storage".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_rebuild_blank_on_new_record() {
        let names = vec!["CPU".to_string()];
        let fields = rebuild_attributes(&names, &Bag::new());
        assert_eq!(fields, vec![("CPU".to_string(), String::new())]);
    }
}
