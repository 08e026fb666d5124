//! Dialog state for create/edit forms and delete confirmation.
//!
//! Forms are derived from runtime column metadata, so the same state
//! machine serves all six tables. The two reactive rules (employee ->
//! department, device type -> attribute inputs) are re-applied after
//! every selector change.

use crate::error::Result;
use crate::form::{self, Field, FieldInput, FieldKind};
use crate::kp::Bag;
use crate::schema::TableId;
use crate::store::{Store, Value};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormMode {
    Create,
    Edit { id: i64 },
}

/// A create/edit dialog. Focus walks the generic fields first, then the
/// attribute inputs.
pub struct FormDialog {
    pub table: TableId,
    pub mode: FormMode,
    pub fields: Vec<Field>,
    /// (attribute name, current input) in specification order
    pub kp_fields: Vec<(String, String)>,
    /// Bag as persisted when the dialog opened; re-seeds attribute values
    /// after a device-type change in edit mode
    seed_bag: Bag,
    pub focus: usize,
}

impl FormDialog {
    pub fn create(store: &Store, table: TableId) -> Result<FormDialog> {
        let columns = store.describe_columns(table)?;
        let mut fields = Vec::new();
        for col in &columns {
            if col.name == "id" {
                continue;
            }
            if let Some(field) = form::derive_field(store, table, col, None, true)? {
                fields.push(field);
            }
        }

        let mut dialog = FormDialog {
            table,
            mode: FormMode::Create,
            fields,
            kp_fields: Vec::new(),
            seed_bag: Bag::new(),
            focus: 0,
        };
        dialog.refresh_attributes(store)?;
        Ok(dialog)
    }

    /// None when the row vanished since the listing was fetched.
    pub fn edit(store: &Store, table: TableId, id: i64) -> Result<Option<FormDialog>> {
        let Some(row) = store.get_by_id(table, id)? else {
            return Ok(None);
        };
        let columns = store.describe_columns(table)?;

        let mut fields = Vec::new();
        for col in &columns {
            if col.name == "id" {
                continue;
            }
            if let Some(field) =
                form::derive_field(store, table, col, row.get(&col.name), false)?
            {
                fields.push(field);
            }
        }

        let seed_bag = match row.get("key_performance") {
            Some(Value::Bag(bag)) => bag.clone(),
            _ => Bag::new(),
        };

        let mut dialog = FormDialog {
            table,
            mode: FormMode::Edit { id },
            fields,
            kp_fields: Vec::new(),
            seed_bag,
            focus: 0,
        };
        dialog.refresh_attributes(store)?;
        Ok(Some(dialog))
    }

    pub fn title(&self) -> String {
        match self.mode {
            FormMode::Create => format!("New {} Entry", self.table.display_name()),
            FormMode::Edit { id } => {
                format!("Edit {} Entry (ID: {})", self.table.display_name(), id)
            }
        }
    }

    pub fn is_new(&self) -> bool {
        self.mode == FormMode::Create
    }

    fn focus_count(&self) -> usize {
        self.fields.len() + self.kp_fields.len()
    }

    pub fn focus_next(&mut self) {
        if self.focus_count() > 0 {
            self.focus = (self.focus + 1) % self.focus_count();
        }
    }

    pub fn focus_prev(&mut self) {
        if self.focus_count() > 0 {
            self.focus = (self.focus + self.focus_count() - 1) % self.focus_count();
        }
    }

    fn focused_field(&mut self) -> Option<&mut Field> {
        let idx = self.focus;
        self.fields.get_mut(idx)
    }

    fn focused_kp(&mut self) -> Option<&mut String> {
        let idx = self.focus.checked_sub(self.fields.len())?;
        self.kp_fields.get_mut(idx).map(|(_, v)| v)
    }

    /// Type into the focused text-like input.
    pub fn input_char(&mut self, c: char) {
        if let Some(field) = self.focused_field() {
            if let FieldInput::Text(text) = &mut field.input {
                text.push(c);
            }
            return;
        }
        if let Some(value) = self.focused_kp() {
            value.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.focused_field() {
            if let FieldInput::Text(text) = &mut field.input {
                text.pop();
            }
            return;
        }
        if let Some(value) = self.focused_kp() {
            value.pop();
        }
    }

    /// Cycle the focused selector one step and re-apply the reactive
    /// rules if the changed column drives one.
    pub fn cycle(&mut self, store: &Store, step: i64) -> Result<()> {
        let Some(field) = self.focused_field() else {
            return Ok(());
        };
        let FieldKind::Select { options } = &field.kind else {
            return Ok(());
        };
        if options.is_empty() {
            return Ok(());
        }

        let selected = field.selected_id();
        let current = options
            .iter()
            .position(|(id, _)| *id == selected)
            .unwrap_or(0);
        let len = options.len() as i64;
        let next = ((current as i64 + step).rem_euclid(len)) as usize;
        let target = options[next].0;
        field.input = FieldInput::Id(target);
        let column = field.column.clone();

        self.react(store, &column)
    }

    /// Cross-field derivations, applied after a selector change.
    fn react(&mut self, store: &Store, changed: &str) -> Result<()> {
        if self.table == TableId::DevicesIssued && changed == "employee_id" {
            let employee = self
                .field("employee_id")
                .and_then(Field::selected_id);
            if let Some(employee_id) = employee {
                if let Some(dept) = form::department_for_employee(store, employee_id)? {
                    if let Some(field) = self.field_mut("department_id") {
                        field.input = FieldInput::Id(Some(dept));
                    }
                }
            }
        }

        if self.table == TableId::Devices && changed == "device_type_id" {
            self.refresh_attributes(store)?;
        }

        Ok(())
    }

    /// Rebuild the attribute inputs from the selected device type. Values
    /// survive only for names the new specification still lists, and only
    /// seeded from the bag as it was when the dialog opened.
    fn refresh_attributes(&mut self, store: &Store) -> Result<()> {
        if self.table != TableId::Devices {
            return Ok(());
        }
        let device_type = self.field("device_type_id").and_then(Field::selected_id);
        let seed = match self.mode {
            FormMode::Edit { .. } => self.seed_bag.clone(),
            FormMode::Create => Bag::new(),
        };
        self.kp_fields = form::attribute_fields(store, device_type, &seed)?;
        self.focus = self.focus.min(self.focus_count().saturating_sub(1));
        Ok(())
    }

    fn field(&self, column: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.column == column)
    }

    fn field_mut(&mut self, column: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.column == column)
    }
}

/// Delete confirmation dialog.
pub struct ConfirmDialog {
    pub table: TableId,
    pub id: i64,
}

impl ConfirmDialog {
    pub fn message(&self) -> String {
        format!(
            "Delete this {} entry (ID: {})? This action cannot be undone.",
            self.table.display_name(),
            self.id
        )
    }
}
