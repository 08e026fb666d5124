//! Foreign-key resolution. One configuration enum covers the five known
//! reference columns; any other `_id`-suffixed column is not treated as a
//! foreign key and falls back to raw formatting.

use crate::error::Result;
use crate::schema::TableId;
use crate::store::{Store, Value};

/// The five recognized foreign-key columns and the lookup each routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FkColumn {
    /// `manufacturer_id` -> manufacturer name
    Manufacturer,
    /// `device_type_id` -> device type name
    DeviceType,
    /// `department_id` -> department name
    Department,
    /// `employee_id` -> "first last"
    Employee,
    /// `device_id` -> "model (serial)"
    Device,
}

impl FkColumn {
    pub fn from_column(name: &str) -> Option<FkColumn> {
        match name {
            "manufacturer_id" => Some(FkColumn::Manufacturer),
            "device_type_id" => Some(FkColumn::DeviceType),
            "department_id" => Some(FkColumn::Department),
            "employee_id" => Some(FkColumn::Employee),
            "device_id" => Some(FkColumn::Device),
            _ => None,
        }
    }

    /// Option set for this reference in form context. On the issuance
    /// create form the device options are restricted to devices not
    /// currently issued.
    pub fn options(
        self,
        store: &Store,
        table: TableId,
        is_new: bool,
    ) -> Result<Vec<(i64, String)>> {
        if self == FkColumn::Device && table == TableId::DevicesIssued && is_new {
            return store.available_devices();
        }
        self.all_options(store)
    }

    /// Unfiltered option set, used for label resolution.
    fn all_options(self, store: &Store) -> Result<Vec<(i64, String)>> {
        match self {
            FkColumn::Manufacturer => store.manufacturers(),
            FkColumn::DeviceType => store.device_types(),
            FkColumn::Department => store.departments(),
            FkColumn::Employee => store.employees(),
            FkColumn::Device => store.devices(),
        }
    }

    /// Human-readable label for a stored value. Null resolves to the
    /// empty string; a missing referent degrades to the raw id string
    /// rather than erroring.
    pub fn resolve_label(self, store: &Store, value: &Value) -> String {
        let Some(id) = value.as_id() else {
            // Null shows as empty; anything else odd falls back to its
            // generic string form
            return crate::format::format_value(value);
        };

        // An unreachable store degrades the same way as a missing row
        let options = self.all_options(store).unwrap_or_default();
        options
            .into_iter()
            .find(|(opt_id, _)| *opt_id == id)
            .map(|(_, label)| label)
            .unwrap_or_else(|| id.to_string())
    }
}
