//! Static definitions for the six inventory tables.

use super::types::*;

pub static MANUFACTURER: TableDef = TableDef {
    name: "manufacturer",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text),
    ],
    foreign_keys: &[],
};

pub static DEPARTMENTS: TableDef = TableDef {
    name: "departments",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text),
    ],
    foreign_keys: &[],
};

pub static DEVICE_TYPES: TableDef = TableDef {
    name: "device_types",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("device_type", ColumnType::Text),
        // Comma-separated attribute names defining the shape of the
        // key-performance bag for devices of this type
        Column::new("specification", ColumnType::Text),
        Column::new("description", ColumnType::Text),
    ],
    foreign_keys: &[],
};

pub static EMPLOYEES: TableDef = TableDef {
    name: "employees",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("first_name", ColumnType::Text),
        Column::required("last_name", ColumnType::Text),
        Column::new("department_id", ColumnType::Integer),
    ],
    foreign_keys: &[ForeignKey::new("department_id", "departments")],
};

pub static DEVICES: TableDef = TableDef {
    name: "devices",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("model", ColumnType::Text),
        Column::required("serial_number", ColumnType::Text),
        Column::required("manufacturer_id", ColumnType::Integer),
        Column::required("device_type_id", ColumnType::Integer),
        Column::new("purchase_date", ColumnType::Timestamp),
        Column::new("key_performance", ColumnType::Json),
    ],
    foreign_keys: &[
        ForeignKey::new("manufacturer_id", "manufacturer"),
        ForeignKey::new("device_type_id", "device_types"),
    ],
};

pub static DEVICES_ISSUED: TableDef = TableDef {
    name: "devices_issued",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("device_id", ColumnType::Integer),
        Column::new("employee_id", ColumnType::Integer),
        Column::new("department_id", ColumnType::Integer),
        Column::required("date_of_issue", ColumnType::Timestamp).default_sql("CURRENT_TIMESTAMP"),
    ],
    foreign_keys: &[
        ForeignKey::new("device_id", "devices"),
        ForeignKey::new("employee_id", "employees"),
        ForeignKey::new("department_id", "departments"),
    ],
};

impl TableId {
    pub fn def(self) -> &'static TableDef {
        match self {
            TableId::Devices => &DEVICES,
            TableId::Employees => &EMPLOYEES,
            TableId::Departments => &DEPARTMENTS,
            TableId::Manufacturers => &MANUFACTURER,
            TableId::DeviceTypes => &DEVICE_TYPES,
            TableId::DevicesIssued => &DEVICES_ISSUED,
        }
    }
}

/// Definitions in creation order (FK parents before children).
pub fn all_defs() -> Vec<&'static TableDef> {
    vec![
        &MANUFACTURER,
        &DEPARTMENTS,
        &DEVICE_TYPES,
        &EMPLOYEES,
        &DEVICES,
        &DEVICES_ISSUED,
    ]
}
