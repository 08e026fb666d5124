//! SQLite data access. Every call opens its own connection and drops it
//! on return, so nothing is held across user think-time and concurrent
//! edits elsewhere are visible on the next fetch.

mod value;

pub use value::{parse_timestamp, Value, TIMESTAMP_FORMAT};

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AdminError, Result};
use crate::schema::{all_defs, generate_create_table, generate_indexes, ColumnInfo, TableId};

/// A fetched row, keyed by column name. The `id` column is always present.
#[derive(Debug, Clone, Default)]
pub struct RowData {
    pub values: HashMap<String, Value>,
}

impl RowData {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn id(&self) -> Option<i64> {
        self.get("id").and_then(Value::as_id)
    }
}

pub struct Store {
    db_path: PathBuf,
}

impl Store {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn conn(&self) -> Result<Connection> {
        // Foreign keys stay unenforced: references may dangle and the
        // resolver degrades to the raw id when they do
        Ok(Connection::open(&self.db_path)?)
    }

    /// Create the six tables and their FK indexes in a fresh database.
    pub fn init_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        for def in all_defs() {
            conn.execute(&generate_create_table(def), [])?;
            for index_sql in generate_indexes(def) {
                conn.execute(&index_sql, [])?;
            }
        }
        Ok(())
    }

    /// Insert a small demo dataset into a freshly initialized database.
    pub fn seed_demo(&self) -> Result<()> {
        let text = |s: &str| Value::Text(s.to_string());
        let field = |n: &str, v: Value| (n.to_string(), v);

        for name in ["Apex Mobility", "Edison Electric", "Volta Works"] {
            self.insert(TableId::Manufacturers, &[field("name", text(name))])?;
        }
        for name in ["Engineering", "Logistics", "Sales"] {
            self.insert(TableId::Departments, &[field("name", text(name))])?;
        }

        self.insert(
            TableId::DeviceTypes,
            &[
                field("device_type", text("E-Scooter")),
                field("specification", text("Battery, Range, Top Speed, Motor Power")),
                field("description", text("Electric scooters for field staff")),
            ],
        )?;
        self.insert(
            TableId::DeviceTypes,
            &[
                field("device_type", text("Laptop")),
                field("specification", text("CPU, RAM, Storage")),
                field("description", Value::Null),
            ],
        )?;

        self.insert(
            TableId::Employees,
            &[
                field("first_name", text("Ada")),
                field("last_name", text("Krause")),
                field("department_id", Value::Integer(1)),
            ],
        )?;
        self.insert(
            TableId::Employees,
            &[
                field("first_name", text("Jonas")),
                field("last_name", text("Berg")),
                field("department_id", Value::Integer(2)),
            ],
        )?;

        let scooter_bag: crate::kp::Bag = [
            ("Battery", "460 Wh"),
            ("Range", "45 km"),
            ("Top Speed", "20 km/h"),
            ("Motor Power", "350 W"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        self.insert(
            TableId::Devices,
            &[
                field("model", text("City Glide 2")),
                field("serial_number", text("CG2-000184")),
                field("manufacturer_id", Value::Integer(1)),
                field("device_type_id", Value::Integer(1)),
                field("purchase_date", text("2024-03-01 09:00:00")),
                field("key_performance", Value::Bag(scooter_bag)),
            ],
        )?;
        self.insert(
            TableId::Devices,
            &[
                field("model", text("Fieldbook 14")),
                field("serial_number", text("FB14-0042")),
                field("manufacturer_id", Value::Integer(3)),
                field("device_type_id", Value::Integer(2)),
                field("purchase_date", Value::Null),
                field("key_performance", Value::Null),
            ],
        )?;

        self.insert(
            TableId::DevicesIssued,
            &[
                field("device_id", Value::Integer(2)),
                field("employee_id", Value::Integer(1)),
                field("department_id", Value::Integer(1)),
            ],
        )?;

        Ok(())
    }

    /// Ordered column descriptors for a table, fresh on every call.
    pub fn describe_columns(&self, table: TableId) -> Result<Vec<ColumnInfo>> {
        let conn = self.conn()?;
        describe_columns_on(&conn, table)
    }

    /// One page of rows plus the total row count at call time.
    pub fn count_and_page(
        &self,
        table: TableId,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<RowData>, u64)> {
        let conn = self.conn()?;
        let name = table.table_name();

        let total: u64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", name), [], |row| {
            row.get(0)
        })?;

        let columns = describe_columns_on(&conn, table)?;
        let mut stmt = conn.prepare(&format!("SELECT * FROM {} LIMIT ?1 OFFSET ?2", name))?;
        let mut rows = stmt.query(params![limit, offset])?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(read_row(&columns, row)?);
        }

        Ok((out, total))
    }

    pub fn get_by_id(&self, table: TableId, id: i64) -> Result<Option<RowData>> {
        let conn = self.conn()?;
        let columns = describe_columns_on(&conn, table)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM {} WHERE id = ?1",
            table.table_name()
        ))?;
        let mut rows = stmt.query(params![id])?;

        match rows.next()? {
            Some(row) => Ok(Some(read_row(&columns, row)?)),
            None => Ok(None),
        }
    }

    /// Insert one row; returns the store-assigned id.
    pub fn insert(&self, table: TableId, fields: &[(String, Value)]) -> Result<i64> {
        let conn = self.conn()?;
        let columns: Vec<&str> = fields.iter().map(|(name, _)| name.as_str()).collect();
        let placeholders: Vec<String> = (1..=fields.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.table_name(),
            columns.join(", "),
            placeholders.join(", ")
        );

        conn.execute(&sql, params_from_iter(fields.iter().map(|(_, v)| v)))?;
        Ok(conn.last_insert_rowid())
    }

    /// Update one row; returns the number of rows affected (0 or 1).
    pub fn update(&self, table: TableId, id: i64, fields: &[(String, Value)]) -> Result<usize> {
        if fields.is_empty() {
            return Ok(0);
        }
        let conn = self.conn()?;
        let assignments: Vec<String> = fields
            .iter()
            .enumerate()
            .map(|(i, (name, _))| format!("{} = ?{}", name, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table.table_name(),
            assignments.join(", "),
            fields.len() + 1
        );

        let mut params: Vec<&dyn rusqlite::ToSql> =
            fields.iter().map(|(_, v)| v as &dyn rusqlite::ToSql).collect();
        params.push(&id);

        Ok(conn.execute(&sql, params.as_slice())?)
    }

    /// Delete one row; returns the number of rows affected (0 or 1).
    pub fn delete(&self, table: TableId, id: i64) -> Result<usize> {
        let conn = self.conn()?;
        Ok(conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", table.table_name()),
            params![id],
        )?)
    }

    // --- id + label projections for the foreign-key resolver ---

    pub fn manufacturers(&self) -> Result<Vec<(i64, String)>> {
        self.id_label_query("SELECT id, name FROM manufacturer ORDER BY name")
    }

    pub fn departments(&self) -> Result<Vec<(i64, String)>> {
        self.id_label_query("SELECT id, name FROM departments ORDER BY name")
    }

    pub fn device_types(&self) -> Result<Vec<(i64, String)>> {
        self.id_label_query("SELECT id, device_type FROM device_types ORDER BY device_type")
    }

    pub fn employees(&self) -> Result<Vec<(i64, String)>> {
        self.id_label_query(
            "SELECT id, first_name || ' ' || last_name FROM employees \
             ORDER BY last_name, first_name",
        )
    }

    pub fn devices(&self) -> Result<Vec<(i64, String)>> {
        self.id_label_query(
            "SELECT id, model || ' (' || serial_number || ')' FROM devices ORDER BY model",
        )
    }

    /// Devices not currently present in the issuance table. Computed,
    /// not a stored flag.
    pub fn available_devices(&self) -> Result<Vec<(i64, String)>> {
        self.id_label_query(
            "SELECT id, model || ' (' || serial_number || ')' FROM devices \
             WHERE id NOT IN (SELECT device_id FROM devices_issued) \
             ORDER BY model",
        )
    }

    /// Department of an employee, if the employee exists and has one.
    pub fn employee_department(&self, employee_id: i64) -> Result<Option<i64>> {
        let conn = self.conn()?;
        let dept: Option<Option<i64>> = conn
            .query_row(
                "SELECT department_id FROM employees WHERE id = ?1",
                params![employee_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(dept.flatten())
    }

    /// Specification text of a device type, if the type exists and has one.
    pub fn device_type_specification(&self, device_type_id: i64) -> Result<Option<String>> {
        let conn = self.conn()?;
        let spec: Option<Option<String>> = conn
            .query_row(
                "SELECT specification FROM device_types WHERE id = ?1",
                params![device_type_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(spec.flatten())
    }

    fn id_label_query(&self, sql: &str) -> Result<Vec<(i64, String)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

fn describe_columns_on(conn: &Connection, table: TableId) -> Result<Vec<ColumnInfo>> {
    let name = table.table_name();
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", name))
        .map_err(|e| AdminError::schema(name, e.to_string()))?;

    let rows = stmt
        .query_map([], |row| {
            Ok(ColumnInfo {
                name: row.get::<_, String>("name")?,
                decl_type: row.get::<_, String>("type")?,
                nullable: row.get::<_, i64>("notnull")? == 0,
            })
        })
        .map_err(|e| AdminError::schema(name, e.to_string()))?;

    let mut columns = Vec::new();
    for row in rows {
        columns.push(row.map_err(|e| AdminError::schema(name, e.to_string()))?);
    }

    if columns.is_empty() {
        return Err(AdminError::schema(name, "table does not exist"));
    }
    Ok(columns)
}

fn read_row(columns: &[ColumnInfo], row: &rusqlite::Row<'_>) -> Result<RowData> {
    let mut values = HashMap::new();
    for (idx, col) in columns.iter().enumerate() {
        let raw = row.get_ref(idx)?;
        values.insert(col.name.clone(), Value::read(col, raw));
    }
    Ok(RowData { values })
}
