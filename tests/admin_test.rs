//! Integration tests exercising the store, the foreign-key resolver, the
//! form deriver and the CRUD orchestration against a real SQLite file.

use once_cell::sync::Lazy;
use std::sync::Mutex;
use tempfile::TempDir;

use inventory_admin::crud;
use inventory_admin::form::{self, derive_field, FieldInput, FieldKind};
use inventory_admin::format::format_row;
use inventory_admin::kp::Bag;
use inventory_admin::lookup::FkColumn;
use inventory_admin::schema::{ColumnInfo, TableId};
use inventory_admin::store::{Store, Value};
use inventory_admin::AdminError;

// =============================================================================
// Fixtures
// =============================================================================

/// Shared schema-only database - created once and reused by the tests
/// that read column metadata and never touch row data.
static SCHEMA_DB: Lazy<Mutex<SchemaDb>> = Lazy::new(|| Mutex::new(SchemaDb::new()));

struct SchemaDb {
    _dir: TempDir,
    store: Store,
}

impl SchemaDb {
    fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let store = Store::new(dir.path().join("schema.db"));
        store.init_schema().expect("init schema");
        Self { _dir: dir, store }
    }
}

/// Fresh database with the full schema, for tests that write rows. The
/// TempDir guard keeps the file alive for the duration of the test.
fn fresh_store() -> (TempDir, Store) {
    let dir = TempDir::new().expect("temp dir");
    let store = Store::new(dir.path().join("test.db"));
    store.init_schema().expect("init schema");
    (dir, store)
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn field(name: &str, value: Value) -> (String, Value) {
    (name.to_string(), value)
}

fn insert_manufacturer(store: &Store, name: &str) -> i64 {
    store
        .insert(TableId::Manufacturers, &[field("name", text(name))])
        .expect("insert manufacturer")
}

fn insert_department(store: &Store, name: &str) -> i64 {
    store
        .insert(TableId::Departments, &[field("name", text(name))])
        .expect("insert department")
}

fn insert_device_type(store: &Store, name: &str, spec: Option<&str>) -> i64 {
    store
        .insert(
            TableId::DeviceTypes,
            &[
                field("device_type", text(name)),
                field("specification", spec.map(text).unwrap_or(Value::Null)),
                field("description", Value::Null),
            ],
        )
        .expect("insert device type")
}

fn insert_employee(store: &Store, first: &str, last: &str, dept: Option<i64>) -> i64 {
    store
        .insert(
            TableId::Employees,
            &[
                field("first_name", text(first)),
                field("last_name", text(last)),
                field(
                    "department_id",
                    dept.map(Value::Integer).unwrap_or(Value::Null),
                ),
            ],
        )
        .expect("insert employee")
}

fn insert_device(store: &Store, model: &str, serial: &str, mfr: i64, dt: i64) -> i64 {
    store
        .insert(
            TableId::Devices,
            &[
                field("model", text(model)),
                field("serial_number", text(serial)),
                field("manufacturer_id", Value::Integer(mfr)),
                field("device_type_id", Value::Integer(dt)),
            ],
        )
        .expect("insert device")
}

fn bag(entries: &[(&str, &str)]) -> Bag {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// =============================================================================
// Schema introspection
// =============================================================================

#[test]
fn describe_columns_is_ordered_with_id_first() {
    let db = SCHEMA_DB.lock().unwrap();
    let columns = db.store.describe_columns(TableId::Devices).unwrap();

    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "id",
            "model",
            "serial_number",
            "manufacturer_id",
            "device_type_id",
            "purchase_date",
            "key_performance"
        ]
    );

    let id = &columns[0];
    assert!(!id.nullable);
    let kp = columns.last().unwrap();
    assert!(kp.nullable);
}

#[test]
fn describe_columns_fails_on_missing_table() {
    let dir = TempDir::new().unwrap();
    // Empty database file, schema never created
    let store = Store::new(dir.path().join("empty.db"));
    let err = store.describe_columns(TableId::Devices).unwrap_err();
    assert!(matches!(err, AdminError::Schema { .. }));
}

// =============================================================================
// Listing and pagination
// =============================================================================

#[test]
fn list_returns_at_most_page_size_rows_and_true_total() {
    let (_dir, store) = fresh_store();
    for i in 0..7 {
        insert_department(&store, &format!("Dept {}", i));
    }

    let listing = crud::list(&store, TableId::Departments, 3, 1).unwrap();
    assert_eq!(listing.rows.len(), 3);
    assert_eq!(listing.total_count, 7);
    assert_eq!(listing.total_pages, 3);

    let last = crud::list(&store, TableId::Departments, 3, 3).unwrap();
    assert_eq!(last.rows.len(), 1);
}

#[test]
fn list_clamps_page_and_size() {
    let (_dir, store) = fresh_store();
    insert_department(&store, "Solo");

    // Page and size below 1 are clamped up
    let listing = crud::list(&store, TableId::Departments, 0, 0).unwrap();
    assert_eq!(listing.page, 1);
    assert_eq!(listing.page_size, 1);

    // Size above the cap is clamped down
    let capped = crud::list(&store, TableId::Departments, 5000, 1).unwrap();
    assert_eq!(capped.page_size, 1000);
}

#[test]
fn empty_table_still_reports_one_page() {
    let (_dir, store) = fresh_store();
    let listing = crud::list(&store, TableId::Employees, 25, 1).unwrap();
    assert_eq!(listing.total_count, 0);
    assert_eq!(listing.total_pages, 1);
    assert!(listing.rows.is_empty());
}

// =============================================================================
// Foreign-key resolution
// =============================================================================

#[test]
fn resolve_label_composes_and_degrades() {
    let (_dir, store) = fresh_store();
    let dept = insert_department(&store, "Engineering");
    let emp = insert_employee(&store, "Ada", "Krause", Some(dept));

    assert_eq!(
        FkColumn::Employee.resolve_label(&store, &Value::Integer(emp)),
        "Ada Krause"
    );
    assert_eq!(
        FkColumn::Department.resolve_label(&store, &Value::Integer(dept)),
        "Engineering"
    );

    // Missing referent degrades to the raw id string, not an error
    assert_eq!(
        FkColumn::DeviceType.resolve_label(&store, &Value::Integer(7)),
        "7"
    );
    // Null resolves to empty
    assert_eq!(FkColumn::Employee.resolve_label(&store, &Value::Null), "");
}

#[test]
fn device_labels_include_serial() {
    let (_dir, store) = fresh_store();
    let mfr = insert_manufacturer(&store, "Volta Works");
    let dt = insert_device_type(&store, "Laptop", None);
    let dev = insert_device(&store, "Fieldbook 14", "FB14-0042", mfr, dt);

    assert_eq!(
        FkColumn::Device.resolve_label(&store, &Value::Integer(dev)),
        "Fieldbook 14 (FB14-0042)"
    );
}

#[test]
fn employee_options_sorted_by_last_then_first() {
    let (_dir, store) = fresh_store();
    insert_employee(&store, "Zoe", "Adams", None);
    insert_employee(&store, "Ann", "Berg", None);
    insert_employee(&store, "Bea", "Adams", None);

    let options = FkColumn::Employee
        .options(&store, TableId::Employees, true)
        .unwrap();
    let labels: Vec<&str> = options.iter().map(|(_, l)| l.as_str()).collect();
    assert_eq!(labels, vec!["Bea Adams", "Zoe Adams", "Ann Berg"]);
}

#[test]
fn issuance_create_offers_only_unissued_devices() {
    let (_dir, store) = fresh_store();
    let mfr = insert_manufacturer(&store, "Apex");
    let dt = insert_device_type(&store, "Scooter", None);
    let issued = insert_device(&store, "City Glide", "CG-1", mfr, dt);
    let free = insert_device(&store, "Road Runner", "RR-1", mfr, dt);

    store
        .insert(
            TableId::DevicesIssued,
            &[field("device_id", Value::Integer(issued))],
        )
        .unwrap();

    let create_options = FkColumn::Device
        .options(&store, TableId::DevicesIssued, true)
        .unwrap();
    let ids: Vec<i64> = create_options.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![free]);

    // Edit mode sees every device, so an existing issuance keeps its value
    let edit_options = FkColumn::Device
        .options(&store, TableId::DevicesIssued, false)
        .unwrap();
    assert_eq!(edit_options.len(), 2);
}

// =============================================================================
// Field derivation
// =============================================================================

fn column_of(store: &Store, table: TableId, name: &str) -> ColumnInfo {
    store
        .describe_columns(table)
        .unwrap()
        .into_iter()
        .find(|c| c.name == name)
        .expect("column exists")
}

#[test]
fn id_and_kp_and_new_issue_date_are_omitted() {
    let db = SCHEMA_DB.lock().unwrap();
    let store = &db.store;

    let id = column_of(store, TableId::Devices, "id");
    assert!(derive_field(store, TableId::Devices, &id, None, true)
        .unwrap()
        .is_none());

    let kp = column_of(store, TableId::Devices, "key_performance");
    assert!(derive_field(store, TableId::Devices, &kp, None, true)
        .unwrap()
        .is_none());

    let issue_date = column_of(store, TableId::DevicesIssued, "date_of_issue");
    assert!(
        derive_field(store, TableId::DevicesIssued, &issue_date, None, true)
            .unwrap()
            .is_none()
    );
    // Editable on existing rows
    let existing = text("2024-03-01 09:00:00");
    assert!(derive_field(
        store,
        TableId::DevicesIssued,
        &issue_date,
        Some(&existing),
        false
    )
    .unwrap()
    .is_some());
}

#[test]
fn foreign_key_column_becomes_select_with_none_for_nullable() {
    let (_dir, store) = fresh_store();
    insert_employee(&store, "Ada", "Krause", None);

    let col = column_of(&store, TableId::DevicesIssued, "employee_id");
    let derived = derive_field(&store, TableId::DevicesIssued, &col, None, true)
        .unwrap()
        .unwrap();

    match derived.kind {
        FieldKind::Select { options } => {
            assert_eq!(options[0], (None, "(None)".to_string()));
            assert_eq!(options.len(), 2);
        }
        other => panic!("expected select, got {:?}", other),
    }
    assert_eq!(derived.label, "Employee");
}

#[test]
fn required_reference_with_no_referents_is_unavailable() {
    let (_dir, store) = fresh_store();
    let col = column_of(&store, TableId::Devices, "manufacturer_id");
    let derived = derive_field(&store, TableId::Devices, &col, None, true)
        .unwrap()
        .unwrap();
    assert!(matches!(derived.kind, FieldKind::Unavailable { .. }));
}

#[test]
fn plain_columns_classify_by_declared_type() {
    let db = SCHEMA_DB.lock().unwrap();
    let store = &db.store;

    let model = column_of(store, TableId::Devices, "model");
    let derived = derive_field(store, TableId::Devices, &model, None, true)
        .unwrap()
        .unwrap();
    assert_eq!(derived.kind, FieldKind::Text);
    assert_eq!(derived.input, FieldInput::Text(String::new()));

    let date = column_of(store, TableId::Devices, "purchase_date");
    let derived = derive_field(store, TableId::Devices, &date, None, true)
        .unwrap()
        .unwrap();
    assert_eq!(derived.kind, FieldKind::DateTime);

    let spec = column_of(store, TableId::DeviceTypes, "specification");
    let derived = derive_field(store, TableId::DeviceTypes, &spec, None, true)
        .unwrap()
        .unwrap();
    assert_eq!(derived.kind, FieldKind::Multiline);
}

#[test]
fn device_type_change_rebuilds_attribute_fields() {
    let (_dir, store) = fresh_store();
    let new_type = insert_device_type(&store, "Workstation", Some("RAM,Storage"));

    let existing = bag(&[("CPU", "i7"), ("RAM", "16GB")]);
    let fields = form::attribute_fields(&store, Some(new_type), &existing).unwrap();

    assert_eq!(
        fields,
        vec![
            ("RAM".to_string(), "16GB".to_string()),
            ("Storage".to_string(), String::new()),
        ]
    );
}

#[test]
fn department_follows_employee() {
    let (_dir, store) = fresh_store();
    let dept = insert_department(&store, "Logistics");
    let with_dept = insert_employee(&store, "Jonas", "Berg", Some(dept));
    let without = insert_employee(&store, "Mia", "Roth", None);

    assert_eq!(
        form::department_for_employee(&store, with_dept).unwrap(),
        Some(dept)
    );
    assert_eq!(form::department_for_employee(&store, without).unwrap(), None);
    assert_eq!(form::department_for_employee(&store, 999).unwrap(), None);
}

// =============================================================================
// Row formatting
// =============================================================================

#[test]
fn formatted_rows_resolve_references_and_carry_raw_id() {
    let (_dir, store) = fresh_store();
    let mfr = insert_manufacturer(&store, "Apex Mobility");
    let dt = insert_device_type(&store, "E-Scooter", Some("Battery, Range"));
    let dev = store
        .insert(
            TableId::Devices,
            &[
                field("model", text("City Glide 2")),
                field("serial_number", text("CG2-01")),
                field("manufacturer_id", Value::Integer(mfr)),
                field("device_type_id", Value::Integer(dt)),
                field("purchase_date", text("2024-03-01 09:00:00")),
                field(
                    "key_performance",
                    Value::Bag(bag(&[("Battery", "460 Wh"), ("Range", "45 km")])),
                ),
            ],
        )
        .unwrap();

    let columns = store.describe_columns(TableId::Devices).unwrap();
    let row = store.get_by_id(TableId::Devices, dev).unwrap().unwrap();
    let display = format_row(&store, &columns, &row).unwrap();

    assert_eq!(display.id, dev);
    // Column order: id, model, serial, manufacturer, device_type, date, kp
    assert_eq!(display.cells[1], "City Glide 2");
    assert_eq!(display.cells[3], "Apex Mobility");
    assert_eq!(display.cells[4], "E-Scooter");
    assert_eq!(display.cells[5], "2024-03-01 09:00:00");

    let kp = display.kp.expect("devices rows carry a kp rendering");
    assert_eq!(kp.collapsed, "Battery: 460 Wh\nRange: 45 km");
    assert_eq!(kp.collapsed, kp.expanded);
}

#[test]
fn dangling_reference_shows_raw_id_in_listing() {
    let (_dir, store) = fresh_store();
    insert_manufacturer(&store, "Apex");
    insert_device_type(&store, "Scooter", None);
    // device_type_id 42 does not exist; no referential integrity here
    store
        .insert(
            TableId::Devices,
            &[
                field("model", text("Ghost")),
                field("serial_number", text("G-1")),
                field("manufacturer_id", Value::Integer(1)),
                field("device_type_id", Value::Integer(42)),
            ],
        )
        .unwrap();

    let listing = crud::list(&store, TableId::Devices, 25, 1).unwrap();
    assert_eq!(listing.rows[0].cells[4], "42");
}

// =============================================================================
// Create / update / delete
// =============================================================================

fn submitted(column: &str, kind: FieldKind, input: FieldInput) -> form::Field {
    form::Field {
        column: column.to_string(),
        label: column.to_string(),
        kind,
        input,
    }
}

#[test]
fn blank_nullable_employee_persists_as_null() {
    let (_dir, store) = fresh_store();
    let mfr = insert_manufacturer(&store, "Apex");
    let dt = insert_device_type(&store, "Scooter", None);
    let dev = insert_device(&store, "City Glide", "CG-1", mfr, dt);

    let fields = vec![
        submitted(
            "device_id",
            FieldKind::Select { options: vec![] },
            FieldInput::Id(Some(dev)),
        ),
        submitted(
            "employee_id",
            FieldKind::Select { options: vec![] },
            FieldInput::Id(None),
        ),
        submitted(
            "department_id",
            FieldKind::Select { options: vec![] },
            FieldInput::Id(None),
        ),
    ];

    let id = crud::create(&store, TableId::DevicesIssued, &fields, &[]).unwrap();
    let row = store.get_by_id(TableId::DevicesIssued, id).unwrap().unwrap();

    assert_eq!(row.get("employee_id"), Some(&Value::Null));
    assert_eq!(row.get("department_id"), Some(&Value::Null));
    // Store default filled the issue date
    assert!(matches!(
        row.get("date_of_issue"),
        Some(Value::Timestamp(_))
    ));
}

#[test]
fn device_create_assembles_and_encodes_bag() {
    let (_dir, store) = fresh_store();
    let mfr = insert_manufacturer(&store, "Apex");
    let dt = insert_device_type(&store, "Scooter", Some("Battery, Range"));

    let fields = vec![
        submitted("model", FieldKind::Text, FieldInput::Text("X1".into())),
        submitted(
            "serial_number",
            FieldKind::Text,
            FieldInput::Text("X1-1".into()),
        ),
        submitted(
            "manufacturer_id",
            FieldKind::Select { options: vec![] },
            FieldInput::Id(Some(mfr)),
        ),
        submitted(
            "device_type_id",
            FieldKind::Select { options: vec![] },
            FieldInput::Id(Some(dt)),
        ),
        submitted("purchase_date", FieldKind::DateTime, FieldInput::Text("".into())),
    ];
    let kp_attrs = vec![
        ("Battery".to_string(), "460 Wh".to_string()),
        ("Range".to_string(), String::new()),
    ];

    let id = crud::create(&store, TableId::Devices, &fields, &kp_attrs).unwrap();
    let row = store.get_by_id(TableId::Devices, id).unwrap().unwrap();

    // Empty attribute values are dropped before encoding
    assert_eq!(
        row.get("key_performance"),
        Some(&Value::Bag(bag(&[("Battery", "460 Wh")])))
    );
    // Blank nullable date became NULL, not an empty string
    assert_eq!(row.get("purchase_date"), Some(&Value::Null));
}

#[test]
fn all_blank_attributes_persist_as_null_not_empty_object() {
    let (_dir, store) = fresh_store();
    let mfr = insert_manufacturer(&store, "Apex");
    let dt = insert_device_type(&store, "Scooter", Some("Battery"));

    let fields = vec![
        submitted("model", FieldKind::Text, FieldInput::Text("X2".into())),
        submitted(
            "serial_number",
            FieldKind::Text,
            FieldInput::Text("X2-1".into()),
        ),
        submitted(
            "manufacturer_id",
            FieldKind::Select { options: vec![] },
            FieldInput::Id(Some(mfr)),
        ),
        submitted(
            "device_type_id",
            FieldKind::Select { options: vec![] },
            FieldInput::Id(Some(dt)),
        ),
    ];
    let kp_attrs = vec![("Battery".to_string(), String::new())];

    let id = crud::create(&store, TableId::Devices, &fields, &kp_attrs).unwrap();

    // Inspect the stored cell directly: must be SQL NULL, never "{}"
    let conn = rusqlite::Connection::open(store.db_path()).unwrap();
    let stored: Option<String> = conn
        .query_row(
            "SELECT key_performance FROM devices WHERE id = ?1",
            [id],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(stored, None);
}

#[test]
fn update_reports_vanished_rows() {
    let (_dir, store) = fresh_store();
    let dept = insert_department(&store, "Sales");

    let fields = vec![submitted(
        "name",
        FieldKind::Text,
        FieldInput::Text("Sales EMEA".into()),
    )];
    assert!(crud::update(&store, TableId::Departments, dept, &fields, &[]).unwrap());

    let row = store.get_by_id(TableId::Departments, dept).unwrap().unwrap();
    assert_eq!(row.get("name"), Some(&Value::Text("Sales EMEA".into())));

    assert!(!crud::update(&store, TableId::Departments, 999, &fields, &[]).unwrap());
}

#[test]
fn delete_is_idempotent() {
    let (_dir, store) = fresh_store();
    let dept = insert_department(&store, "Temp");

    assert!(crud::delete(&store, TableId::Departments, dept).unwrap());
    assert!(!crud::delete(&store, TableId::Departments, dept).unwrap());
}

#[test]
fn required_constraint_failure_propagates() {
    let (_dir, store) = fresh_store();

    // name is NOT NULL and empty submissions for required columns are
    // stored as-is; SQLite accepts '' for TEXT NOT NULL, so force the
    // failure through a genuinely absent required column instead
    let err = store
        .insert(TableId::Departments, &[field("name", Value::Null)])
        .unwrap_err();
    assert!(matches!(err, AdminError::Persistence(_)));
}
