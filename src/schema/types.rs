/// The fixed set of addressable tables. Nothing outside this set can be
/// browsed or edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableId {
    Devices,
    Employees,
    Departments,
    Manufacturers,
    DeviceTypes,
    DevicesIssued,
}

/// All tables in sidebar order.
pub const ALL_TABLES: &[TableId] = &[
    TableId::Devices,
    TableId::Employees,
    TableId::Departments,
    TableId::Manufacturers,
    TableId::DeviceTypes,
    TableId::DevicesIssued,
];

impl TableId {
    /// Physical table name in the database.
    pub fn table_name(self) -> &'static str {
        match self {
            TableId::Devices => "devices",
            TableId::Employees => "employees",
            TableId::Departments => "departments",
            TableId::Manufacturers => "manufacturer",
            TableId::DeviceTypes => "device_types",
            TableId::DevicesIssued => "devices_issued",
        }
    }

    /// Human-facing name shown in the sidebar and dialog titles.
    pub fn display_name(self) -> &'static str {
        match self {
            TableId::Devices => "Devices",
            TableId::Employees => "Employees",
            TableId::Departments => "Departments",
            TableId::Manufacturers => "Manufacturers",
            TableId::DeviceTypes => "Device Types",
            TableId::DevicesIssued => "Devices Issued",
        }
    }

    /// Resolve a display name; unknown names fall back to Devices, the
    /// landing table.
    pub fn from_display_name(name: &str) -> TableId {
        ALL_TABLES
            .iter()
            .copied()
            .find(|t| t.display_name() == name)
            .unwrap_or(TableId::Devices)
    }
}

/// Column data type used by the static table definitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnType {
    Integer,
    Text,
    Timestamp,
    /// JSON blob stored as text (the key-performance bag)
    Json,
}

impl ColumnType {
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Text => "TEXT",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Json => "TEXT",
        }
    }
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    pub nullable: bool,
    /// SQL default expression, emitted verbatim in DDL
    pub default: Option<&'static str>,
}

impl Column {
    /// Create an optional (nullable) column
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: true,
            default: None,
        }
    }

    /// Create a required (non-nullable) column
    pub const fn required(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: false,
            default: None,
        }
    }

    pub const fn default_sql(self, expr: &'static str) -> Self {
        Self {
            default: Some(expr),
            ..self
        }
    }
}

/// Foreign key reference
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
}

impl ForeignKey {
    pub const fn new(column: &'static str, references_table: &'static str) -> Self {
        Self {
            column,
            references_table,
            references_column: "id",
        }
    }
}

/// Static table definition, used only to create the database. Everything
/// that renders or persists rows goes through runtime introspection.
#[derive(Debug, Clone)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub foreign_keys: &'static [ForeignKey],
}

/// Runtime column descriptor as reported by the store. Produced fresh on
/// every introspection call, never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    /// Declared type string as the store reports it (e.g. "INTEGER",
    /// "TIMESTAMP"); classification is by substring
    pub decl_type: String,
    pub nullable: bool,
}

/// Broad classification of a declared type for field/format dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeClass {
    Integer,
    Temporal,
    Text,
}

impl ColumnInfo {
    pub fn type_class(&self) -> TypeClass {
        let decl = self.decl_type.to_ascii_uppercase();
        if decl.contains("TIMESTAMP") || decl.contains("DATETIME") || decl.contains("DATE") {
            TypeClass::Temporal
        } else if decl.contains("INT") {
            TypeClass::Integer
        } else {
            TypeClass::Text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_round_trip() {
        for table in ALL_TABLES {
            assert_eq!(TableId::from_display_name(table.display_name()), *table);
        }
    }

    #[test]
    fn test_unknown_display_name_defaults_to_devices() {
        assert_eq!(TableId::from_display_name("Widgets"), TableId::Devices);
    }

    #[test]
    fn test_type_class_by_substring() {
        let col = |decl: &str| ColumnInfo {
            name: "x".into(),
            decl_type: decl.into(),
            nullable: true,
        };
        assert_eq!(col("INTEGER").type_class(), TypeClass::Integer);
        assert_eq!(col("int(11)").type_class(), TypeClass::Integer);
        assert_eq!(col("TIMESTAMP").type_class(), TypeClass::Temporal);
        assert_eq!(col("datetime").type_class(), TypeClass::Temporal);
        assert_eq!(col("TEXT").type_class(), TypeClass::Text);
        assert_eq!(col("VARCHAR(100)").type_class(), TypeClass::Text);
    }
}
