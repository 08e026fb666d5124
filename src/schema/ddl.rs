use crate::schema::TableDef;

/// Generate CREATE TABLE SQL for a table definition
pub fn generate_create_table(def: &TableDef) -> String {
    let mut sql = format!("CREATE TABLE {} (\n", def.name);
    let mut columns = Vec::new();

    for col in def.columns {
        let pk = if col.name == "id" {
            " PRIMARY KEY AUTOINCREMENT"
        } else {
            ""
        };
        let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
        let default = match col.default {
            Some(expr) => format!(" DEFAULT {}", expr),
            None => String::new(),
        };

        columns.push(format!(
            "    {} {}{}{}{}",
            col.name,
            col.col_type.sql_type(),
            pk,
            null_constraint,
            default
        ));
    }

    // FK clauses are documentation only: connections do not enable
    // foreign-key enforcement, matching the permissive reference policy
    for fk in def.foreign_keys {
        columns.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({})",
            fk.column, fk.references_table, fk.references_column
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for foreign key columns
pub fn generate_indexes(def: &TableDef) -> Vec<String> {
    def.foreign_keys
        .iter()
        .map(|fk| {
            format!(
                "CREATE INDEX idx_{}_{} ON {}({})",
                def.name, fk.column, def.name, fk.column
            )
        })
        .collect()
}
