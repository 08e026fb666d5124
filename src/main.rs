use anyhow::{bail, Result};
use inventory_admin::{
    cli::{resolve_db_path, Cli, Commands},
    prefs::Preferences,
    schema::ALL_TABLES,
    store::Store,
    ui,
};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Browse { db, page_size } => {
            let db_path = resolve_db_path(db);
            if !db_path.exists() {
                bail!(
                    "Database {:?} does not exist. Create it first with `inventory-admin init`.",
                    db_path
                );
            }
            let store = Store::new(db_path);
            let prefs = Preferences::load();
            ui::run(store, page_size, prefs)?;
        }

        Commands::Init { db, seed, force } => {
            let db_path = resolve_db_path(db);
            if db_path.exists() {
                if !force {
                    bail!("Database {:?} already exists (use --force to replace it)", db_path);
                }
                std::fs::remove_file(&db_path)?;
            }

            let store = Store::new(db_path.clone());
            store.init_schema()?;
            if seed {
                store.seed_demo()?;
            }

            println!(
                "Created {:?} with {} tables{}",
                db_path,
                ALL_TABLES.len(),
                if seed { " (seeded)" } else { "" }
            );
        }

        Commands::ListTables => {
            println!("Available tables:\n");
            for table in ALL_TABLES {
                println!("  {} ({})", table.display_name(), table.table_name());
            }
        }
    }

    Ok(())
}
