use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "inventory-admin")]
#[command(version, about = "Browse and edit the device inventory database")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the terminal browser
    Browse {
        /// SQLite database path (defaults to $INVENTORY_DB, then inventory.db)
        #[arg(short, long)]
        db: Option<PathBuf>,

        /// Rows per page (1-1000)
        #[arg(long, default_value_t = 25)]
        page_size: u64,
    },

    /// Create a new database with the inventory schema
    Init {
        /// SQLite database path (defaults to $INVENTORY_DB, then inventory.db)
        #[arg(short, long)]
        db: Option<PathBuf>,

        /// Insert a small demo dataset
        #[arg(long)]
        seed: bool,

        /// Replace an existing database file
        #[arg(short, long)]
        force: bool,
    },

    /// List the browsable tables
    ListTables,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

/// Database path precedence: flag, then $INVENTORY_DB, then ./inventory.db
pub fn resolve_db_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os("INVENTORY_DB").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("inventory.db"))
}
