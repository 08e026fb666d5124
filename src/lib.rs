pub mod cli;
pub mod crud;
pub mod error;
pub mod form;
pub mod format;
pub mod kp;
pub mod lookup;
pub mod prefs;
pub mod schema;
pub mod store;
pub mod ui;

pub use cli::{Cli, Commands};
pub use error::AdminError;
