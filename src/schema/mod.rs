pub mod ddl;
pub mod tables;
pub mod types;

pub use ddl::*;
pub use tables::*;
pub use types::*;
