//! BigQuery destination for the warehouse sync

mod loader;
pub mod sql;

pub use loader::{DEFAULT_BATCH_ROWS, WarehouseLoader};
pub use sql::quote_identifier;
