//! Database and warehouse clients.
//!
//! This module provides the [`MySqlClient`] used as source (warehouse sync) and
//! destination (CSV load), and the [`BigQueryClient`] used as warehouse.

mod bigquery;
mod mysql;
pub mod mysql_types;

pub use bigquery::BigQueryClient;
pub use mysql::MySqlClient;
