//! File system storage operations
//!
//! This module handles reading CSV files from a data directory.

mod csv;

pub use self::csv::{CsvDirectory, CsvFile, CsvReader};
