//! tableport
//!
//! Batch ELT jobs: replicate the tables of a MySQL database into BigQuery, and
//! load a directory of CSV files into MySQL tables.

pub mod cli;
pub mod client;
pub mod config;
pub mod dataset;
pub mod error;
pub mod etl;
pub mod storage;
pub mod tables;
pub mod transform;
pub mod warehouse;

// Re-exports for convenience
pub use dataset::{Column, Dataset, Value, ValueKind};
pub use error::{Error, Result};
pub use etl::{
    Enumerator, Extractor, FailurePolicy, IdentityTransformer, Loader, Pipeline, RunReport,
    Transformer, WorkItem,
};
