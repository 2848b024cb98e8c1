//! MySQL-backed pipeline stages

mod extractor;
mod loader;

pub use extractor::{SourceTable, TableEnumerator, TableExtractor};
pub use loader::TableAppender;
