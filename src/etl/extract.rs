//! Extractor trait for reading one work item into memory

use crate::Result;

/// Extractor trait for reading a single work item from its source
///
/// Implementors define how to read items from sources like:
/// - Database tables
/// - CSV files
///
/// # Example
/// ```no_run
/// use tableport::etl::Extractor;
/// use tableport::{Dataset, Result};
/// use std::path::PathBuf;
///
/// struct EmptyExtractor;
///
/// impl Extractor for EmptyExtractor {
///     type Source = PathBuf;
///     type Item = Dataset;
///
///     async fn extract(&self, _source: &PathBuf) -> Result<Dataset> {
///         Ok(Dataset::default())
///     }
/// }
/// ```
pub trait Extractor: Send + Sync {
    /// The work item type this extractor reads
    type Source: Send + Sync;

    /// The type of data extracted
    type Item: Send;

    /// Extract the complete contents of `source`
    ///
    /// # Errors
    /// Returns an error if extraction fails (query, I/O, parsing, etc.)
    fn extract(
        &self,
        source: &Self::Source,
    ) -> impl std::future::Future<Output = Result<Self::Item>> + Send;
}
