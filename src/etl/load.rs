//! Loader trait for writing data to destination tables

use crate::Result;

/// Loader trait for loading data into a named destination table
///
/// Implementors define how to write to destinations:
/// - Warehouse tables (full replace)
/// - Database tables (append)
///
/// # Example
/// ```no_run
/// use tableport::etl::Loader;
/// use tableport::{Dataset, Result};
///
/// struct NullLoader;
///
/// impl Loader for NullLoader {
///     type Item = Dataset;
///
///     async fn load(&self, _table: &str, item: Dataset) -> Result<usize> {
///         Ok(item.row_count())
///     }
///
///     async fn count(&self, _table: &str) -> Result<u64> {
///         Ok(0)
///     }
/// }
/// ```
pub trait Loader: Send + Sync {
    /// The type of data to load
    type Item: Send;

    /// Write `item` into `table`
    ///
    /// Returns the number of rows written
    ///
    /// # Errors
    /// Returns an error if writing fails (connectivity, schema mismatch, quota, etc.)
    fn load(
        &self,
        table: &str,
        item: Self::Item,
    ) -> impl std::future::Future<Output = Result<usize>> + Send;

    /// Count the rows currently stored in `table`
    ///
    /// # Errors
    /// Returns an error if the count query fails, e.g. because the table does not exist
    fn count(&self, table: &str) -> impl std::future::Future<Output = Result<u64>> + Send;
}
