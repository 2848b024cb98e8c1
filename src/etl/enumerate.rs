//! Enumerator trait for discovering the work of a run

use crate::Result;

/// A unit of work that ends up in one destination table
pub trait WorkItem {
    /// Name of the destination table this item is loaded into
    fn table_name(&self) -> &str;
}

/// Enumerator trait for listing the items a pipeline should process
///
/// The returned order is the processing order.
///
/// # Example
/// ```no_run
/// use tableport::etl::{Enumerator, WorkItem};
///
/// struct Fixed(Vec<String>);
/// struct Name(String);
///
/// impl WorkItem for Name {
///     fn table_name(&self) -> &str {
///         &self.0
///     }
/// }
///
/// impl Enumerator for Fixed {
///     type Item = Name;
///
///     async fn enumerate(&self) -> tableport::Result<Vec<Self::Item>> {
///         Ok(self.0.iter().cloned().map(Name).collect())
///     }
/// }
/// ```
pub trait Enumerator: Send + Sync {
    /// The type of work items produced
    type Item: WorkItem + Send + Sync;

    /// List the work items
    ///
    /// # Errors
    /// Returns an error if the listing itself fails (catalog query, directory read)
    fn enumerate(&self) -> impl std::future::Future<Output = Result<Vec<Self::Item>>> + Send;
}
