//! Pipeline orchestration for ETL runs

use super::{Enumerator, Extractor, Loader, Transformer, WorkItem};
use crate::{Error, Result};

/// What a pipeline does when a per-item stage fails
///
/// Enumeration and verification failures always abort the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Any failure aborts the whole run
    Abort,
    /// Extract/transform failures skip the item; load failures are recorded
    /// and the item is still verified
    Skip,
}

/// Result of processing one work item
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// Rows were written and the destination holds `count` rows afterwards
    Loaded { rows: usize, count: u64 },
    /// Writing failed but the destination still answered the count query
    LoadFailed { error: String, count: u64 },
    /// The item could not be read or transformed and was not loaded
    Skipped { error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemReport {
    pub table: String,
    pub outcome: ItemOutcome,
}

/// Per-item outcomes of a complete run, in processing order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub items: Vec<ItemReport>,
}

impl RunReport {
    /// Number of items whose load succeeded
    pub fn loaded(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.outcome, ItemOutcome::Loaded { .. }))
            .count()
    }

    /// Number of items that were skipped or failed to load
    pub fn failed(&self) -> usize {
        self.items.len() - self.loaded()
    }

    /// Total rows written across all items
    pub fn rows_written(&self) -> usize {
        self.items
            .iter()
            .map(|i| match i.outcome {
                ItemOutcome::Loaded { rows, .. } => rows,
                _ => 0,
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn push(&mut self, table: &str, outcome: ItemOutcome) {
        self.items.push(ItemReport {
            table: table.to_string(),
            outcome,
        });
    }
}

/// ETL Pipeline that runs every enumerated item through Extract, Transform and Load
///
/// # Type Parameters
/// - `N`: Enumerator type
/// - `E`: Extractor type (reads `N::Item`)
/// - `T`: Transformer type (must transform from `E::Item`)
/// - `L`: Loader type (must load `T::Output`)
///
/// # Example
/// ```no_run
/// use tableport::etl::{FailurePolicy, IdentityTransformer, Pipeline};
/// use tableport::storage::{CsvDirectory, CsvReader};
/// # use tableport::etl::Loader;
/// # use tableport::{Dataset, Result};
/// # struct MyLoader;
/// # impl Loader for MyLoader {
/// #     type Item = Dataset;
/// #     async fn load(&self, _t: &str, d: Dataset) -> Result<usize> { Ok(d.row_count()) }
/// #     async fn count(&self, _t: &str) -> Result<u64> { Ok(0) }
/// # }
///
/// # async fn example() -> Result<()> {
/// let pipeline = Pipeline::new(
///     CsvDirectory::new("data"),
///     CsvReader::new(),
///     IdentityTransformer::new(),
///     MyLoader,
/// )
/// .with_policy(FailurePolicy::Skip);
///
/// let report = pipeline.run().await?;
/// println!("Loaded {} of {} files", report.loaded(), report.items.len());
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<N, E, T, L> {
    enumerator: N,
    extractor: E,
    transformer: T,
    loader: L,
    policy: FailurePolicy,
}

impl<N, E, T, L> Pipeline<N, E, T, L>
where
    N: Enumerator,
    E: Extractor<Source = N::Item>,
    T: Transformer<Input = E::Item>,
    L: Loader<Item = T::Output>,
{
    /// Create a new pipeline that aborts on the first failure
    pub fn new(enumerator: N, extractor: E, transformer: T, loader: L) -> Self {
        Self {
            enumerator,
            extractor,
            transformer,
            loader,
            policy: FailurePolicy::Abort,
        }
    }

    /// Set the per-item failure policy (default: [`FailurePolicy::Abort`])
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the complete ETL pipeline
    ///
    /// Steps, per enumerated item and in enumeration order:
    /// 1. Extract the item
    /// 2. Transform it
    /// 3. Load it into the item's table
    /// 4. Count the rows in that table
    ///
    /// # Errors
    /// Returns the first error that the failure policy treats as fatal
    pub async fn run(&self) -> Result<RunReport> {
        log::info!("Starting ETL pipeline");

        let items = self.enumerator.enumerate().await?;
        log::info!("Found {} item(s) to process", items.len());

        let mut report = RunReport::default();

        if items.is_empty() {
            log::warn!("Nothing to process, pipeline complete");
            return Ok(report);
        }

        for item in &items {
            let table = item.table_name();

            let data = match self.extract_and_transform(item).await {
                Ok(data) => data,
                Err(e) if self.policy == FailurePolicy::Skip => {
                    log::error!("Skipping '{}' after {} failure: {}", table, e.stage(), e);
                    report.push(table, ItemOutcome::Skipped {
                        error: e.to_string(),
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };

            log::debug!("Loading into '{}'...", table);
            let loaded = match self.loader.load(table, data).await {
                Ok(rows) => Ok(rows),
                Err(e) if self.policy == FailurePolicy::Skip => {
                    log::error!("Load into '{}' failed: {}", table, e);
                    Err(e)
                }
                Err(e) => return Err(e),
            };

            let count = self.loader.count(table).await?;

            let outcome = match loaded {
                Ok(rows) => {
                    log::info!("Loaded {} row(s) into '{}', {} in total", rows, table, count);
                    ItemOutcome::Loaded { rows, count }
                }
                Err(e) => {
                    log::info!("Table '{}' holds {} row(s)", table, count);
                    ItemOutcome::LoadFailed {
                        error: e.to_string(),
                        count,
                    }
                }
            };
            report.push(table, outcome);
        }

        log::info!(
            "Pipeline complete: {} loaded, {} failed",
            report.loaded(),
            report.failed()
        );

        Ok(report)
    }

    async fn extract_and_transform(&self, item: &N::Item) -> Result<T::Output, Error> {
        log::debug!("Extracting '{}'...", item.table_name());
        let extracted = self.extractor.extract(item).await?;
        self.transformer.transform(extracted)
    }
}
