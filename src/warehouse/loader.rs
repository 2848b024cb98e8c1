//! Warehouse loader
//!
//! Replaces BigQuery tables wholesale with the contents of a dataset.

use super::sql::{create_or_replace_sql, insert_statements};
use crate::client::BigQueryClient;
use crate::dataset::Dataset;
use crate::etl::Loader;
use crate::{Error, Result};

/// Rows per INSERT statement unless configured otherwise
pub const DEFAULT_BATCH_ROWS: usize = 500;

/// Loader that drops and recreates each destination table before filling it
///
/// # Example
/// ```no_run
/// use tableport::client::BigQueryClient;
/// use tableport::config::WarehouseConfig;
/// use tableport::etl::Loader;
/// use tableport::warehouse::WarehouseLoader;
/// use tableport::{Column, Dataset, Value};
///
/// # async fn example() -> tableport::Result<()> {
/// let client = BigQueryClient::connect(&WarehouseConfig::from_env()?).await?;
/// let loader = WarehouseLoader::new(client);
///
/// let data = Dataset::new(vec![Column::new("id", vec![Value::Int(1)])]);
/// loader.load("orders", data).await?;
/// assert_eq!(loader.count("orders").await?, 1);
/// # Ok(())
/// # }
/// ```
pub struct WarehouseLoader {
    client: BigQueryClient,
    batch_rows: usize,
}

impl WarehouseLoader {
    pub fn new(client: BigQueryClient) -> Self {
        Self {
            client,
            batch_rows: DEFAULT_BATCH_ROWS,
        }
    }

    /// Set the maximum rows per INSERT statement (default: 500, minimum 1)
    pub fn with_batch_rows(mut self, batch_rows: usize) -> Self {
        self.batch_rows = batch_rows.max(1);
        self
    }
}

fn with_table(error: Error, action: &str, name: &str) -> Error {
    match error {
        Error::Load(message) => {
            Error::Load(format!("Failed to {} '{}': {}", action, name, message))
        }
        other => other,
    }
}

impl Loader for WarehouseLoader {
    type Item = Dataset;

    async fn load(&self, table: &str, item: Dataset) -> Result<usize> {
        let name = self.client.table_name(table);
        if item.columns().is_empty() {
            return Err(Error::Load(format!("'{}' has no columns to load", name)));
        }

        let path = self.client.table_path(table);
        log::info!("Loading {} row(s) into '{}'", item.row_count(), name);

        self.client
            .execute(create_or_replace_sql(&path, &item))
            .await
            .map_err(|e| with_table(e, "replace", &name))?;

        let statements = insert_statements(&path, &item, self.batch_rows);
        let total = statements.len();
        for (index, statement) in statements.into_iter().enumerate() {
            log::debug!(
                "Inserting batch {}/{} into '{}' ({} bytes)",
                index + 1,
                total,
                name,
                statement.len()
            );
            self.client
                .execute(statement)
                .await
                .map_err(|e| with_table(e, "insert into", &name))?;
        }

        Ok(item.row_count())
    }

    async fn count(&self, table: &str) -> Result<u64> {
        self.client.count_rows(table).await
    }
}
