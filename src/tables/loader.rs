//! Database table loader
//!
//! Appends datasets to MySQL tables.

use crate::client::MySqlClient;
use crate::dataset::Dataset;
use crate::etl::Loader;
use crate::Result;
use std::sync::Arc;

/// Loader that appends rows to same-named database tables
///
/// Rows already in the table are kept, so loading the same data twice
/// duplicates it. Each load is committed as one transaction.
pub struct TableAppender {
    client: Arc<MySqlClient>,
}

impl TableAppender {
    pub fn new(client: Arc<MySqlClient>) -> Self {
        Self { client }
    }
}

impl Loader for TableAppender {
    type Item = Dataset;

    async fn load(&self, table: &str, item: Dataset) -> Result<usize> {
        log::debug!("Appending {} row(s) to '{}'", item.row_count(), table);
        self.client.append(table, &item).await
    }

    async fn count(&self, table: &str) -> Result<u64> {
        self.client.count_rows(table).await
    }
}
