//! Source table enumeration and extraction
//!
//! Lists the tables of the source schema via information_schema and reads each
//! one wholesale with `SELECT *`.

use crate::client::MySqlClient;
use crate::dataset::Dataset;
use crate::etl::{Enumerator, Extractor, WorkItem};
use crate::Result;
use std::sync::Arc;

/// A table of the source database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTable {
    pub name: String,
}

impl SourceTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl WorkItem for SourceTable {
    fn table_name(&self) -> &str {
        &self.name
    }
}

/// Enumerator for the tables of the connected database
///
/// Tables come back in the order the catalog reports them; no sorting is applied.
pub struct TableEnumerator {
    client: Arc<MySqlClient>,
}

impl TableEnumerator {
    pub fn new(client: Arc<MySqlClient>) -> Self {
        Self { client }
    }
}

impl Enumerator for TableEnumerator {
    type Item = SourceTable;

    async fn enumerate(&self) -> Result<Vec<Self::Item>> {
        let tables = self.client.list_tables().await?;
        log::info!(
            "Found {} table(s) in schema '{}'",
            tables.len(),
            self.client.database()
        );
        Ok(tables.into_iter().map(SourceTable::new).collect())
    }
}

/// Extractor that reads a whole source table into memory
pub struct TableExtractor {
    client: Arc<MySqlClient>,
}

impl TableExtractor {
    pub fn new(client: Arc<MySqlClient>) -> Self {
        Self { client }
    }
}

impl Extractor for TableExtractor {
    type Source = SourceTable;
    type Item = Dataset;

    async fn extract(&self, source: &SourceTable) -> Result<Dataset> {
        let dataset = self.client.fetch_table(&source.name).await?;
        log::info!(
            "Exported {} row(s) from table '{}'",
            dataset.row_count(),
            source.name
        );
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_table_is_its_own_destination() {
        let table = SourceTable::new("orders");
        assert_eq!(table.table_name(), "orders");
    }
}
