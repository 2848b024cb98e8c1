//! MySQL client module
//!
//! Provides `MySqlClient`, a single connection shared by every stage of a run.

use super::mysql_types::{
    create_table_sql, from_mysql_value, insert_sql, is_binary_column, quote_identifier,
    to_mysql_value,
};
use crate::config::DatabaseConfig;
use crate::dataset::{Column, Dataset, Value};
use crate::{Error, Result};
use mysql_async::prelude::*;
use mysql_async::{Conn, OptsBuilder, Row, TxOpts};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

const CATALOG_QUERY: &str =
    "SELECT table_name FROM information_schema.tables WHERE table_schema = ?";

/// MySQL client holding exactly one connection
///
/// The connection is opened by [`MySqlClient::connect`] and released by
/// [`MySqlClient::disconnect`]. It is shared through `&self` so that the
/// enumerator, extractor and loader of a pipeline can hold the same client;
/// calls are serialized by an async mutex.
///
/// # Example
/// ```no_run
/// use tableport::client::MySqlClient;
/// use tableport::config::DatabaseConfig;
///
/// # async fn example() -> tableport::Result<()> {
/// let config = DatabaseConfig::from_env()?;
/// let client = MySqlClient::connect(&config).await?;
/// let tables = client.list_tables().await?;
/// client.disconnect().await?;
/// # Ok(())
/// # }
/// ```
pub struct MySqlClient {
    conn: Mutex<Option<Conn>>,
    database: String,
}

impl MySqlClient {
    /// Open a connection to the configured database
    ///
    /// # Errors
    /// Returns [`Error::Connection`] if the server is unreachable or rejects the credentials
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        log::debug!("Connecting to {}", config);

        let opts = OptsBuilder::default()
            .ip_or_hostname(config.host.clone())
            .tcp_port(config.port)
            .user(Some(config.user.clone()))
            .pass(Some(config.password.clone()))
            .db_name(Some(config.database.clone()));

        let conn = Conn::new(opts)
            .await
            .map_err(|e| Error::Connection(format!("Failed to connect to {}: {}", config, e)))?;

        Ok(Self {
            conn: Mutex::new(Some(conn)),
            database: config.database.clone(),
        })
    }

    /// Name of the database this client is connected to
    pub fn database(&self) -> &str {
        &self.database
    }

    async fn conn(&self) -> Result<MappedMutexGuard<'_, Conn>> {
        let guard = self.conn.lock().await;
        MutexGuard::try_map(guard, Option::as_mut)
            .map_err(|_| Error::Connection("connection already closed".to_string()))
    }

    /// List the tables of the connected database, in the order the catalog returns them
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let mut conn = self.conn().await?;
        let tables: Vec<String> = conn
            .exec(CATALOG_QUERY, (self.database.as_str(),))
            .await
            .map_err(|e| Error::Query(format!("Catalog query failed: {}", e)))?;
        Ok(tables)
    }

    /// Read every row of `table` into memory
    ///
    /// Uses the binary protocol so that dates, numbers and binary data keep
    /// their types.
    pub async fn fetch_table(&self, table: &str) -> Result<Dataset> {
        let sql = format!("SELECT * FROM {}", quote_identifier(table));
        log::debug!("{}", sql);

        let mut conn = self.conn().await?;
        let query_error = |e: mysql_async::Error| {
            Error::Query(format!("Failed to read table '{}': {}", table, e))
        };

        let mut result = conn.exec_iter(sql, ()).await.map_err(query_error)?;
        let columns = result.columns_ref().to_vec();
        let rows: Vec<Row> = result.collect().await.map_err(query_error)?;
        drop(result);

        let mut data: Vec<Column> = columns
            .iter()
            .map(|c| Column::new(c.name_str(), Vec::with_capacity(rows.len())))
            .collect();

        for mut row in rows {
            for (index, (meta, column)) in columns.iter().zip(data.iter_mut()).enumerate() {
                let binary = is_binary_column(meta.column_type(), meta.character_set());
                let value = row
                    .take::<mysql_async::Value, _>(index)
                    .map_or(Value::Null, |v| from_mysql_value(v, meta.column_type(), binary));
                column.values.push(value);
            }
        }

        Ok(Dataset::new(data))
    }

    /// Append every row of `dataset` to `table` in one transaction
    ///
    /// The table is created from the dataset's column kinds if it does not exist.
    /// Returns the number of rows written.
    pub async fn append(&self, table: &str, dataset: &Dataset) -> Result<usize> {
        if dataset.columns().is_empty() {
            return Ok(0);
        }

        let load_error =
            |e: mysql_async::Error| Error::Load(format!("Failed to append to '{}': {}", table, e));

        let mut conn = self.conn().await?;

        // DDL commits implicitly, so it runs before the transaction starts
        let ddl = create_table_sql(table, dataset);
        log::debug!("{}", ddl);
        conn.query_drop(ddl).await.map_err(load_error)?;

        if dataset.is_empty() {
            return Ok(0);
        }

        let insert = insert_sql(table, dataset);
        log::debug!("{} ({} row(s))", insert, dataset.row_count());

        let params: Vec<Vec<mysql_async::Value>> = dataset
            .rows()
            .map(|row| row.into_iter().map(to_mysql_value).collect())
            .collect();

        let mut tx = conn
            .start_transaction(TxOpts::default())
            .await
            .map_err(load_error)?;
        tx.exec_batch(insert, params).await.map_err(load_error)?;
        tx.commit().await.map_err(load_error)?;

        Ok(dataset.row_count())
    }

    /// `SELECT COUNT(*)` against `table`
    pub async fn count_rows(&self, table: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
        let mut conn = self.conn().await?;
        let count: Option<u64> = conn
            .query_first(sql)
            .await
            .map_err(|e| Error::Query(format!("Failed to count rows in '{}': {}", table, e)))?;
        Ok(count.unwrap_or(0))
    }

    /// Close the connection; later calls fail with [`Error::Connection`]
    pub async fn disconnect(&self) -> Result<()> {
        let conn = self.conn.lock().await.take();
        if let Some(conn) = conn {
            log::debug!("Closing connection to '{}'", self.database);
            conn.disconnect()
                .await
                .map_err(|e| Error::Connection(format!("Failed to close connection: {}", e)))?;
        }
        Ok(())
    }
}
