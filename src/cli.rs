//! CLI helper functions

use crate::{
    client::{BigQueryClient, MySqlClient},
    config::{CsvConfig, DatabaseConfig, WarehouseConfig},
    etl::{FailurePolicy, IdentityTransformer, ItemOutcome, Pipeline, RunReport},
    storage::{CsvDirectory, CsvReader},
    tables::{TableAppender, TableEnumerator, TableExtractor},
    transform::DateStringifier,
    warehouse::WarehouseLoader,
};
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use std::sync::Arc;

/// Replicate every table of the source database into the warehouse
///
/// Pipeline: TableEnumerator → TableExtractor → DateStringifier → WarehouseLoader
///
/// Any failure aborts the run. The database connection is closed whether the
/// run succeeds or not.
pub async fn sync_to_warehouse(
    database: &DatabaseConfig,
    warehouse: &WarehouseConfig,
    batch_rows: usize,
) -> Result<RunReport> {
    log::info!("Connecting to {}", database.to_string().bright_black());
    let source = Arc::new(
        MySqlClient::connect(database)
            .await
            .context("Failed to connect to the source database")?,
    );

    let result = run_warehouse_pipeline(&source, warehouse, batch_rows).await;

    if let Err(e) = source.disconnect().await {
        log::warn!("{}", e);
    }

    let report = result?;
    log_report(&report);
    Ok(report)
}

async fn run_warehouse_pipeline(
    source: &Arc<MySqlClient>,
    warehouse: &WarehouseConfig,
    batch_rows: usize,
) -> Result<RunReport> {
    log::info!(
        "Authenticating to BigQuery project {}",
        warehouse.project_id.bright_black()
    );
    let target = BigQueryClient::connect(warehouse)
        .await
        .context("Failed to connect to the warehouse")?;

    let pipeline = Pipeline::new(
        TableEnumerator::new(source.clone()),
        TableExtractor::new(source.clone()),
        DateStringifier::new(),
        WarehouseLoader::new(target).with_batch_rows(batch_rows),
    )
    .with_policy(FailurePolicy::Abort);

    pipeline.run().await.context("Warehouse sync aborted")
}

/// Append every CSV file of the data directory to its same-named table
///
/// Pipeline: CsvDirectory → CsvReader → IdentityTransformer → TableAppender
///
/// Unparseable files and failed loads are reported and skipped; a failing row
/// count aborts the run.
pub async fn load_csv_directory(database: &DatabaseConfig, csv: &CsvConfig) -> Result<RunReport> {
    log::info!("Connecting to {}", database.to_string().bright_black());
    let client = Arc::new(
        MySqlClient::connect(database)
            .await
            .context("Failed to connect to the destination database")?,
    );

    log::info!(
        "Loading CSV files from {}",
        csv.data_directory.display().bright_black()
    );
    let pipeline = Pipeline::new(
        CsvDirectory::new(&csv.data_directory),
        CsvReader::new(),
        IdentityTransformer::new(),
        TableAppender::new(client.clone()),
    )
    .with_policy(FailurePolicy::Skip);

    let result = pipeline.run().await.context("CSV load aborted");

    if let Err(e) = client.disconnect().await {
        log::warn!("{}", e);
    }

    let report = result?;
    log_report(&report);
    Ok(report)
}

/// Connect to the database (and optionally the warehouse) without moving data
///
/// Returns the number of tables in the database catalog.
pub async fn check_connections(
    database: &DatabaseConfig,
    warehouse: Option<&WarehouseConfig>,
) -> Result<usize> {
    log::info!("Connecting to {}", database.to_string().bright_black());
    let client = MySqlClient::connect(database)
        .await
        .context("Failed to connect to the database")?;
    let tables = client.list_tables().await;
    client.disconnect().await?;
    let tables = tables.context("Failed to read the database catalog")?;
    log::info!("✓ Database reachable, {} table(s)", tables.len());

    if let Some(warehouse) = warehouse {
        let target = BigQueryClient::connect(warehouse)
            .await
            .context("Failed to connect to the warehouse")?;
        log::info!(
            "✓ Warehouse reachable, project {}",
            target.project_id().bright_black()
        );
    }

    Ok(tables.len())
}

fn log_report(report: &RunReport) {
    for item in &report.items {
        match &item.outcome {
            ItemOutcome::Loaded { rows, count } => log::info!(
                "✓ {}: {} row(s) written, {} record(s) in table",
                item.table.cyan(),
                rows,
                count
            ),
            ItemOutcome::LoadFailed { error, count } => log::warn!(
                "✗ {}: load failed ({}), {} record(s) in table",
                item.table.cyan(),
                error,
                count
            ),
            ItemOutcome::Skipped { error } => {
                log::warn!("✗ {}: skipped ({})", item.table.cyan(), error)
            }
        }
    }

    log::info!(
        "Done: {} of {} table(s) loaded, {} row(s) written",
        report.loaded(),
        report.items.len(),
        report.rows_written()
    );
}
