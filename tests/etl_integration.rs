//! Integration tests for both pipelines
//!
//! The database and warehouse are replaced by in-memory stages; CSV files are
//! real files in temporary directories.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tableport::etl::{
    Enumerator, Extractor, FailurePolicy, IdentityTransformer, ItemOutcome, Loader, Pipeline,
};
use tableport::storage::{CsvDirectory, CsvReader};
use tableport::tables::SourceTable;
use tableport::transform::DateStringifier;
use tableport::{Column, Dataset, Error, Result, Value};
use tempfile::TempDir;

/// Source database holding named tables in catalog order
#[derive(Clone, Default)]
struct MemorySource {
    tables: Vec<(String, Dataset)>,
    reads: Arc<Mutex<Vec<String>>>,
}

impl MemorySource {
    fn with_table(mut self, name: &str, data: Dataset) -> Self {
        self.tables.push((name.to_string(), data));
        self
    }
}

impl Enumerator for MemorySource {
    type Item = SourceTable;

    async fn enumerate(&self) -> Result<Vec<SourceTable>> {
        Ok(self
            .tables
            .iter()
            .map(|(name, _)| SourceTable::new(name.clone()))
            .collect())
    }
}

impl Extractor for MemorySource {
    type Source = SourceTable;
    type Item = Dataset;

    async fn extract(&self, source: &SourceTable) -> Result<Dataset> {
        self.reads.lock().unwrap().push(source.name.clone());
        self.tables
            .iter()
            .find(|(name, _)| *name == source.name)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| Error::Query(format!("Table '{}' doesn't exist", source.name)))
    }
}

/// Warehouse that replaces tables on every load
#[derive(Clone, Default)]
struct MemoryWarehouse {
    tables: Arc<Mutex<HashMap<String, Dataset>>>,
    loads: Arc<Mutex<Vec<String>>>,
}

impl Loader for MemoryWarehouse {
    type Item = Dataset;

    async fn load(&self, table: &str, item: Dataset) -> Result<usize> {
        self.loads.lock().unwrap().push(table.to_string());
        let rows = item.row_count();
        self.tables
            .lock()
            .unwrap()
            .insert(format!("acme.raw.{}", table), item);
        Ok(rows)
    }

    async fn count(&self, table: &str) -> Result<u64> {
        self.tables
            .lock()
            .unwrap()
            .get(&format!("acme.raw.{}", table))
            .map(|d| d.row_count() as u64)
            .ok_or_else(|| Error::Load(format!("Not found: Table acme.raw.{}", table)))
    }
}

/// Database that appends rows; tables named in `rejected` refuse writes
#[derive(Clone, Default)]
struct MemoryDatabase {
    rows: Arc<Mutex<HashMap<String, Vec<Vec<Value>>>>>,
    loads: Arc<Mutex<Vec<String>>>,
    rejected: Vec<&'static str>,
}

impl Loader for MemoryDatabase {
    type Item = Dataset;

    async fn load(&self, table: &str, item: Dataset) -> Result<usize> {
        self.loads.lock().unwrap().push(table.to_string());
        if self.rejected.iter().any(|r| *r == table) {
            return Err(Error::Load(format!("Unknown column in '{}'", table)));
        }
        let mut rows = self.rows.lock().unwrap();
        let stored = rows.entry(table.to_string()).or_default();
        for row in item.rows() {
            stored.push(row.into_iter().cloned().collect());
        }
        Ok(item.row_count())
    }

    async fn count(&self, table: &str) -> Result<u64> {
        self.rows
            .lock()
            .unwrap()
            .get(table)
            .map(|r| r.len() as u64)
            .ok_or_else(|| Error::Query(format!("Table '{}' doesn't exist", table)))
    }
}

fn date(y: i32, m: u32, d: u32) -> Value {
    Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn write_csv(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

#[tokio::test]
async fn test_warehouse_round_trip_converts_dates() -> Result<()> {
    let source = MemorySource::default().with_table(
        "T",
        Dataset::new(vec![
            Column::new("id", vec![Value::Int(1)]),
            Column::new("d", vec![date(2021, 1, 1)]),
        ]),
    );
    let warehouse = MemoryWarehouse::default();

    let report = Pipeline::new(
        source.clone(),
        source,
        DateStringifier::new(),
        warehouse.clone(),
    )
    .run()
    .await?;

    assert_eq!(
        report.items[0].outcome,
        ItemOutcome::Loaded { rows: 1, count: 1 }
    );

    let tables = warehouse.tables.lock().unwrap();
    let loaded = &tables["acme.raw.T"];
    assert_eq!(loaded.column("id").unwrap().values, vec![Value::Int(1)]);
    assert_eq!(
        loaded.column("d").unwrap().values,
        vec![Value::Text("2021-01-01".to_string())]
    );
    Ok(())
}

#[tokio::test]
async fn test_warehouse_sync_visits_tables_once_in_catalog_order() -> Result<()> {
    let one = |v: i64| Dataset::new(vec![Column::new("v", vec![Value::Int(v)])]);
    let source = MemorySource::default()
        .with_table("zeta", one(1))
        .with_table("alpha", one(2))
        .with_table("mid", one(3));
    let warehouse = MemoryWarehouse::default();

    Pipeline::new(
        source.clone(),
        source.clone(),
        DateStringifier::new(),
        warehouse.clone(),
    )
    .run()
    .await?;

    assert_eq!(*source.reads.lock().unwrap(), vec!["zeta", "alpha", "mid"]);
    assert_eq!(*warehouse.loads.lock().unwrap(), vec!["zeta", "alpha", "mid"]);
    Ok(())
}

#[tokio::test]
async fn test_warehouse_sync_replaces_on_rerun() -> Result<()> {
    let data = Dataset::new(vec![Column::new("id", vec![Value::Int(1), Value::Int(2)])]);
    let source = MemorySource::default().with_table("orders", data);
    let warehouse = MemoryWarehouse::default();

    for _ in 0..2 {
        let report = Pipeline::new(
            source.clone(),
            source.clone(),
            DateStringifier::new(),
            warehouse.clone(),
        )
        .run()
        .await?;
        assert_eq!(
            report.items[0].outcome,
            ItemOutcome::Loaded { rows: 2, count: 2 }
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_warehouse_sync_aborts_on_extract_failure() {
    // the catalog lists a table the extractor cannot read
    struct Catalog;
    impl Enumerator for Catalog {
        type Item = SourceTable;
        async fn enumerate(&self) -> Result<Vec<SourceTable>> {
            Ok(vec![SourceTable::new("gone"), SourceTable::new("later")])
        }
    }

    let source = MemorySource::default();
    let warehouse = MemoryWarehouse::default();

    let err = Pipeline::new(Catalog, source, DateStringifier::new(), warehouse.clone())
        .with_policy(FailurePolicy::Abort)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Query(_)));
    assert!(warehouse.loads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_csv_load_sorted_by_file_name() -> Result<()> {
    let temp = TempDir::new()?;
    write_csv(temp.path(), "b.csv", "id\n1\n2\n");
    write_csv(temp.path(), "a.csv", "id,name\n1,Ann\n");
    let database = MemoryDatabase::default();

    let report = Pipeline::new(
        CsvDirectory::new(temp.path()),
        CsvReader::new(),
        IdentityTransformer::new(),
        database.clone(),
    )
    .with_policy(FailurePolicy::Skip)
    .run()
    .await?;

    assert_eq!(*database.loads.lock().unwrap(), vec!["a", "b"]);
    assert_eq!(
        report.items[1].outcome,
        ItemOutcome::Loaded { rows: 2, count: 2 }
    );
    Ok(())
}

#[tokio::test]
async fn test_csv_load_empty_directory() -> Result<()> {
    let temp = TempDir::new()?;
    let database = MemoryDatabase::default();

    let report = Pipeline::new(
        CsvDirectory::new(temp.path()),
        CsvReader::new(),
        IdentityTransformer::new(),
        database.clone(),
    )
    .with_policy(FailurePolicy::Skip)
    .run()
    .await?;

    assert!(report.is_empty());
    assert!(database.loads.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_csv_load_skips_bad_file() -> Result<()> {
    let temp = TempDir::new()?;
    write_csv(temp.path(), "bad.csv", "a,b\n1,2\n3,4,5\n");
    write_csv(temp.path(), "good.csv", "a,b\n1,2\n");
    let database = MemoryDatabase::default();

    let report = Pipeline::new(
        CsvDirectory::new(temp.path()),
        CsvReader::new(),
        IdentityTransformer::new(),
        database.clone(),
    )
    .with_policy(FailurePolicy::Skip)
    .run()
    .await?;

    assert!(matches!(
        report.items[0].outcome,
        ItemOutcome::Skipped { .. }
    ));
    assert_eq!(report.loaded(), 1);
    assert_eq!(*database.loads.lock().unwrap(), vec!["good"]);
    Ok(())
}

#[tokio::test]
async fn test_csv_load_appends_on_rerun() -> Result<()> {
    let temp = TempDir::new()?;
    write_csv(temp.path(), "events.csv", "id\n1\n2\n3\n");
    let database = MemoryDatabase::default();

    for expected in [3, 6] {
        let report = Pipeline::new(
            CsvDirectory::new(temp.path()),
            CsvReader::new(),
            IdentityTransformer::new(),
            database.clone(),
        )
        .with_policy(FailurePolicy::Skip)
        .run()
        .await?;
        assert_eq!(
            report.items[0].outcome,
            ItemOutcome::Loaded {
                rows: 3,
                count: expected
            }
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_csv_load_failure_still_counts() -> Result<()> {
    let temp = TempDir::new()?;
    write_csv(temp.path(), "events.csv", "id\n1\n");
    let database = MemoryDatabase {
        rejected: vec!["events"],
        ..Default::default()
    };
    database
        .rows
        .lock()
        .unwrap()
        .insert("events".to_string(), vec![vec![Value::Int(9)]]);

    let report = Pipeline::new(
        CsvDirectory::new(temp.path()),
        CsvReader::new(),
        IdentityTransformer::new(),
        database.clone(),
    )
    .with_policy(FailurePolicy::Skip)
    .run()
    .await?;

    match &report.items[0].outcome {
        ItemOutcome::LoadFailed { error, count } => {
            assert_eq!(*count, 1);
            assert!(error.contains("Unknown column"));
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_csv_load_aborts_when_count_fails() {
    // the load fails and the table never existed, so verification fails
    let temp = TempDir::new().unwrap();
    write_csv(temp.path(), "first.csv", "id\n1\n");
    write_csv(temp.path(), "second.csv", "id\n1\n");
    let database = MemoryDatabase {
        rejected: vec!["first"],
        ..Default::default()
    };

    let err = Pipeline::new(
        CsvDirectory::new(temp.path()),
        CsvReader::new(),
        IdentityTransformer::new(),
        database.clone(),
    )
    .with_policy(FailurePolicy::Skip)
    .run()
    .await
    .unwrap_err();

    assert!(err.to_string().contains("doesn't exist"));
    assert_eq!(*database.loads.lock().unwrap(), vec!["first"]);
}
