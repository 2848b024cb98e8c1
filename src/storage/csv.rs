//! CSV directory storage
//!
//! Lists the CSV files of a directory and parses them into datasets, inferring
//! a scalar kind per column.

use crate::dataset::{Column, Dataset, Value};
use crate::etl::{Enumerator, Extractor, WorkItem};
use crate::{Error, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Cell contents read as missing values
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const TRUE_VALUES: &[&str] = &["True", "TRUE", "true"];
const FALSE_VALUES: &[&str] = &["False", "FALSE", "false"];

/// A CSV file and the table it loads into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFile {
    pub path: PathBuf,
    /// File name without its extension
    pub table: String,
}

impl CsvFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let table = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, table }
    }
}

impl WorkItem for CsvFile {
    fn table_name(&self) -> &str {
        &self.table
    }
}

/// Enumerate the `*.csv` files directly inside a directory
pub struct CsvDirectory {
    path: PathBuf,
}

impl CsvDirectory {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// List CSV files sorted by file name
    ///
    /// A missing directory yields an empty list.
    pub fn list(&self) -> Result<Vec<CsvFile>> {
        if !self.path.exists() {
            log::warn!("Data directory {} does not exist", self.path.display());
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&self.path)? {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("csv") {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        Ok(paths.into_iter().map(CsvFile::new).collect())
    }
}

impl Enumerator for CsvDirectory {
    type Item = CsvFile;

    async fn enumerate(&self) -> Result<Vec<Self::Item>> {
        let files = self.list()?;
        for file in &files {
            log::info!("Dataset found for table '{}'", file.table);
        }
        Ok(files)
    }
}

/// Parse whole CSV files into datasets
///
/// The first record is the header. Every column gets one kind: integer, float,
/// boolean or text, whichever fits all of its non-missing cells first.
#[derive(Debug, Clone, Default)]
pub struct CsvReader;

impl CsvReader {
    pub fn new() -> Self {
        Self
    }

    /// Read and parse `path`
    ///
    /// # Errors
    /// Returns [`Error::Parse`] if the file cannot be read, has no header, has
    /// rows of differing length, or is not valid UTF-8
    pub fn read(&self, path: impl AsRef<Path>) -> Result<Dataset> {
        let path = path.as_ref();
        let parse_error = |e: csv::Error| Error::Parse(format!("{}: {}", path.display(), e));

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(parse_error)?;

        let headers = reader.headers().map_err(parse_error)?.clone();
        if headers.is_empty() {
            return Err(Error::Parse(format!(
                "{}: no columns to parse",
                path.display()
            )));
        }
        let names = header_names(headers.iter());

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); names.len()];
        for record in reader.records() {
            let record = record.map_err(parse_error)?;
            for (column, field) in cells.iter_mut().zip(record.iter()) {
                column.push(field.to_string());
            }
        }

        Ok(Dataset::new(
            names
                .into_iter()
                .zip(cells)
                .map(|(name, cells)| infer_column(name, cells))
                .collect(),
        ))
    }
}

impl Extractor for CsvReader {
    type Source = CsvFile;
    type Item = Dataset;

    async fn extract(&self, source: &CsvFile) -> Result<Dataset> {
        let dataset = self.read(&source.path)?;
        log::debug!(
            "Parsed {} row(s) x {} column(s) from {}",
            dataset.row_count(),
            dataset.columns().len(),
            source.path.display()
        );
        Ok(dataset)
    }
}

/// Name blank headers `Unnamed: {index}` and suffix duplicates with `.1`, `.2`, ...
fn header_names<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for (index, header) in headers.enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {}", index)
        } else {
            header.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        seen.insert(name.clone());
        names.push(name);
    }

    names
}

fn is_na(cell: &str) -> bool {
    NA_VALUES.contains(&cell)
}

fn parse_bool(cell: &str) -> Option<bool> {
    if TRUE_VALUES.contains(&cell) {
        Some(true)
    } else if FALSE_VALUES.contains(&cell) {
        Some(false)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Inferred {
    Int,
    Float,
    Bool,
    Text,
}

fn infer_kind(cells: &[String]) -> Inferred {
    let present: Vec<&str> = cells
        .iter()
        .map(String::as_str)
        .filter(|c| !is_na(c))
        .collect();

    if present.is_empty() {
        Inferred::Text
    } else if present.iter().all(|c| c.trim().parse::<i64>().is_ok()) {
        Inferred::Int
    } else if present.iter().all(|c| c.trim().parse::<f64>().is_ok()) {
        Inferred::Float
    } else if present.iter().all(|c| parse_bool(c.trim()).is_some()) {
        Inferred::Bool
    } else {
        Inferred::Text
    }
}

fn infer_column(name: String, cells: Vec<String>) -> Column {
    let kind = infer_kind(&cells);
    let values = cells
        .into_iter()
        .map(|cell| {
            if is_na(&cell) {
                return Value::Null;
            }
            match kind {
                Inferred::Int => cell.trim().parse().map_or(Value::Null, Value::Int),
                Inferred::Float => cell.trim().parse().map_or(Value::Null, Value::Float),
                Inferred::Bool => parse_bool(cell.trim()).map_or(Value::Null, Value::Bool),
                Inferred::Text => Value::Text(cell),
            }
        })
        .collect();
    Column::new(name, values)
}
