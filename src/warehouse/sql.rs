//! GoogleSQL rendering for full-table replacement
//!
//! Tables are replaced with `CREATE OR REPLACE TABLE` and filled with
//! multi-row `INSERT ... VALUES` statements built from literal values.

use crate::dataset::{Column, Dataset, Value, ValueKind};
use base64::Engine;

/// Upper bound on the SQL text of one INSERT statement (the API limit is 1 MB)
pub const MAX_STATEMENT_BYTES: usize = 900_000;

/// Quote an identifier or dotted path with backticks
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
}

/// BigQuery column type for a column kind
pub fn bigquery_type(kind: Option<ValueKind>) -> &'static str {
    match kind {
        Some(ValueKind::Bool) => "BOOL",
        Some(ValueKind::Int) | Some(ValueKind::UInt) => "INT64",
        Some(ValueKind::Float) => "FLOAT64",
        Some(ValueKind::Decimal) => "NUMERIC",
        Some(ValueKind::Bytes) => "BYTES",
        Some(ValueKind::Date) => "DATE",
        Some(ValueKind::DateTime) => "DATETIME",
        Some(ValueKind::Text) | Some(ValueKind::Null) | None => "STRING",
    }
}

/// Kind a column is stored as in the warehouse
///
/// A column whose non-null values do not all share one kind (for example a
/// zero date read as text followed by real dates) is stored as text.
pub fn column_kind(column: &Column) -> Option<ValueKind> {
    let kind = column.kind()?;
    if column.values.iter().all(|v| v.is_null() || v.kind() == kind) {
        Some(kind)
    } else {
        Some(ValueKind::Text)
    }
}

/// Quote and escape a string literal
pub fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Render a value as a SQL literal
pub fn literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Int(i) => i.to_string(),
        Value::UInt(u) => u.to_string(),
        Value::Float(f) if f.is_nan() => "CAST('NaN' AS FLOAT64)".to_string(),
        Value::Float(f) if f.is_infinite() && *f > 0.0 => "CAST('inf' AS FLOAT64)".to_string(),
        Value::Float(f) if f.is_infinite() => "CAST('-inf' AS FLOAT64)".to_string(),
        Value::Float(f) => format!("{:?}", f),
        Value::Decimal(s) => format!("NUMERIC {}", string_literal(s)),
        Value::Text(s) => string_literal(s),
        Value::Bytes(b) => format!(
            "FROM_BASE64('{}')",
            base64::engine::general_purpose::STANDARD.encode(b)
        ),
        Value::Date(d) => format!("DATE '{}'", d.format("%Y-%m-%d")),
        Value::DateTime(dt) => format!("DATETIME '{}'", dt.format("%Y-%m-%d %H:%M:%S%.6f")),
    }
}

/// Render a value as a literal of the column's stored kind
fn column_literal(value: &Value, kind: Option<ValueKind>) -> String {
    match value {
        Value::Null | Value::Text(_) => literal(value),
        _ if kind == Some(ValueKind::Text) => string_literal(&value.to_string()),
        _ => literal(value),
    }
}

/// `CREATE OR REPLACE TABLE` statement with a schema inferred from the dataset
pub fn create_or_replace_sql(path: &str, dataset: &Dataset) -> String {
    let columns = dataset
        .columns()
        .iter()
        .map(|c| format!("{} {}", quote_identifier(&c.name), bigquery_type(column_kind(c))))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE OR REPLACE TABLE {} ({})", path, columns)
}

/// Multi-row INSERT statements covering every row of the dataset
///
/// Each statement holds at most `max_rows` rows and stays below
/// [`MAX_STATEMENT_BYTES`] unless a single row is larger on its own.
pub fn insert_statements(path: &str, dataset: &Dataset, max_rows: usize) -> Vec<String> {
    let max_rows = max_rows.max(1);
    let header = format!(
        "INSERT INTO {} ({}) VALUES ",
        path,
        dataset
            .column_names()
            .map(quote_identifier)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let kinds: Vec<Option<ValueKind>> = dataset.columns().iter().map(column_kind).collect();

    let mut statements = Vec::new();
    let mut current = header.clone();
    let mut rows_in_current = 0;

    for row in dataset.rows() {
        let tuple = format!(
            "({})",
            row.into_iter()
                .zip(&kinds)
                .map(|(value, kind)| column_literal(value, *kind))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let full = rows_in_current == max_rows
            || (rows_in_current > 0 && current.len() + tuple.len() + 2 > MAX_STATEMENT_BYTES);
        if full {
            statements.push(std::mem::replace(&mut current, header.clone()));
            rows_in_current = 0;
        }

        if rows_in_current > 0 {
            current.push_str(", ");
        }
        current.push_str(&tuple);
        rows_in_current += 1;
    }

    if rows_in_current > 0 {
        statements.push(current);
    }

    statements
}
