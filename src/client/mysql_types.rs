//! Conversions between MySQL wire values and dataset values, plus the SQL text
//! the MySQL client issues

use crate::dataset::{Dataset, Value, ValueKind};
use chrono::{Datelike, NaiveDate, Timelike};
use mysql_async::Value as MySqlValue;
use mysql_async::consts::ColumnType;

/// Character set number MySQL reports for binary data
const BINARY_CHARSET: u16 = 63;

/// Quote an identifier with backticks
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Whether a column carries raw bytes rather than text
pub fn is_binary_column(column_type: ColumnType, character_set: u16) -> bool {
    character_set == BINARY_CHARSET
        && matches!(
            column_type,
            ColumnType::MYSQL_TYPE_STRING
                | ColumnType::MYSQL_TYPE_VAR_STRING
                | ColumnType::MYSQL_TYPE_VARCHAR
                | ColumnType::MYSQL_TYPE_TINY_BLOB
                | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
                | ColumnType::MYSQL_TYPE_LONG_BLOB
                | ColumnType::MYSQL_TYPE_BLOB
        )
}

/// Convert a value read through the binary protocol
pub fn from_mysql_value(value: MySqlValue, column_type: ColumnType, binary: bool) -> Value {
    match value {
        MySqlValue::NULL => Value::Null,
        MySqlValue::Int(i) => Value::Int(i),
        MySqlValue::UInt(u) => Value::UInt(u),
        MySqlValue::Float(f) => Value::Float(f as f64),
        MySqlValue::Double(d) => Value::Float(d),
        MySqlValue::Date(year, month, day, hour, minute, second, micros) => {
            let is_date = matches!(
                column_type,
                ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE
            );
            let Some(date) = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
            else {
                // zero dates such as 0000-00-00 have no calendar equivalent
                return Value::Text(if is_date {
                    format!("{:04}-{:02}-{:02}", year, month, day)
                } else {
                    format!(
                        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                        year, month, day, hour, minute, second
                    )
                });
            };
            if is_date {
                return Value::Date(date);
            }
            date.and_hms_micro_opt(hour as u32, minute as u32, second as u32, micros)
                .map_or(Value::Null, Value::DateTime)
        }
        MySqlValue::Time(negative, days, hours, minutes, seconds, micros) => {
            let sign = if negative { "-" } else { "" };
            let hours = days * 24 + hours as u32;
            let mut text = format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, seconds);
            if micros > 0 {
                text.push_str(&format!(".{:06}", micros));
            }
            Value::Text(text)
        }
        MySqlValue::Bytes(bytes) => match column_type {
            ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => {
                Value::Decimal(String::from_utf8_lossy(&bytes).into_owned())
            }
            ColumnType::MYSQL_TYPE_BIT => {
                Value::UInt(bytes.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64))
            }
            _ if binary => Value::Bytes(bytes),
            _ => Value::Text(String::from_utf8_lossy(&bytes).into_owned()),
        },
    }
}

/// Convert a dataset value into a statement parameter
pub fn to_mysql_value(value: &Value) -> MySqlValue {
    match value {
        Value::Null => MySqlValue::NULL,
        Value::Bool(b) => MySqlValue::Int(*b as i64),
        Value::Int(i) => MySqlValue::Int(*i),
        Value::UInt(u) => MySqlValue::UInt(*u),
        Value::Float(f) => MySqlValue::Double(*f),
        Value::Decimal(s) | Value::Text(s) => MySqlValue::Bytes(s.as_bytes().to_vec()),
        Value::Bytes(b) => MySqlValue::Bytes(b.clone()),
        Value::Date(d) => {
            MySqlValue::Date(d.year() as u16, d.month() as u8, d.day() as u8, 0, 0, 0, 0)
        }
        Value::DateTime(dt) => MySqlValue::Date(
            dt.year() as u16,
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second() as u8,
            dt.nanosecond() / 1_000,
        ),
    }
}

/// MySQL column type used when a missing table is created
pub fn column_type_for(kind: Option<ValueKind>) -> &'static str {
    match kind {
        Some(ValueKind::Bool) => "BOOLEAN",
        Some(ValueKind::Int) => "BIGINT",
        Some(ValueKind::UInt) => "BIGINT UNSIGNED",
        Some(ValueKind::Float) => "DOUBLE",
        Some(ValueKind::Decimal) => "DECIMAL(65,30)",
        Some(ValueKind::Bytes) => "LONGBLOB",
        Some(ValueKind::Date) => "DATE",
        Some(ValueKind::DateTime) => "DATETIME(6)",
        Some(ValueKind::Text) | Some(ValueKind::Null) | None => "TEXT",
    }
}

/// `CREATE TABLE IF NOT EXISTS` statement matching the dataset's columns
pub fn create_table_sql(table: &str, dataset: &Dataset) -> String {
    let columns = dataset
        .columns()
        .iter()
        .map(|c| format!("{} {}", quote_identifier(&c.name), column_type_for(c.kind())))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_identifier(table),
        columns
    )
}

/// Parameterized single-row `INSERT` statement for the dataset's columns
pub fn insert_sql(table: &str, dataset: &Dataset) -> String {
    let names = dataset
        .column_names()
        .map(quote_identifier)
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; dataset.columns().len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table),
        names,
        placeholders
    )
}
