//! Date-to-text transformer
//!
//! Converts calendar-date columns to `YYYY-MM-DD` strings ahead of a warehouse load.

use crate::Result;
use crate::dataset::{Dataset, Value, ValueKind};
use crate::etl::Transformer;

/// Transformer that renders date columns as text
///
/// A column is converted when its first value is a calendar date. Timestamps,
/// empty columns and columns starting with any other kind (including null) are
/// left as they are.
///
/// Only dates are rendered. Nulls inside a converted column stay null and are
/// deliberately not turned into `"None"` text, unlike a to-string of every value.
///
/// # Example
/// ```
/// use tableport::etl::Transformer;
/// use tableport::transform::DateStringifier;
/// use tableport::{Column, Dataset, Value};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
/// let input = Dataset::new(vec![Column::new("d", vec![Value::Date(date)])]);
///
/// let output = DateStringifier::new().transform(input).unwrap();
/// assert_eq!(output.columns()[0].values[0], Value::Text("2021-01-01".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DateStringifier;

impl DateStringifier {
    pub fn new() -> Self {
        Self
    }
}

impl Transformer for DateStringifier {
    type Input = Dataset;
    type Output = Dataset;

    fn transform(&self, mut input: Self::Input) -> Result<Self::Output> {
        for column in input.columns_mut() {
            if column.first_kind() != Some(ValueKind::Date) {
                continue;
            }

            log::debug!("Converting date column '{}' to text", column.name);
            for value in column.values.iter_mut() {
                if let Value::Date(date) = *value {
                    *value = Value::Text(date.format("%Y-%m-%d").to_string());
                }
            }
        }

        Ok(input)
    }
}
