//! Raw record validation and filtering

use super::{drop_incomplete_rows, f64_column, has_column, replace_inf_with_null, str_column};
use crate::error::{EtaError, Result};
use chrono::NaiveDateTime;
use polars::prelude::*;
use tracing::info;

/// Name of the derived ground-truth column, in seconds.
pub const TARGET_COLUMN: &str = "actual_total_delivery_duration";

/// Timestamp format of the raw export.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Columns that must be present and non-null for a record to survive.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "created_at",
    "actual_delivery_time",
    "subtotal",
    "min_item_price",
    "max_item_price",
    "total_onshift_dashers",
    "total_busy_dashers",
    "total_outstanding_orders",
];

/// Numeric columns that must be strictly positive counts/amounts.
const POSITIVE_COLUMNS: [&str; 6] = [
    "subtotal",
    "min_item_price",
    "max_item_price",
    "total_onshift_dashers",
    "total_busy_dashers",
    "total_outstanding_orders",
];

/// Validates and filters raw delivery records and derives the target
/// duration column.
///
/// Pure filter: invalid records are dropped, never rewritten. An entirely
/// missing required column is a fatal schema error, not a filtering case.
#[derive(Debug, Default, Clone)]
pub struct DataCleaner;

impl DataCleaner {
    pub fn new() -> Self {
        Self
    }

    pub fn clean(&self, df: &DataFrame) -> Result<DataFrame> {
        for col in REQUIRED_COLUMNS {
            if !has_column(df, col) {
                return Err(EtaError::MissingColumn(col.to_string()));
            }
        }

        let rows_in = df.height();

        let mut result = self.drop_null_required(df)?;
        result = self.drop_non_positive(&result)?;
        result = self.derive_target(&result)?;
        result = replace_inf_with_null(&result)?;
        result = drop_incomplete_rows(&result)?;

        info!(
            rows_in,
            rows_out = result.height(),
            dropped = rows_in - result.height(),
            "data cleaning finished"
        );
        Ok(result)
    }

    /// Drop rows with a null in any required field.
    fn drop_null_required(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut keep = vec![true; df.height()];
        for name in REQUIRED_COLUMNS {
            let column = df
                .column(name)
                .map_err(|_| EtaError::MissingColumn(name.to_string()))?;
            let is_null = column.as_materialized_series().is_null();
            for (i, null) in is_null.into_iter().enumerate() {
                if null.unwrap_or(true) {
                    keep[i] = false;
                }
            }
        }
        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        df.filter(&mask)
            .map_err(|e| EtaError::DataError(e.to_string()))
    }

    /// Drop rows where any positivity-constrained column is <= 0.
    fn drop_non_positive(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut keep = vec![true; df.height()];
        for name in POSITIVE_COLUMNS {
            let ca = f64_column(df, name)?;
            for (i, opt) in ca.into_iter().enumerate() {
                if !matches!(opt, Some(v) if v > 0.0) {
                    keep[i] = false;
                }
            }
        }
        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        df.filter(&mask)
            .map_err(|e| EtaError::DataError(e.to_string()))
    }

    /// Parse both timestamps, derive the target duration in seconds, and
    /// drop rows that are unparseable or have a non-positive duration.
    fn derive_target(&self, df: &DataFrame) -> Result<DataFrame> {
        let created = str_column(df, "created_at")?;
        let delivered = str_column(df, "actual_delivery_time")?;

        let durations: Vec<Option<f64>> = created
            .into_iter()
            .zip(delivered.into_iter())
            .map(|(c, d)| {
                let c = parse_timestamp(c?)?;
                let d = parse_timestamp(d?)?;
                Some((d - c) as f64)
            })
            .collect();

        let keep: Vec<bool> = durations
            .iter()
            .map(|opt| matches!(opt, Some(v) if *v > 0.0))
            .collect();

        let target: Float64Chunked = durations.into_iter().collect();
        let target = target.with_name(TARGET_COLUMN.into()).into_series();

        let mut result = df.clone();
        result = result
            .with_column(target)
            .map_err(|e| EtaError::DataError(e.to_string()))?
            .clone();

        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        result
            .filter(&mask)
            .map_err(|e| EtaError::DataError(e.to_string()))
    }
}

/// Parse a timestamp to epoch seconds; `None` for unparseable values.
fn parse_timestamp(value: &str) -> Option<i64> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}
