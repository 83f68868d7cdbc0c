//! Data preparation: cleaning, feature engineering, scaling, and splitting

pub mod cleaner;
pub mod encoder;
pub mod features;
pub mod scaler;
pub mod split;
pub mod vif;

pub use cleaner::{DataCleaner, REQUIRED_COLUMNS, TARGET_COLUMN};
pub use encoder::OneHotEncoder;
pub use features::{FeatureEngineer, FeatureEngineerConfig};
pub use scaler::StandardScaler;
pub use split::{train_test_split, TrainTestSplit};

use crate::error::{EtaError, Result};
use polars::prelude::*;

/// Fetch a column as Float64 values, casting integers if needed.
pub(crate) fn f64_column(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let column = df
        .column(name)
        .map_err(|_| EtaError::MissingColumn(name.to_string()))?;
    let casted = column
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|e| EtaError::DataError(e.to_string()))?;
    Ok(casted
        .f64()
        .map_err(|e| EtaError::DataError(e.to_string()))?
        .clone())
}

/// Fetch a column as string values.
pub(crate) fn str_column(df: &DataFrame, name: &str) -> Result<StringChunked> {
    let column = df
        .column(name)
        .map_err(|_| EtaError::MissingColumn(name.to_string()))?;
    Ok(column
        .as_materialized_series()
        .str()
        .map_err(|e| EtaError::DataError(e.to_string()))?
        .clone())
}

pub(crate) fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Drop a column if it exists; leave the frame untouched otherwise.
pub(crate) fn drop_if_present(df: DataFrame, name: &str) -> Result<DataFrame> {
    if has_column(&df, name) {
        df.drop(name).map_err(|e| EtaError::DataError(e.to_string()))
    } else {
        Ok(df)
    }
}

/// Replace ±inf in every float column with null.
pub(crate) fn replace_inf_with_null(df: &DataFrame) -> Result<DataFrame> {
    let mut result = df.clone();
    for col in df.get_columns() {
        if col.dtype() != &DataType::Float64 {
            continue;
        }
        let series = col.as_materialized_series();
        let ca = series
            .f64()
            .map_err(|e| EtaError::DataError(e.to_string()))?;
        let cleaned: Float64Chunked = ca
            .into_iter()
            .map(|opt| opt.filter(|v| v.is_finite()))
            .collect();
        let cleaned = cleaned.with_name(series.name().clone()).into_series();
        result = result
            .with_column(cleaned)
            .map_err(|e| EtaError::DataError(e.to_string()))?
            .clone();
    }
    Ok(result)
}

/// Drop every row that still carries a null in any column.
pub(crate) fn drop_incomplete_rows(df: &DataFrame) -> Result<DataFrame> {
    let mut keep = vec![true; df.height()];
    for col in df.get_columns() {
        let is_null = col.as_materialized_series().is_null();
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
