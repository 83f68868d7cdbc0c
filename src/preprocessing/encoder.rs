//! One-hot encoding for categorical columns

use crate::error::{EtaError, Result};
use polars::prelude::*;
use std::collections::BTreeSet;

/// One-hot encoder with per-column indicator prefixes.
///
/// Categories are collected at fit time and sorted, so indicator column
/// order is deterministic for a given dataset. Null cells produce an
/// all-zero indicator row rather than a dedicated missing category.
#[derive(Debug, Clone, Default)]
pub struct OneHotEncoder {
    // (source column, indicator prefix, sorted categories)
    mappings: Vec<(String, String, Vec<String>)>,
    is_fitted: bool,
}

impl OneHotEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self {
            mappings: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the encoder on `(column, prefix)` pairs
    pub fn fit(&mut self, df: &DataFrame, columns: &[(&str, &str)]) -> Result<&mut Self> {
        self.mappings.clear();
        for (col, prefix) in columns {
            let values = string_values(df, col)?;
            let categories: Vec<String> = values
                .iter()
                .flatten()
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            self.mappings
                .push((col.to_string(), prefix.to_string(), categories));
        }
        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data: add one indicator column per category, then
    /// drop the source column.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(EtaError::ModelNotFitted);
        }

        let mut result = df.clone();
        for (col, prefix, categories) in &self.mappings {
            let values = string_values(&result, col)?;

            for category in categories {
                let name = format!("{prefix}_{category}");
                let indicators: Vec<i32> = values
                    .iter()
                    .map(|v| (v.as_deref() == Some(category.as_str())) as i32)
                    .collect();
                let series = Series::new(name.into(), indicators);
                result = result
                    .with_column(series)
                    .map_err(|e| EtaError::DataError(e.to_string()))?
                    .clone();
            }

            result = result
                .drop(col)
                .map_err(|e| EtaError::DataError(e.to_string()))?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[(&str, &str)]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Indicator column names produced for a fitted source column
    pub fn indicator_names(&self, column: &str) -> Option<Vec<String>> {
        self.mappings
            .iter()
            .find(|(col, _, _)| col == column)
            .map(|(_, prefix, cats)| cats.iter().map(|c| format!("{prefix}_{c}")).collect())
    }
}

/// Read a column's values as strings. Numeric columns (e.g. protocol
/// identifiers) are cast through Int64 so indicators get integer suffixes.
fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| EtaError::MissingColumn(name.to_string()))?;
    let series = column.as_materialized_series();

    match series.dtype() {
        DataType::String => {
            let ca = series
                .str()
                .map_err(|e| EtaError::DataError(e.to_string()))?;
            Ok(ca.into_iter().map(|v| v.map(str::to_string)).collect())
        }
        _ => {
            let casted = series
                .cast(&DataType::Int64)
                .map_err(|e| EtaError::DataError(e.to_string()))?;
            let ca = casted
                .i64()
                .map_err(|e| EtaError::DataError(e.to_string()))?;
            Ok(ca.into_iter().map(|v| v.map(|x| x.to_string())).collect())
        }
    }
}
