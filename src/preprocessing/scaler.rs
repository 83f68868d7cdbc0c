//! Standard (z-score) feature scaling

use super::f64_column;
use crate::error::{EtaError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Standard scaler: (x - mean) / std, fitted on training data only.
///
/// Fitted parameters are part of the model artifact and are reapplied
/// unchanged at inference time. Transforming a frame that lacks a fitted
/// column is an error rather than a silent skip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    // (column, mean, std) in fit order
    params: Vec<(String, f64, f64)>,
    is_fitted: bool,
}

impl StandardScaler {
    /// Create a new scaler
    pub fn new() -> Self {
        Self {
            params: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the scaler on every column of the frame
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.params.clear();
        for col in df.get_columns() {
            let name = col.name().to_string();
            let ca = f64_column(df, &name)?;
            let mean = ca.mean().unwrap_or(0.0);
            let std = ca.std(1).unwrap_or(1.0);
            let std = if std == 0.0 { 1.0 } else { std };
            self.params.push((name, mean, std));
        }
        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data with the fitted parameters
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(EtaError::ModelNotFitted);
        }

        let mut result = df.clone();
        for (name, mean, std) in &self.params {
            let ca = f64_column(df, name)?;
            let scaled: Float64Chunked = ca
                .into_iter()
                .map(|opt| opt.map(|v| (v - mean) / std))
                .collect();
            let scaled = scaled.with_name(name.as_str().into()).into_series();
            result = result
                .with_column(scaled)
                .map_err(|e| EtaError::DataError(e.to_string()))?
                .clone();
        }
        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Columns the scaler was fitted on, in fit order
    pub fn fitted_columns(&self) -> Vec<&str> {
        self.params.iter().map(|(name, _, _)| name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_mean_is_zero() {
        let df = df!("a" => &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

        let mut scaler = StandardScaler::new();
        let out = scaler.fit_transform(&df).unwrap();

        let ca = out.column("a").unwrap().as_materialized_series().f64().unwrap().clone();
        assert!(ca.mean().unwrap().abs() < 1e-10);
    }

    #[test]
    fn test_train_params_applied_to_test() {
        let train = df!("a" => &[0.0, 10.0]).unwrap();
        let test = df!("a" => &[5.0]).unwrap();

        let mut scaler = StandardScaler::new();
        scaler.fit(&train).unwrap();
        let out = scaler.transform(&test).unwrap();

        let ca = out.column("a").unwrap().as_materialized_series().f64().unwrap().clone();
        // train mean 5, sample std ~7.071
        assert!(ca.get(0).unwrap().abs() < 1e-10);
    }

    #[test]
    fn test_constant_column_keeps_unit_scale() {
        let df = df!("a" => &[3.0, 3.0, 3.0]).unwrap();
        let mut scaler = StandardScaler::new();
        let out = scaler.fit_transform(&df).unwrap();

        let ca = out.column("a").unwrap().as_materialized_series().f64().unwrap().clone();
        for v in ca.into_iter().flatten() {
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn test_transform_missing_column_fails() {
        let train = df!("a" => &[1.0, 2.0]).unwrap();
        let test = df!("b" => &[1.0]).unwrap();

        let mut scaler = StandardScaler::new();
        scaler.fit(&train).unwrap();
        assert!(matches!(
            scaler.transform(&test).unwrap_err(),
            EtaError::MissingColumn(_)
        ));
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let df = df!("a" => &[1.0]).unwrap();
        let scaler = StandardScaler::new();
        assert!(matches!(
            scaler.transform(&df).unwrap_err(),
            EtaError::ModelNotFitted
        ));
    }
}
