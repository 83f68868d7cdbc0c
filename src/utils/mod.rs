//! Shared utilities: data loading and DataFrame/matrix conversion

pub mod data_loader;

pub use data_loader::DataLoader;

use crate::error::{EtaError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Convert a DataFrame of numeric columns into a dense f64 matrix.
///
/// Column order is preserved. Non-numeric columns are a data error.
pub fn dataframe_to_matrix(df: &DataFrame) -> Result<Array2<f64>> {
    let casted = cast_numeric_to_f64(df)?;
    casted
        .to_ndarray::<Float64Type>(IndexOrder::C)
        .map_err(|e| EtaError::DataError(e.to_string()))
}

/// Convert a single numeric column into a 1-D f64 array.
///
/// Nulls are a data error here: matrix extraction happens after cleaning,
/// so a null at this point signals an upstream contract violation.
pub fn column_to_array(df: &DataFrame, name: &str) -> Result<Array1<f64>> {
    let column = df
        .column(name)
        .map_err(|_| EtaError::MissingColumn(name.to_string()))?;
    let series = column.as_materialized_series();
    let casted = series
        .cast(&DataType::Float64)
        .map_err(|e| EtaError::DataError(e.to_string()))?;
    let ca = casted.f64().map_err(|e| EtaError::DataError(e.to_string()))?;

    let values: Vec<f64> = ca
        .into_iter()
        .map(|opt| {
            opt.ok_or_else(|| {
                EtaError::DataError(format!("null value in column {name} after cleaning"))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Array1::from_vec(values))
}

/// Cast all integer and Float32 columns to Float64 for consistent processing.
pub fn cast_numeric_to_f64(df: &DataFrame) -> Result<DataFrame> {
    let mut result = df.clone();
    for col in df.get_columns() {
        match col.dtype() {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32 => {
                let casted = col
                    .cast(&DataType::Float64)
                    .map_err(|e| EtaError::DataError(e.to_string()))?;
                result = result
                    .with_column(casted)
                    .map_err(|e| EtaError::DataError(e.to_string()))?
                    .clone();
            }
            _ => {}
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataframe_to_matrix() {
        let df = df!(
            "a" => &[1.0, 2.0, 3.0],
            "b" => &[4i64, 5, 6]
        )
        .unwrap();

        let m = dataframe_to_matrix(&df).unwrap();
        assert_eq!(m.nrows(), 3);
        assert_eq!(m.ncols(), 2);
        assert_eq!(m[[0, 0]], 1.0);
        assert_eq!(m[[2, 1]], 6.0);
    }

    #[test]
    fn test_column_to_array() {
        let df = df!("x" => &[10.0, 20.0]).unwrap();
        let a = column_to_array(&df, "x").unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a[1], 20.0);
    }

    #[test]
    fn test_column_to_array_missing() {
        let df = df!("x" => &[1.0]).unwrap();
        let err = column_to_array(&df, "y").unwrap_err();
        assert!(matches!(err, EtaError::MissingColumn(_)));
    }
}
