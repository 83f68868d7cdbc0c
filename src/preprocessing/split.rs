//! Randomized train/test holdout split

use super::has_column;
use crate::error::{EtaError, Result};
use crate::utils::column_to_array;
use ndarray::Array1;
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// Feature/target frames for the two sides of a holdout split
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: DataFrame,
    pub x_test: DataFrame,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}

/// Shuffle rows with a seeded RNG and carve off `test_size` of them as the
/// held-out side. The target column is separated from the features.
pub fn train_test_split(
    df: &DataFrame,
    target: &str,
    test_size: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    if !(0.0..1.0).contains(&test_size) || test_size == 0.0 {
        return Err(EtaError::ValidationError(format!(
            "test_size must be in (0, 1), got {test_size}"
        )));
    }
    if !has_column(df, target) {
        return Err(EtaError::MissingColumn(target.to_string()));
    }

    let n_samples = df.height();
    let n_test = ((n_samples as f64) * test_size).ceil() as usize;
    let n_train = n_samples.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(EtaError::ValidationError(format!(
            "cannot split {n_samples} rows into non-empty train and test sides"
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut indices: Vec<u32> = (0..n_samples as u32).collect();
    indices.shuffle(&mut rng);

    let test_idx = IdxCa::from_vec("idx".into(), indices[..n_test].to_vec());
    let train_idx = IdxCa::from_vec("idx".into(), indices[n_test..].to_vec());

    let train_df = df
        .take(&train_idx)
        .map_err(|e| EtaError::DataError(e.to_string()))?;
    let test_df = df
        .take(&test_idx)
        .map_err(|e| EtaError::DataError(e.to_string()))?;

    let y_train = column_to_array(&train_df, target)?;
    let y_test = column_to_array(&test_df, target)?;

    let x_train = train_df
        .drop(target)
        .map_err(|e| EtaError::DataError(e.to_string()))?;
    let x_test = test_df
        .drop(target)
        .map_err(|e| EtaError::DataError(e.to_string()))?;

    info!(
        train = x_train.height(),
        test = x_test.height(),
        "train/test split finished"
    );

    Ok(TrainTestSplit {
        x_train,
        x_test,
        y_train,
        y_test,
    })
}
