//! First stage: preparation time estimation

use super::PredictionBundle;
use crate::error::{EtaError, Result};
use crate::preprocessing::{StandardScaler, TrainTestSplit};
use crate::training::{GradientBoostingConfig, GradientBoostingRegressor, Regressor};
use crate::utils::{column_to_array, dataframe_to_matrix};
use polars::prelude::*;
use tracing::info;

/// Known driving duration column, subtracted from the target and excluded
/// from the model features.
pub const DRIVING_DURATION: &str = "estimated_store_to_consumer_driving_duration";

/// Known order placement duration column, likewise subtracted and excluded.
pub const ORDER_PLACE_DURATION: &str = "estimated_order_place_duration";

/// Predicts kitchen preparation time from engineered features.
///
/// The training target is the actual delivery duration minus the two known
/// logistics durations, floored at zero. Those two columns are removed
/// from the model feature matrix so the stage cannot leak its own
/// subtraction targets. Features are standardized with parameters fitted
/// on the training side only; the fitted scaler, the regressor, and the
/// exact train-time column ordering together form the model artifact.
pub struct PrepTimeEstimator {
    scaler: StandardScaler,
    model: Box<dyn Regressor>,
    feature_columns: Option<Vec<String>>,
}

impl PrepTimeEstimator {
    /// Create an estimator backed by the default gradient boosting model
    pub fn new(seed: u64) -> Self {
        let config = GradientBoostingConfig::default().with_random_state(seed);
        Self::with_model(Box::new(GradientBoostingRegressor::new(config)))
    }

    /// Create an estimator backed by any regressor
    pub fn with_model(model: Box<dyn Regressor>) -> Self {
        Self {
            scaler: StandardScaler::new(),
            model,
            feature_columns: None,
        }
    }

    /// Train on the split's training side and predict preparation time for
    /// the test side, passing through the known logistics durations and the
    /// true totals for downstream combination.
    pub fn run(&mut self, split: &TrainTestSplit) -> Result<PredictionBundle> {
        let driving_train = column_to_array(&split.x_train, DRIVING_DURATION)?;
        let order_place_train = column_to_array(&split.x_train, ORDER_PLACE_DURATION)?;

        if driving_train.len() != split.y_train.len() {
            return Err(EtaError::AlignmentError(format!(
                "feature rows ({}) disagree with target length ({})",
                driving_train.len(),
                split.y_train.len()
            )));
        }

        // prep time cannot be negative
        let prep_time = split
            .y_train
            .iter()
            .zip(driving_train.iter())
            .zip(order_place_train.iter())
            .map(|((y, d), o)| (y - d - o).max(0.0))
            .collect();

        let x_train_model = strip_logistics_columns(&split.x_train)?;
        let x_test_model = strip_logistics_columns(&split.x_test)?;

        self.feature_columns = Some(column_names(&x_train_model));

        self.scaler.fit(&x_train_model)?;
        let x_train_scaled = self.scaler.transform(&x_train_model)?;
        let train_matrix = dataframe_to_matrix(&x_train_scaled)?;

        info!(
            rows = train_matrix.nrows(),
            features = train_matrix.ncols(),
            "fitting preparation time model"
        );
        self.model.fit(&train_matrix, &prep_time)?;

        let prep_time_pred = self.predict(&x_test_model)?;

        Ok(PredictionBundle {
            prep_time_pred,
            driving_duration: column_to_array(&split.x_test, DRIVING_DURATION)?,
            order_place_duration: column_to_array(&split.x_test, ORDER_PLACE_DURATION)?,
            actual_duration: split.y_test.clone(),
        })
    }

    /// Predict preparation time for a feature frame.
    ///
    /// The frame must carry exactly the train-time columns in the same
    /// order; any drift fails loudly rather than silently realigning.
    pub fn predict(&self, features: &DataFrame) -> Result<ndarray::Array1<f64>> {
        let expected = self
            .feature_columns
            .as_ref()
            .ok_or(EtaError::ModelNotFitted)?;
        let actual = column_names(features);
        if &actual != expected {
            return Err(EtaError::SchemaDrift(format!(
                "inference columns {:?} do not match training columns {:?}",
                actual, expected
            )));
        }

        let scaled = self.scaler.transform(features)?;
        let matrix = dataframe_to_matrix(&scaled)?;
        self.model.predict(&matrix)
    }
}

fn strip_logistics_columns(df: &DataFrame) -> Result<DataFrame> {
    let out = df
        .drop(DRIVING_DURATION)
        .map_err(|_| EtaError::MissingColumn(DRIVING_DURATION.to_string()))?;
    out.drop(ORDER_PLACE_DURATION)
        .map_err(|_| EtaError::MissingColumn(ORDER_PLACE_DURATION.to_string()))
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}
