//! Fixed-order orchestration of the training pipeline

use crate::error::Result;
use crate::evaluation::{evaluate, RegressionMetrics};
use crate::preprocessing::{
    train_test_split, DataCleaner, FeatureEngineer, FeatureEngineerConfig, TARGET_COLUMN,
};
use crate::stages::{combine_durations, FinalEnsembleRegressor, PrepTimeEstimator};
use ndarray::Array1;
use polars::prelude::DataFrame;
use tracing::info;

/// Pipeline-level configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Held-out fraction of the outer split
    pub test_size: f64,
    /// Seed for every randomized stage
    pub seed: u64,
    /// Maximum tolerated variance inflation factor
    pub vif_threshold: f64,
    /// Columns dropped unconditionally before VIF filtering
    pub collinear_drop: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let features = FeatureEngineerConfig::default();
        Self {
            test_size: 0.2,
            seed: 42,
            vif_threshold: features.vif_threshold,
            collinear_drop: features.collinear_drop,
        }
    }
}

/// Outcome of a full pipeline run.
///
/// Carries both total-duration estimators: the additive combiner's
/// predictions evaluated against ground truth, and the ensemble
/// corrector's metrics on its internal held-out fold. Neither replaces
/// the other; they are alternative estimators over the same inputs.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Metrics of the naive additive estimate on the outer test set
    pub combined_metrics: RegressionMetrics,
    /// Metrics of the ensemble corrector on its internal fold
    pub ensemble_metrics: RegressionMetrics,
    /// Additive total-duration predictions, outer test set
    pub final_predictions: Array1<f64>,
    /// Ground-truth durations, outer test set
    pub actual_durations: Array1<f64>,
    /// Retained feature count after engineering
    pub n_features: usize,
    /// Outer split sizes
    pub n_train: usize,
    pub n_test: usize,
}

/// Runs the six components in fixed order: clean, engineer, split,
/// prep-time estimation, combination and ensemble correction, evaluation.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline with default configuration
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Create a pipeline with custom configuration
    pub fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, df: &DataFrame) -> Result<PipelineReport> {
        info!(rows = df.height(), "starting delivery duration pipeline");

        let cleaned = DataCleaner::new().clean(df)?;

        let engineer = FeatureEngineer::with_config(FeatureEngineerConfig {
            vif_threshold: self.config.vif_threshold,
            collinear_drop: self.config.collinear_drop.clone(),
        });
        let engineered = engineer.engineer(&cleaned)?;
        let n_features = engineered.width() - 1;

        let split = train_test_split(
            &engineered,
            TARGET_COLUMN,
            self.config.test_size,
            self.config.seed,
        )?;
        let n_train = split.x_train.height();
        let n_test = split.x_test.height();

        let mut prep_stage = PrepTimeEstimator::new(self.config.seed);
        let bundle = prep_stage.run(&split)?;

        let final_predictions = combine_durations(
            &bundle.prep_time_pred,
            &bundle.driving_duration,
            &bundle.order_place_duration,
        )?;

        let mut ensemble_stage = FinalEnsembleRegressor::new(self.config.seed);
        let ensemble_report = ensemble_stage.run(&bundle)?;

        let combined_metrics = evaluate(&bundle.actual_duration, &final_predictions)?;

        info!(
            combined_rmse = combined_metrics.rmse,
            combined_r2 = combined_metrics.r2,
            ensemble_rmse = ensemble_report.metrics.rmse,
            ensemble_r2 = ensemble_report.metrics.r2,
            "pipeline finished"
        );

        Ok(PipelineReport {
            combined_metrics,
            ensemble_metrics: ensemble_report.metrics,
            final_predictions,
            actual_durations: bundle.actual_duration,
            n_features,
            n_train,
            n_test,
        })
    }
}
