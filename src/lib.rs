//! Delivery ETA - Two-stage delivery duration prediction
//!
//! This crate trains and evaluates a two-stage regression model that
//! predicts total delivery duration for on-demand delivery orders.
//!
//! # Modules
//!
//! ## Core
//! - [`preprocessing`] - DataCleaner, FeatureEngineer, scaler, holdout split
//! - [`training`] - Gradient boosting and random forest regressors
//! - [`stages`] - Prep-time estimator, duration combiner, final ensemble
//!
//! ## Supporting
//! - [`evaluation`] - RMSE/MAE/R² and the HTML evaluation report
//! - [`utils`] - Data loading and DataFrame/matrix conversion
//! - [`pipeline`] - End-to-end training harness

// Core error handling
pub mod error;

// Data preparation
pub mod preprocessing;
pub mod utils;

// Models
pub mod training;

// Two-stage prediction architecture
pub mod stages;

// Metrics and reporting
pub mod evaluation;

// Orchestration
pub mod pipeline;

pub use error::{EtaError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{EtaError, Result};

    // Preprocessing
    pub use crate::preprocessing::{
        train_test_split, DataCleaner, FeatureEngineer, FeatureEngineerConfig, OneHotEncoder,
        StandardScaler, TrainTestSplit,
    };

    // Training
    pub use crate::training::{
        GradientBoostingConfig, GradientBoostingRegressor, RandomForestConfig,
        RandomForestRegressor, Regressor,
    };

    // Stages
    pub use crate::stages::{
        combine_durations, EnsembleReport, FinalEnsembleRegressor, PredictionBundle,
        PrepTimeEstimator,
    };

    // Evaluation
    pub use crate::evaluation::{evaluate, render_report, RegressionMetrics};

    // Pipeline
    pub use crate::pipeline::{Pipeline, PipelineConfig, PipelineReport};
}
