//! Second stage: ensemble correction over the duration components

use super::PredictionBundle;
use crate::error::{EtaError, Result};
use crate::evaluation::{evaluate, RegressionMetrics};
use crate::training::{RandomForestConfig, RandomForestRegressor, Regressor};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// Fraction of the bundle held out for this stage's own validation.
const INTERNAL_TEST_SIZE: f64 = 0.2;

/// Outcome of the final ensemble stage
#[derive(Debug, Clone)]
pub struct EnsembleReport {
    /// Metrics on the stage's internal held-out fold
    pub metrics: RegressionMetrics,
    /// Rows used to fit the corrector
    pub n_train: usize,
    /// Rows in the internal held-out fold
    pub n_test: usize,
}

/// Learns a correction model over (predicted prep time, driving duration,
/// order placement duration) against the true total duration, rather than
/// trusting the naive additive sum.
///
/// Uses an internal seeded split, independent of the outer train/test
/// partition, purely for its own validation. Its prediction is the
/// authoritative model output; the additive combiner is kept alongside as
/// an alternative estimator over the same inputs.
pub struct FinalEnsembleRegressor {
    model: Box<dyn Regressor>,
    seed: u64,
}

impl FinalEnsembleRegressor {
    /// Create a corrector backed by the default random forest
    pub fn new(seed: u64) -> Self {
        let config = RandomForestConfig::default().with_random_state(seed);
        Self::with_model(Box::new(RandomForestRegressor::new(config)), seed)
    }

    /// Create a corrector backed by any regressor
    pub fn with_model(model: Box<dyn Regressor>, seed: u64) -> Self {
        Self { model, seed }
    }

    /// Fit the corrector on the bundle and report metrics on its internal
    /// held-out fold.
    pub fn run(&mut self, bundle: &PredictionBundle) -> Result<EnsembleReport> {
        bundle.validate()?;

        let x = component_matrix(bundle);
        let y = &bundle.actual_duration;

        let n_samples = x.nrows();
        let n_test = ((n_samples as f64) * INTERNAL_TEST_SIZE).ceil() as usize;
        let n_train = n_samples.saturating_sub(n_test);
        if n_test == 0 || n_train == 0 {
            return Err(EtaError::ValidationError(format!(
                "bundle of {n_samples} rows is too small for an internal validation split"
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut indices: Vec<usize> = (0..n_samples).collect();
        indices.shuffle(&mut rng);
        let (test_idx, train_idx) = indices.split_at(n_test);

        let x_train = x.select(Axis(0), train_idx);
        let x_test = x.select(Axis(0), test_idx);
        let y_train: Array1<f64> = Array1::from_vec(train_idx.iter().map(|&i| y[i]).collect());
        let y_test: Array1<f64> = Array1::from_vec(test_idx.iter().map(|&i| y[i]).collect());

        info!(
            n_train = x_train.nrows(),
            n_test = x_test.nrows(),
            "fitting final ensemble corrector"
        );
        self.model.fit(&x_train, &y_train)?;

        let y_pred = self.model.predict(&x_test)?;
        let metrics = evaluate(&y_test, &y_pred)?;

        info!(
            rmse = metrics.rmse,
            mae = metrics.mae,
            r2 = metrics.r2,
            "final ensemble held-out metrics"
        );

        Ok(EnsembleReport {
            metrics,
            n_train: x_train.nrows(),
            n_test: x_test.nrows(),
        })
    }

    /// Predict corrected total durations for new component triples
    pub fn predict(&self, bundle: &PredictionBundle) -> Result<Array1<f64>> {
        bundle.validate()?;
        self.model.predict(&component_matrix(bundle))
    }
}

/// Stack the three duration components into an (n, 3) matrix.
fn component_matrix(bundle: &PredictionBundle) -> Array2<f64> {
    let n = bundle.len();
    let mut x = Array2::zeros((n, 3));
    for i in 0..n {
        x[[i, 0]] = bundle.prep_time_pred[i];
        x[[i, 1]] = bundle.driving_duration[i];
        x[[i, 2]] = bundle.order_place_duration[i];
    }
    x
}
