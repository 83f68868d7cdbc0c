//! The two-stage prediction architecture
//!
//! Stage one predicts kitchen preparation time from engineered features
//! after subtracting the known logistics durations from the target. The
//! deterministic combiner and the final ensemble then produce two
//! alternative total-duration estimators over the same inputs.

pub mod combine;
pub mod ensemble;
pub mod prep_time;

pub use combine::combine_durations;
pub use ensemble::{EnsembleReport, FinalEnsembleRegressor};
pub use prep_time::PrepTimeEstimator;

use ndarray::Array1;

/// Per-record outputs of the first stage, index-aligned over the test set.
///
/// Owned transiently between stages; consumed by the combiner and the
/// final ensemble, then discarded.
#[derive(Debug, Clone)]
pub struct PredictionBundle {
    /// First-stage preparation time predictions
    pub prep_time_pred: Array1<f64>,
    /// Known driving duration estimates, passed through from the test set
    pub driving_duration: Array1<f64>,
    /// Known order placement duration estimates, passed through
    pub order_place_duration: Array1<f64>,
    /// Ground-truth total delivery durations
    pub actual_duration: Array1<f64>,
}

impl PredictionBundle {
    /// Number of aligned test records
    pub fn len(&self) -> usize {
        self.prep_time_pred.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prep_time_pred.is_empty()
    }

    /// Verify that all four arrays are index-aligned
    pub fn validate(&self) -> crate::error::Result<()> {
        let n = self.prep_time_pred.len();
        if self.driving_duration.len() != n
            || self.order_place_duration.len() != n
            || self.actual_duration.len() != n
        {
            return Err(crate::error::EtaError::AlignmentError(format!(
                "bundle arrays disagree on length: prep={}, driving={}, order_place={}, actual={}",
                n,
                self.driving_duration.len(),
                self.order_place_duration.len(),
                self.actual_duration.len()
            )));
        }
        Ok(())
    }
}
