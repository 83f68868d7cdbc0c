//! Tree-ensemble regressors for the two prediction stages

pub mod decision_tree;
pub mod gradient_boosting;
pub mod random_forest;

pub use decision_tree::{RegressionTree, TreeNode};
pub use gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor};
pub use random_forest::{MaxFeatures, RandomForestConfig, RandomForestRegressor};

use crate::error::Result;
use ndarray::{Array1, Array2};

/// Capability shared by both prediction stages.
///
/// Either stage's algorithm can be swapped without touching the
/// surrounding combination logic.
pub trait Regressor: Send + Sync {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Make predictions
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;
}
