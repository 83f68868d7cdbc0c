//! Deterministic combination of the duration components

use crate::error::{EtaError, Result};
use ndarray::Array1;

/// Sum predicted preparation time with the known driving and order
/// placement durations to form the naive total-duration estimate.
///
/// Purely additive and stateless; mismatched array lengths signal an
/// upstream contract violation and are fatal.
pub fn combine_durations(
    prep_time_pred: &Array1<f64>,
    driving_duration: &Array1<f64>,
    order_place_duration: &Array1<f64>,
) -> Result<Array1<f64>> {
    let n = prep_time_pred.len();
    if driving_duration.len() != n || order_place_duration.len() != n {
        return Err(EtaError::AlignmentError(format!(
            "duration arrays disagree on length: prep={}, driving={}, order_place={}",
            n,
            driving_duration.len(),
            order_place_duration.len()
        )));
    }

    Ok(prep_time_pred + driving_duration + order_place_duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_elementwise_sum() {
        let prep = array![30.0, 10.0];
        let driving = array![100.0, 200.0];
        let order_place = array![50.0, 25.0];

        let combined = combine_durations(&prep, &driving, &order_place).unwrap();
        assert_eq!(combined, array![180.0, 235.0]);
    }

    #[test]
    fn test_length_mismatch_is_fatal() {
        let prep = array![30.0];
        let driving = array![100.0, 200.0];
        let order_place = array![50.0, 25.0];

        let err = combine_durations(&prep, &driving, &order_place).unwrap_err();
        assert!(matches!(err, EtaError::AlignmentError(_)));
    }

    #[test]
    fn test_empty_inputs() {
        let empty = Array1::<f64>::zeros(0);
        let combined = combine_durations(&empty, &empty, &empty).unwrap();
        assert!(combined.is_empty());
    }
}
