//! Transition probabilities over evolutionary time.

use ndarray::Array2;

use super::rate_matrix::RateMatrix;
use crate::errors::{ModelMatcherError, Result};

/// Tolerance for the row-sum check on P(t).
const ROW_SUM_TOLERANCE: f64 = 1e-6;

/// Compute the transition probability matrix P(t) = exp(Qt) from the cached
/// eigendecomposition: P(t) = V · diag(exp(λᵢ·t)) · V⁻¹.
///
/// Negative branch lengths are rejected with `MalformedModel`. Entries driven
/// slightly negative by roundoff are clamped to zero; rows not summing to 1
/// within tolerance signal `NumericalInstability`.
pub fn transition_matrix(model: &RateMatrix, t: f64) -> Result<Array2<f64>> {
    if t < 0. || !t.is_finite() {
        return Err(ModelMatcherError::MalformedModel(format!(
            "branch length must be finite and non-negative, got {}",
            t
        )));
    }

    let eigen = model.eigen()?;
    let exp_values = eigen.values.mapv(|lambda| (lambda * t).exp());
    let mut p = eigen
        .vectors
        .dot(&Array2::from_diag(&exp_values))
        .dot(&eigen.inverse);

    p.mapv_inplace(|entry| entry.max(0.));

    for (i, row) in p.rows().into_iter().enumerate() {
        let row_sum: f64 = row.sum();
        if (row_sum - 1.).abs() > ROW_SUM_TOLERANCE {
            return Err(ModelMatcherError::NumericalInstability(format!(
                "P({}) row {} sums to {}",
                t, i, row_sum
            )));
        }
    }

    Ok(p)
}
