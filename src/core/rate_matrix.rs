//! Replacement model representation.

use std::sync::OnceLock;

use ndarray::{Array1, Array2};

use super::eigen::Eigen;
use super::transition;
use crate::errors::{ModelMatcherError, Result};

/// Tolerance within which a frequency sum is accepted as 1 without
/// renormalization.
const FREQUENCY_SUM_TOLERANCE: f64 = 1e-8;

/// An amino acid replacement model.
///
/// Holds the symmetric exchangeability parameters and the equilibrium
/// frequencies, and derives the instantaneous rate matrix Q with
/// Q\[i\]\[j\] = exchangeability(i, j) · frequency(j) for i ≠ j and diagonal
/// entries making every row sum to zero.
///
/// The eigendecomposition of Q is computed on first use and cached; a
/// `RateMatrix` is read-only after construction, so the cached decomposition
/// may be shared freely across readers.
#[derive(Clone, Debug)]
pub struct RateMatrix {
    name: String,
    exchangeabilities: Array2<f64>,
    frequencies: Array1<f64>,
    q: Array2<f64>,
    eigen: OnceLock<Eigen>,
}

impl RateMatrix {
    /// Build a model from a flat lower-triangular exchangeability sequence
    /// and an equilibrium frequency vector.
    ///
    /// `r_vals` holds the k(k−1)/2 values below the diagonal in row order,
    /// i.e. (1,0), (2,0), (2,1), (3,0), … — the order PAML model files use.
    /// The alphabet size k is fixed by `freqs.len()`.
    ///
    /// Fails with `MalformedModel` if the cardinality of `r_vals` does not
    /// match k, if any frequency is negative, or if all frequencies are zero.
    /// A frequency sum deviating from 1 beyond a small tolerance is
    /// renormalized.
    pub fn from_r_and_freq(name: &str, r_vals: &[f64], freqs: &[f64]) -> Result<Self> {
        let k = freqs.len();
        let expected = k * (k - 1) / 2;

        if r_vals.len() != expected {
            return Err(ModelMatcherError::MalformedModel(format!(
                "model '{}': expected {} exchangeability values for {} states, got {}",
                name,
                expected,
                k,
                r_vals.len()
            )));
        }

        if let Some(negative) = freqs.iter().find(|&&pi| pi < 0.) {
            return Err(ModelMatcherError::MalformedModel(format!(
                "model '{}': negative equilibrium frequency {}",
                name, negative
            )));
        }

        let sum: f64 = freqs.iter().sum();
        if sum <= 0. {
            return Err(ModelMatcherError::MalformedModel(format!(
                "model '{}': equilibrium frequencies are all zero",
                name
            )));
        }

        let frequencies = if (sum - 1.).abs() > FREQUENCY_SUM_TOLERANCE {
            Array1::from_iter(freqs.iter().map(|&pi| pi / sum))
        } else {
            Array1::from_vec(freqs.to_vec())
        };

        let mut exchangeabilities = Array2::<f64>::zeros((k, k));
        let mut index = 0;
        for i in 1..k {
            for j in 0..i {
                exchangeabilities[[i, j]] = r_vals[index];
                exchangeabilities[[j, i]] = r_vals[index];
                index += 1;
            }
        }

        let q = build_q(&exchangeabilities, &frequencies);

        Ok(Self {
            name: name.to_string(),
            exchangeabilities,
            frequencies,
            q,
            eigen: OnceLock::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alphabet size k.
    pub fn n_states(&self) -> usize {
        self.frequencies.len()
    }

    /// Equilibrium frequencies, normalized to sum 1.
    pub fn frequencies(&self) -> &Array1<f64> {
        &self.frequencies
    }

    /// Symmetric exchangeability matrix with zero diagonal.
    pub fn exchangeabilities(&self) -> &Array2<f64> {
        &self.exchangeabilities
    }

    /// The instantaneous rate matrix Q. Rows sum to zero.
    pub fn q(&self) -> &Array2<f64> {
        &self.q
    }

    /// The eigendecomposition of Q, computed on first call and cached.
    pub fn eigen(&self) -> Result<&Eigen> {
        if let Some(eigen) = self.eigen.get() {
            return Ok(eigen);
        }
        let eigen = Eigen::decompose(&self.q, &self.frequencies)?;
        // A concurrent caller may have stored its copy first; both computed
        // the same immutable value, so the loser is simply dropped.
        Ok(self.eigen.get_or_init(|| eigen))
    }

    /// Transition probability matrix P(t) = exp(Qt) for branch length t ≥ 0.
    pub fn transition_matrix(&self, t: f64) -> Result<Array2<f64>> {
        transition::transition_matrix(self, t)
    }
}

fn build_q(exchangeabilities: &Array2<f64>, frequencies: &Array1<f64>) -> Array2<f64> {
    let k = frequencies.len();
    let mut q = Array2::<f64>::zeros((k, k));
    for i in 0..k {
        for j in 0..k {
            if i != j {
                q[[i, j]] = exchangeabilities[[i, j]] * frequencies[j];
            }
        }
        let row_sum: f64 = (0..k).filter(|&j| j != i).map(|j| q[[i, j]]).sum();
        q[[i, i]] = -row_sum;
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_model() -> RateMatrix {
        // 4-state model with distinct exchangeabilities and skewed frequencies.
        RateMatrix::from_r_and_freq(
            "toy",
            &[1., 2., 3., 4., 5., 6.],
            &[0.1, 0.2, 0.3, 0.4],
        )
        .unwrap()
    }

    #[test]
    fn rejects_wrong_exchangeability_cardinality() {
        // 189 values instead of the 190 required for 20 states.
        let r_vals = vec![1.; 189];
        let freqs = vec![0.05; 20];
        assert!(matches!(
            RateMatrix::from_r_and_freq("broken", &r_vals, &freqs),
            Err(ModelMatcherError::MalformedModel(_))
        ));
    }

    #[test]
    fn rejects_negative_frequency() {
        let result =
            RateMatrix::from_r_and_freq("toy", &[1., 2., 3., 4., 5., 6.], &[0.5, 0.6, -0.1, 0.]);
        assert!(matches!(result, Err(ModelMatcherError::MalformedModel(_))));
    }

    #[test]
    fn rejects_all_zero_frequencies() {
        let result =
            RateMatrix::from_r_and_freq("toy", &[1., 2., 3., 4., 5., 6.], &[0., 0., 0., 0.]);
        assert!(matches!(result, Err(ModelMatcherError::MalformedModel(_))));
    }

    #[test]
    fn renormalizes_frequency_sum() {
        let model =
            RateMatrix::from_r_and_freq("toy", &[1., 2., 3., 4., 5., 6.], &[0.2, 0.4, 0.6, 0.8])
                .unwrap();
        let sum: f64 = model.frequencies().iter().sum();
        assert!((sum - 1.).abs() < 1e-12);
        assert!((model.frequencies()[0] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn exchangeabilities_are_symmetric() {
        let model = toy_model();
        let s = model.exchangeabilities();
        // Lower-triangular order: (1,0)=1, (2,0)=2, (2,1)=3, (3,0)=4, ...
        assert_eq!(s[[1, 0]], 1.);
        assert_eq!(s[[2, 0]], 2.);
        assert_eq!(s[[2, 1]], 3.);
        assert_eq!(s[[3, 2]], 6.);
        for i in 0..4 {
            assert_eq!(s[[i, i]], 0.);
            for j in 0..4 {
                assert_eq!(s[[i, j]], s[[j, i]]);
            }
        }
    }

    #[test]
    fn q_rows_sum_to_zero() {
        let model = toy_model();
        for i in 0..model.n_states() {
            let row_sum: f64 = model.q().row(i).sum();
            assert!(row_sum.abs() < 1e-12, "row {} sums to {}", i, row_sum);
        }
    }

    #[test]
    fn q_off_diagonal_is_exchangeability_times_frequency() {
        let model = toy_model();
        assert!((model.q()[[1, 0]] - 1. * 0.1).abs() < 1e-12);
        assert!((model.q()[[0, 3]] - 4. * 0.4).abs() < 1e-12);
    }

    #[test]
    fn eigen_round_trips_q() {
        let model = toy_model();
        let eigen = model.eigen().unwrap();
        assert!(eigen.reconstruction_error(model.q()) < 1e-6);
    }

    #[test]
    fn eigen_is_cached() {
        let model = toy_model();
        let first = model.eigen().unwrap() as *const _;
        let second = model.eigen().unwrap() as *const _;
        assert_eq!(first, second);
    }
}
