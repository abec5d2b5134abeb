//! Eigendecomposition of instantaneous rate matrices.
//!
//! A reversible rate matrix Q is not symmetric, but the similarity transform
//! B = D^{1/2} Q D^{-1/2} with D = diag(π) is, so B can be decomposed with
//! Jacobi rotations and the eigenvectors mapped back:
//! V = D^{-1/2} U and V⁻¹ = Uᵀ D^{1/2}, with Q = V diag(λ) V⁻¹.

use ndarray::{Array1, Array2};

use crate::errors::{ModelMatcherError, Result};

/// Maximum reconstruction error ‖V diag(λ) V⁻¹ − Q‖ accepted for a decomposition.
pub const RECONSTRUCTION_TOLERANCE: f64 = 1e-6;

/// Off-diagonal magnitude below which the Jacobi iteration is converged.
const JACOBI_TOLERANCE: f64 = 1e-12;

/// Upper bound on full Jacobi sweeps. A 20x20 symmetric matrix converges in
/// well under ten sweeps; hitting the cap means the input was pathological.
const MAX_SWEEPS: usize = 64;

/// Cached eigendecomposition of a rate matrix Q.
///
/// Immutable once computed; every transition probability and likelihood
/// evaluation at any branch length reuses the same decomposition.
#[derive(Clone, Debug)]
pub struct Eigen {
    /// Eigenvalues of Q. One is always ≈0, belonging to the stationary
    /// distribution.
    pub values: Array1<f64>,
    /// Right eigenvectors of Q, one per column.
    pub vectors: Array2<f64>,
    /// Inverse of the eigenvector matrix.
    pub inverse: Array2<f64>,
}

impl Eigen {
    /// Decompose a rate matrix built over the stationary distribution `freqs`.
    ///
    /// Fails with `NumericalInstability` if any frequency is zero (the
    /// similarity transform divides by √π) or if the reconstruction error
    /// exceeds [`RECONSTRUCTION_TOLERANCE`].
    pub fn decompose(q: &Array2<f64>, freqs: &Array1<f64>) -> Result<Self> {
        let k = freqs.len();

        if freqs.iter().any(|&pi| pi <= 0.) {
            return Err(ModelMatcherError::NumericalInstability(
                "cannot decompose a rate matrix with zero equilibrium frequencies".to_string(),
            ));
        }

        let sqrt_pi: Array1<f64> = freqs.mapv(f64::sqrt);
        let inv_sqrt_pi: Array1<f64> = sqrt_pi.mapv(|s| 1. / s);

        // B = D^{1/2} Q D^{-1/2}
        let mut b = Array2::<f64>::zeros((k, k));
        for i in 0..k {
            for j in 0..k {
                b[[i, j]] = sqrt_pi[i] * q[[i, j]] * inv_sqrt_pi[j];
            }
        }

        let (values, u) = jacobi(&mut b)?;

        let mut vectors = Array2::<f64>::zeros((k, k));
        let mut inverse = Array2::<f64>::zeros((k, k));
        for i in 0..k {
            for j in 0..k {
                vectors[[i, j]] = inv_sqrt_pi[i] * u[[i, j]];
                inverse[[i, j]] = u[[j, i]] * sqrt_pi[j];
            }
        }

        let eigen = Self {
            values,
            vectors,
            inverse,
        };

        let error = eigen.reconstruction_error(q);
        if error > RECONSTRUCTION_TOLERANCE {
            return Err(ModelMatcherError::NumericalInstability(format!(
                "eigendecomposition reconstruction error {} exceeds tolerance {}",
                error, RECONSTRUCTION_TOLERANCE
            )));
        }

        Ok(eigen)
    }

    /// Largest absolute entry of V diag(λ) V⁻¹ − Q.
    pub fn reconstruction_error(&self, q: &Array2<f64>) -> f64 {
        let reconstructed = self
            .vectors
            .dot(&Array2::from_diag(&self.values))
            .dot(&self.inverse);
        (&reconstructed - q)
            .iter()
            .fold(0., |max, &d| max.max(d.abs()))
    }
}

/// Cyclic Jacobi eigendecomposition of a symmetric matrix.
///
/// Diagonalizes the input in place and returns (eigenvalues, orthogonal
/// eigenvector matrix with one eigenvector per column).
fn jacobi(a: &mut Array2<f64>) -> Result<(Array1<f64>, Array2<f64>)> {
    let k = a.nrows();
    let mut u = Array2::<f64>::eye(k);

    for _ in 0..MAX_SWEEPS {
        let off_diagonal: f64 = (0..k)
            .flat_map(|p| ((p + 1)..k).map(move |q| (p, q)))
            .map(|(p, q)| a[[p, q]].abs())
            .fold(0., f64::max);
        if off_diagonal < JACOBI_TOLERANCE {
            let values = Array1::from_iter((0..k).map(|i| a[[i, i]]));
            return Ok((values, u));
        }

        for p in 0..k {
            for q in (p + 1)..k {
                if a[[p, q]].abs() < JACOBI_TOLERANCE {
                    continue;
                }

                // Rotation angle eliminating a[p][q].
                let theta = (a[[q, q]] - a[[p, p]]) / (2. * a[[p, q]]);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.).sqrt());
                let c = 1. / (t * t + 1.).sqrt();
                let s = t * c;

                for i in 0..k {
                    let aip = a[[i, p]];
                    let aiq = a[[i, q]];
                    a[[i, p]] = c * aip - s * aiq;
                    a[[i, q]] = s * aip + c * aiq;
                }
                for j in 0..k {
                    let apj = a[[p, j]];
                    let aqj = a[[q, j]];
                    a[[p, j]] = c * apj - s * aqj;
                    a[[q, j]] = s * apj + c * aqj;
                }
                a[[p, q]] = 0.;
                a[[q, p]] = 0.;

                for i in 0..k {
                    let uip = u[[i, p]];
                    let uiq = u[[i, q]];
                    u[[i, p]] = c * uip - s * uiq;
                    u[[i, q]] = s * uip + c * uiq;
                }
            }
        }
    }

    Err(ModelMatcherError::NumericalInstability(format!(
        "Jacobi iteration failed to converge within {} sweeps",
        MAX_SWEEPS
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn jacobi_recovers_diagonal_eigenvalues() {
        let mut m = array![[1., 0., 0.], [0., 2., 0.], [0., 0., 3.]];
        let (values, _) = jacobi(&mut m).unwrap();
        let mut sorted: Vec<f64> = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((sorted[0] - 1.).abs() < 1e-10);
        assert!((sorted[1] - 2.).abs() < 1e-10);
        assert!((sorted[2] - 3.).abs() < 1e-10);
    }

    #[test]
    fn jacobi_eigenvectors_are_orthonormal() {
        let mut m = array![[2., 1., 0.], [1., 3., 1.], [0., 1., 2.]];
        let (_, u) = jacobi(&mut m).unwrap();
        let gram = u.t().dot(&u);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1. } else { 0. };
                assert!(
                    (gram[[i, j]] - expected).abs() < 1e-10,
                    "UᵀU[{}][{}] = {}",
                    i,
                    j,
                    gram[[i, j]]
                );
            }
        }
    }

    #[test]
    fn decompose_rejects_zero_frequency() {
        let q = Array2::<f64>::zeros((3, 3));
        let freqs = array![0.5, 0.5, 0.];
        assert!(matches!(
            Eigen::decompose(&q, &freqs),
            Err(ModelMatcherError::NumericalInstability(_))
        ));
    }

    #[test]
    fn decompose_reconstructs_a_small_rate_matrix() {
        // Reversible 3-state rate matrix over a skewed distribution.
        let freqs = array![0.5, 0.3, 0.2];
        let s = array![[0., 1., 2.], [1., 0., 3.], [2., 3., 0.]];
        let mut q = Array2::<f64>::zeros((3, 3));
        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    q[[i, j]] = s[[i, j]] * freqs[j];
                }
            }
            let row_sum: f64 = (0..3).filter(|&j| j != i).map(|j| q[[i, j]]).sum();
            q[[i, i]] = -row_sum;
        }

        let eigen = Eigen::decompose(&q, &freqs).unwrap();
        assert!(eigen.reconstruction_error(&q) < 1e-10);

        // One eigenvalue belongs to the stationary distribution.
        let near_zero = eigen.values.iter().filter(|l| l.abs() < 1e-10).count();
        assert_eq!(near_zero, 1);
    }
}
