//! Likelihood scoring and ranking of candidate models.

use itertools::Itertools;

use crate::config::Parameters;
use crate::core::{CountMatrix, RateMatrix};
use crate::errors::{ModelMatcherError, Result};

/// Inverse golden ratio, the bracket reduction factor of the search.
const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// A model name with its log-likelihood score and rank among compared
/// candidates. Rank 1 is the best fit.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreResult {
    pub name: String,
    pub score: f64,
    pub rank: usize,
}

/// Scores empirical substitution counts against candidate models.
pub struct ModelScorer {
    parameters: Parameters,
}

impl ModelScorer {
    pub fn new(parameters: Parameters) -> Self {
        Self { parameters }
    }

    /// Log-likelihood of `counts` under `model`.
    ///
    /// The branch length is taken from the configuration when fixed, and
    /// otherwise estimated by a golden-section search maximizing the
    /// likelihood over the configured bracket. Fails with `DegenerateInput`
    /// for an all-zero count matrix.
    pub fn score(&self, model: &RateMatrix, counts: &CountMatrix) -> Result<f64> {
        if counts.total() == 0 {
            return Err(ModelMatcherError::DegenerateInput(
                "count matrix is all zero".to_string(),
            ));
        }
        match self.parameters.fixed_branch_length {
            Some(t) => self.log_likelihood(model, counts, t),
            None => self.maximize_log_likelihood(model, counts),
        }
    }

    /// Score every candidate and return them best fit first, ties broken by
    /// name for determinism. Ranks are assigned from 1.
    pub fn rank(&self, models: &[RateMatrix], counts: &CountMatrix) -> Result<Vec<ScoreResult>> {
        let scored: Vec<(String, f64)> = models
            .iter()
            .map(|model| Ok((model.name().to_string(), self.score(model, counts)?)))
            .collect::<Result<_>>()?;
        Ok(rank_scored(scored))
    }

    /// Log-likelihood Σ N\[i\]\[j\]·ln(πᵢ·P(t)\[i\]\[j\]) at branch length t.
    ///
    /// Probabilities are floored at the smallest positive double, so the
    /// result is always finite. Fails with `MalformedModel` if the count
    /// matrix and the model disagree on the number of states.
    pub fn log_likelihood(&self, model: &RateMatrix, counts: &CountMatrix, t: f64) -> Result<f64> {
        if counts.n_states() != model.n_states() {
            return Err(ModelMatcherError::MalformedModel(format!(
                "count matrix has {} states but model '{}' has {}",
                counts.n_states(),
                model.name(),
                model.n_states()
            )));
        }

        let p = model.transition_matrix(t)?;
        let freqs = model.frequencies();
        let k = model.n_states();

        let mut log_likelihood = 0.;
        for i in 0..k {
            for j in 0..k {
                let observed = counts.get(i, j);
                if observed == 0 {
                    continue;
                }
                let probability = (freqs[i] * p[[i, j]]).max(f64::MIN_POSITIVE);
                log_likelihood += observed as f64 * probability.ln();
            }
        }
        Ok(log_likelihood)
    }

    /// Golden-section search for the branch length maximizing the
    /// log-likelihood, bounded by the configured bracket and iteration cap.
    fn maximize_log_likelihood(&self, model: &RateMatrix, counts: &CountMatrix) -> Result<f64> {
        let mut lower = self.parameters.branch_min;
        let mut upper = self.parameters.branch_max;

        let mut mid_low = upper - INV_PHI * (upper - lower);
        let mut mid_high = lower + INV_PHI * (upper - lower);
        let mut ll_low = self.log_likelihood(model, counts, mid_low)?;
        let mut ll_high = self.log_likelihood(model, counts, mid_high)?;

        for _ in 0..self.parameters.max_iterations {
            if (upper - lower).abs() < self.parameters.tolerance {
                break;
            }
            if ll_low > ll_high {
                upper = mid_high;
                mid_high = mid_low;
                ll_high = ll_low;
                mid_low = upper - INV_PHI * (upper - lower);
                ll_low = self.log_likelihood(model, counts, mid_low)?;
            } else {
                lower = mid_low;
                mid_low = mid_high;
                ll_low = ll_high;
                mid_high = lower + INV_PHI * (upper - lower);
                ll_high = self.log_likelihood(model, counts, mid_high)?;
            }
        }

        self.log_likelihood(model, counts, (lower + upper) / 2.)
    }
}

impl Default for ModelScorer {
    fn default() -> Self {
        Self::new(Parameters::default())
    }
}

/// Order scored candidates by descending score, ties by ascending name, and
/// assign 1-based ranks.
pub fn rank_scored(scored: Vec<(String, f64)>) -> Vec<ScoreResult> {
    scored
        .into_iter()
        .sorted_by(|(name_a, score_a), (name_b, score_b)| {
            score_b
                .partial_cmp(score_a)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| name_a.cmp(name_b))
        })
        .enumerate()
        .map(|(index, (name, score))| ScoreResult {
            name,
            score,
            rank: index + 1,
        })
        .collect()
}
