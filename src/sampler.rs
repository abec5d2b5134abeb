//! Synthetic substitution count sampling.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand::distr::weighted::WeightedIndex;

use crate::core::{CountMatrix, RateMatrix};
use crate::errors::{ModelMatcherError, Result};

/// Draws synthetic substitution count matrices from a model's stationary and
/// transition distributions.
///
/// The sampler owns its random generator; construct with [`Sampler::from_seed`]
/// for reproducible draws. Distinct sampler instances are independent.
pub struct Sampler {
    rng: StdRng,
}

impl Sampler {
    /// A sampler seeded from operating system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// A sampler with a fixed seed. Equal seeds reproduce equal draws.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Sample a count matrix of `n` substitution events from `model`.
    ///
    /// Per simulated site: a start symbol is drawn from the stationary
    /// distribution, a branch length uniformly from `branch_lengths`, and an
    /// end symbol from the matching row of P(t). Entries therefore sum to
    /// exactly `n`. Transition rows are materialized once per supplied branch
    /// length.
    pub fn sample_count_matrix(
        &mut self,
        model: &RateMatrix,
        n: u64,
        branch_lengths: &[f64],
    ) -> Result<CountMatrix> {
        self.sample_weighted(model, n, branch_lengths, None)
    }

    /// Like [`Sampler::sample_count_matrix`], but branch lengths are drawn
    /// with the supplied weights instead of uniformly.
    pub fn sample_count_matrix_weighted(
        &mut self,
        model: &RateMatrix,
        n: u64,
        branch_lengths: &[f64],
        weights: &[f64],
    ) -> Result<CountMatrix> {
        if weights.len() != branch_lengths.len() {
            return Err(ModelMatcherError::MalformedModel(format!(
                "{} branch lengths but {} weights",
                branch_lengths.len(),
                weights.len()
            )));
        }
        let distribution = WeightedIndex::new(weights.iter()).map_err(|e| {
            ModelMatcherError::MalformedModel(format!("invalid branch length weights: {}", e))
        })?;
        self.sample_weighted(model, n, branch_lengths, Some(distribution))
    }

    fn sample_weighted(
        &mut self,
        model: &RateMatrix,
        n: u64,
        branch_lengths: &[f64],
        branch_distribution: Option<WeightedIndex<f64>>,
    ) -> Result<CountMatrix> {
        if branch_lengths.is_empty() {
            return Err(ModelMatcherError::MalformedModel(
                "sampling requires at least one branch length".to_string(),
            ));
        }

        let k = model.n_states();

        let stationary = WeightedIndex::new(model.frequencies().iter()).map_err(|e| {
            ModelMatcherError::MalformedModel(format!("invalid stationary distribution: {}", e))
        })?;

        // One set of per-row end-symbol distributions per branch length.
        let mut row_distributions: Vec<Vec<WeightedIndex<f64>>> =
            Vec::with_capacity(branch_lengths.len());
        for &t in branch_lengths {
            let p = model.transition_matrix(t)?;
            let rows = p
                .rows()
                .into_iter()
                .map(|row| {
                    WeightedIndex::new(row.iter()).map_err(|e| {
                        ModelMatcherError::NumericalInstability(format!(
                            "P({}) row is not a valid distribution: {}",
                            t, e
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            row_distributions.push(rows);
        }

        let mut counts = CountMatrix::zeros(k);
        for _ in 0..n {
            let start = stationary.sample(&mut self.rng);
            let branch = match &branch_distribution {
                Some(distribution) => distribution.sample(&mut self.rng),
                None => self.rng.random_range(0..branch_lengths.len()),
            };
            let end = row_distributions[branch][start].sample(&mut self.rng);
            counts.increment(start, end);
        }

        Ok(counts)
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}
