//! Substitution count matrices.

use ndarray::Array2;

use crate::alphabet::{ALPHABET_SIZE, AminoAcid};

/// A k×k tally of observed or sampled substitutions between alphabet symbols.
///
/// Entry (i, j) counts sites starting in symbol i and ending in symbol j.
/// Produced either by the [`Sampler`](crate::sampler::Sampler) or by an
/// external aggregation of alignment data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountMatrix {
    counts: Array2<u64>,
}

impl CountMatrix {
    /// An all-zero k×k count matrix.
    pub fn zeros(k: usize) -> Self {
        Self {
            counts: Array2::zeros((k, k)),
        }
    }

    pub fn from_array(counts: Array2<u64>) -> Self {
        Self { counts }
    }

    /// Aggregate observed (start, end) residue pairs into a 20×20 tally.
    ///
    /// This is the entry point for alignment-derived data: the caller maps
    /// aligned columns to residue pairs, the tallying happens here.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (AminoAcid, AminoAcid)>) -> Self {
        let mut counts = Self::zeros(ALPHABET_SIZE);
        for (start, end) in pairs {
            counts.increment(start.index(), end.index());
        }
        counts
    }

    /// Alphabet size k.
    pub fn n_states(&self) -> usize {
        self.counts.nrows()
    }

    pub fn get(&self, i: usize, j: usize) -> u64 {
        self.counts[[i, j]]
    }

    pub fn increment(&mut self, i: usize, j: usize) {
        self.counts[[i, j]] += 1;
    }

    /// Sum over all entries.
    pub fn total(&self) -> u64 {
        self.counts.sum()
    }

    pub fn as_array(&self) -> &Array2<u64> {
        &self.counts
    }
}
