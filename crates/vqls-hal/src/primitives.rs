//! Sampler and estimator primitives.
//!
//! Both primitives evaluate a batch of circuits against one shared parameter
//! vector; circuits that read fewer parameters simply ignore the tail.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use vqls_ir::{Circuit, Observable};

use crate::error::HalResult;

/// Measurement outcome probabilities keyed by basis index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuasiDistribution {
    probabilities: FxHashMap<usize, f64>,
}

impl QuasiDistribution {
    /// Keep the non-zero entries of a dense probability vector.
    pub fn from_dense(probabilities: &[f64]) -> Self {
        Self {
            probabilities: probabilities
                .iter()
                .enumerate()
                .filter(|&(_, &p)| p != 0.0)
                .map(|(k, &p)| (k, p))
                .collect(),
        }
    }

    /// Normalize a histogram of `shots` outcomes.
    pub fn from_counts(counts: &FxHashMap<usize, u64>, shots: u32) -> Self {
        let total = f64::from(shots.max(1));
        Self {
            probabilities: counts
                .iter()
                .map(|(&k, &c)| (k, c as f64 / total))
                .collect(),
        }
    }

    /// Probability of outcome `index` (zero when never observed).
    pub fn probability(&self, index: usize) -> f64 {
        self.probabilities.get(&index).copied().unwrap_or(0.0)
    }

    /// Dense vector of length `dim`; outcomes beyond `dim` are dropped.
    pub fn to_dense(&self, dim: usize) -> Vec<f64> {
        let mut dense = vec![0.0; dim];
        for (&k, &p) in &self.probabilities {
            if k < dim {
                dense[k] = p;
            }
        }
        dense
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.probabilities.iter().map(|(&k, &p)| (k, p))
    }

    /// Number of outcomes with non-zero probability.
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Sum of all probabilities.
    pub fn total(&self) -> f64 {
        self.probabilities.values().sum()
    }
}

/// Samples measurement distributions of circuits measured on all qubits.
pub trait Sampler: Send + Sync {
    /// Run every circuit with `parameters`. `shots = None` asks for exact
    /// distributions when the implementation can provide them.
    fn sample(
        &self,
        circuits: &[Circuit],
        parameters: &[f64],
        shots: Option<u32>,
    ) -> HalResult<Vec<QuasiDistribution>>;
}

/// Estimates expectation values of observables.
pub trait Estimator: Send + Sync {
    /// `⟨ψ_k|O_k|ψ_k⟩` for each pair `(circuits[k], observables[k])`.
    fn estimate(
        &self,
        circuits: &[Circuit],
        observables: &[Observable],
        parameters: &[f64],
    ) -> HalResult<Vec<f64>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_roundtrip_drops_zeros() {
        let qd = QuasiDistribution::from_dense(&[0.25, 0.0, 0.75, 0.0]);
        assert_eq!(qd.len(), 2);
        assert_eq!(qd.probability(1), 0.0);
        assert_eq!(qd.to_dense(4), vec![0.25, 0.0, 0.75, 0.0]);
        assert!((qd.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_counts() {
        let mut counts = FxHashMap::default();
        counts.insert(0, 30);
        counts.insert(3, 70);
        let qd = QuasiDistribution::from_counts(&counts, 100);
        assert!((qd.probability(3) - 0.7).abs() < 1e-12);
        assert_eq!(qd.to_dense(2), vec![0.3, 0.0]);
    }
}
