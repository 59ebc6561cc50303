//! Statevector sampler.

use std::sync::Mutex;

use rand::SeedableRng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use tracing::trace;
use vqls_hal::{HalError, HalResult, QuasiDistribution, Sampler};
use vqls_ir::{Circuit, Statevector};

/// Sampler backed by exact statevector simulation.
///
/// Without shots the returned distributions are exact; with shots they are
/// multinomial estimates drawn from a seedable RNG.
pub struct StatevectorSampler {
    rng: Mutex<StdRng>,
}

impl StatevectorSampler {
    /// Sampler seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic sampler.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn draw(&self, probabilities: &[f64], shots: u32) -> HalResult<QuasiDistribution> {
        let dist = WeightedIndex::new(probabilities)
            .map_err(|e| HalError::Execution(format!("invalid distribution: {e}")))?;
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| HalError::Execution("sampler RNG lock poisoned".to_string()))?;

        let mut counts: FxHashMap<usize, u64> = FxHashMap::default();
        for _ in 0..shots {
            *counts.entry(dist.sample(&mut *rng)).or_insert(0) += 1;
        }
        Ok(QuasiDistribution::from_counts(&counts, shots))
    }
}

impl Default for StatevectorSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for StatevectorSampler {
    fn sample(
        &self,
        circuits: &[Circuit],
        parameters: &[f64],
        shots: Option<u32>,
    ) -> HalResult<Vec<QuasiDistribution>> {
        circuits
            .iter()
            .map(|circuit| {
                let probabilities = Statevector::from_circuit(circuit, parameters)?.probabilities();
                trace!(circuit = circuit.name(), ?shots, "sampling");
                match shots {
                    None => Ok(QuasiDistribution::from_dense(&probabilities)),
                    Some(0) => Err(HalError::InvalidInput("shots must be positive".to_string())),
                    Some(n) => self.draw(&probabilities, n),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bell() -> Circuit {
        let mut c = Circuit::new("bell", 2);
        c.h(0).unwrap().cx(0, 1).unwrap();
        c
    }

    #[test]
    fn test_exact_distribution() {
        let sampler = StatevectorSampler::new();
        let out = sampler.sample(&[bell()], &[], None).unwrap();
        assert_relative_eq!(out[0].probability(0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(out[0].probability(3), 0.5, epsilon = 1e-12);
        assert_eq!(out[0].len(), 2);
    }

    #[test]
    fn test_shot_distribution_is_seeded() {
        let a = StatevectorSampler::with_seed(7)
            .sample(&[bell()], &[], Some(2000))
            .unwrap();
        let b = StatevectorSampler::with_seed(7)
            .sample(&[bell()], &[], Some(2000))
            .unwrap();
        assert_eq!(a, b);
        assert!((a[0].probability(0) - 0.5).abs() < 0.05);
        assert_relative_eq!(a[0].total(), 1.0, epsilon = 1e-12);
        assert_eq!(a[0].probability(1), 0.0);
    }

    #[test]
    fn test_zero_shots_rejected() {
        let sampler = StatevectorSampler::new();
        assert!(matches!(
            sampler.sample(&[bell()], &[], Some(0)),
            Err(HalError::InvalidInput(_))
        ));
    }
}
