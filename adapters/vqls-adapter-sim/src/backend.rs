//! Local simulator backend.

use std::sync::Arc;

use vqls_hal::{Backend, Estimator, Sampler};

use crate::estimator::StatevectorEstimator;
use crate::sampler::StatevectorSampler;

const DEFAULT_MAX_QUBITS: usize = 20;

/// Backend serving statevector primitives.
#[derive(Debug, Clone)]
pub struct SimBackend {
    max_qubits: usize,
    seed: Option<u64>,
    estimator_shots: Option<u32>,
}

impl SimBackend {
    pub fn new() -> Self {
        Self {
            max_qubits: DEFAULT_MAX_QUBITS,
            seed: None,
            estimator_shots: None,
        }
    }

    /// Cap the circuit width.
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Seed the primitives' shot noise.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Make the estimator shot-based.
    pub fn with_estimator_shots(mut self, shots: u32) -> Self {
        self.estimator_shots = Some(shots);
        self
    }
}

impl Default for SimBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for SimBackend {
    fn name(&self) -> &str {
        "statevector_simulator"
    }

    fn max_qubits(&self) -> usize {
        self.max_qubits
    }

    fn sampler(&self) -> Arc<dyn Sampler> {
        match self.seed {
            Some(seed) => Arc::new(StatevectorSampler::with_seed(seed)),
            None => Arc::new(StatevectorSampler::new()),
        }
    }

    fn estimator(&self) -> Arc<dyn Estimator> {
        let mut estimator = StatevectorEstimator::new();
        if let Some(seed) = self.seed {
            estimator = estimator.with_seed(seed.wrapping_add(1));
        }
        if let Some(shots) = self.estimator_shots {
            estimator = estimator.with_shots(shots);
        }
        Arc::new(estimator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vqls_hal::{HalError, Session};
    use vqls_ir::Circuit;

    #[test]
    fn test_session_on_sim_backend() {
        let backend = SimBackend::new().with_max_qubits(2).with_seed(1);
        Session::scoped(&backend, |session| {
            let mut c = Circuit::new("x", 1);
            c.x(0).unwrap();
            let out = session.sample(&[c], &[], None).unwrap();
            assert_eq!(out[0].probability(1), 1.0);

            let wide = Circuit::new("wide", 3);
            assert!(matches!(
                session.sample(&[wide], &[], None),
                Err(HalError::CapacityExceeded { .. })
            ));
        });
    }
}
