//! Statevector estimator.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vqls_hal::{Estimator, HalError, HalResult};
use vqls_ir::{Circuit, Observable, Statevector};

/// Estimator backed by exact statevector simulation.
///
/// With `shots` set, each Pauli term is estimated from `shots` simulated ±1
/// outcomes instead of its exact expectation value.
pub struct StatevectorEstimator {
    shots: Option<u32>,
    rng: Mutex<StdRng>,
}

impl StatevectorEstimator {
    /// Exact estimator.
    pub fn new() -> Self {
        Self {
            shots: None,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Estimate every Pauli term from `shots` outcomes.
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = Some(shots);
        self
    }

    /// Seed the shot-noise RNG.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    fn sampled(&self, exact: f64, shots: u32) -> HalResult<f64> {
        let p_plus = ((1.0 + exact) / 2.0).clamp(0.0, 1.0);
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| HalError::Execution("estimator RNG lock poisoned".to_string()))?;
        let plus = (0..shots).filter(|_| rng.gen_bool(p_plus)).count() as f64;
        Ok(2.0 * plus / f64::from(shots) - 1.0)
    }
}

impl Default for StatevectorEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimator for StatevectorEstimator {
    fn estimate(
        &self,
        circuits: &[Circuit],
        observables: &[Observable],
        parameters: &[f64],
    ) -> HalResult<Vec<f64>> {
        if circuits.len() != observables.len() {
            return Err(HalError::InvalidInput(format!(
                "{} circuits but {} observables",
                circuits.len(),
                observables.len()
            )));
        }

        circuits
            .iter()
            .zip(observables)
            .map(|(circuit, observable)| {
                let state = Statevector::from_circuit(circuit, parameters)?;
                match self.shots {
                    None => Ok(state.expectation_observable(observable)?),
                    Some(0) => Err(HalError::InvalidInput("shots must be positive".to_string())),
                    Some(shots) => {
                        let mut total = 0.0;
                        for (coeff, pauli) in observable.terms() {
                            let exact = state.expectation(pauli)?;
                            total += coeff.re * self.sampled(exact, shots)?;
                        }
                        Ok(total)
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_z_expectation() {
        let mut c = Circuit::new("x", 2);
        c.x(1).unwrap();
        let est = StatevectorEstimator::new();
        let values = est
            .estimate(
                &[c.clone(), c],
                &[Observable::z_on(0, 2), Observable::z_on(1, 2)],
                &[],
            )
            .unwrap();
        assert_relative_eq!(values[0], 1.0);
        assert_relative_eq!(values[1], -1.0);
    }

    #[test]
    fn test_shot_noise_stays_close() {
        let mut c = Circuit::new("h", 1);
        c.ry(1.0, 0).unwrap();
        let est = StatevectorEstimator::new().with_shots(4000).with_seed(3);
        let value = est.estimate(&[c], &[Observable::z_on(0, 1)], &[]).unwrap()[0];
        assert!((value - 1.0f64.cos()).abs() < 0.05);
    }

    #[test]
    fn test_length_mismatch() {
        let est = StatevectorEstimator::new();
        assert!(matches!(
            est.estimate(&[Circuit::new("a", 1)], &[], &[]),
            Err(HalError::InvalidInput(_))
        ));
    }
}
