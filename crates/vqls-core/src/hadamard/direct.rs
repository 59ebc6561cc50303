//! Direct measurement of the ansatz.

use vqls_hal::Sampler;
use vqls_ir::Circuit;

use super::check_result_count;
use crate::error::{CoreResult, VqlsError};

/// The ansatz, optionally followed by a basis rotation, sampled in the
/// computational basis.
#[derive(Debug, Clone)]
pub struct DirectHadamardTest {
    circuit: Circuit,
    shots: Option<u32>,
}

impl DirectHadamardTest {
    pub fn new(ansatz: &Circuit, basis_rotation: Option<&Circuit>, shots: Option<u32>) -> CoreResult<Self> {
        let mut circuit = ansatz.clone();
        if let Some(rotation) = basis_rotation {
            if rotation.num_qubits() != ansatz.num_qubits() {
                return Err(VqlsError::DimensionMismatch(format!(
                    "ansatz has {} qubits, basis rotation has {}",
                    ansatz.num_qubits(),
                    rotation.num_qubits()
                )));
            }
            circuit.compose(rotation)?;
            circuit = circuit.with_name(format!("{}_{}", ansatz.name(), rotation.name()));
        }
        Ok(Self { circuit, shots })
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Dense probability vector.
    pub fn get_probabilities(&self, sampler: &dyn Sampler, parameters: &[f64]) -> CoreResult<Vec<f64>> {
        let dists = sampler.sample(std::slice::from_ref(&self.circuit), parameters, self.shots)?;
        check_result_count(&dists, 1, "sampler")?;
        Ok(dists[0].to_dense(1 << self.circuit.num_qubits()))
    }
}

/// Many direct measurements sampled in one call.
#[derive(Debug, Clone)]
pub struct BatchDirectHadamardTest {
    circuits: Vec<Circuit>,
    shots: Option<u32>,
}

impl BatchDirectHadamardTest {
    pub fn new(tests: &[DirectHadamardTest]) -> Self {
        Self {
            circuits: tests.iter().map(|t| t.circuit.clone()).collect(),
            shots: tests.first().and_then(|t| t.shots),
        }
    }

    pub fn len(&self) -> usize {
        self.circuits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circuits.is_empty()
    }

    /// One dense probability vector per test.
    pub fn get_values(&self, sampler: &dyn Sampler, parameters: &[f64]) -> CoreResult<Vec<Vec<f64>>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let dists = sampler.sample(&self.circuits, parameters, self.shots)?;
        check_result_count(&dists, self.circuits.len(), "sampler")?;
        Ok(dists
            .iter()
            .zip(&self.circuits)
            .map(|(d, c)| d.to_dense(1 << c.num_qubits()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use vqls_adapter_sim::StatevectorSampler;
    use vqls_ir::Param;

    #[test]
    fn test_rotated_measurement() {
        let mut ansatz = Circuit::new("v", 1);
        ansatz.ry(Param::free(0), 0).unwrap();
        let mut rot = Circuit::new("to_x", 1);
        rot.ry(-std::f64::consts::FRAC_PI_2, 0).unwrap();

        let sampler = StatevectorSampler::new();
        let tests = [
            DirectHadamardTest::new(&ansatz, None, None).unwrap(),
            DirectHadamardTest::new(&ansatz, Some(&rot), None).unwrap(),
        ];
        // RY(π/2)|0⟩ = |+⟩
        let values = BatchDirectHadamardTest::new(&tests)
            .get_values(&sampler, &[std::f64::consts::FRAC_PI_2])
            .unwrap();
        assert_relative_eq!(values[0][0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(values[1][0], 1.0, epsilon = 1e-12);

        let single = tests[1]
            .get_probabilities(&sampler, &[std::f64::consts::FRAC_PI_2])
            .unwrap();
        assert_eq!(single.len(), 2);
        assert_relative_eq!(single[1], 0.0, epsilon = 1e-12);
    }
}
