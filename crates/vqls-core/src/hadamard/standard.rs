//! Estimator-based Hadamard test.

use num_complex::Complex64;
use vqls_hal::Estimator;
use vqls_ir::{Circuit, Observable};

use super::check_result_count;
use crate::error::{CoreResult, VqlsError};

/// Real and imaginary Hadamard-test circuits for one operator.
///
/// Qubit 0 is the control; the operator acts on qubits `1..=n`.
#[derive(Debug, Clone)]
pub struct HadamardTest {
    circuits: [Circuit; 2],
    observable: Observable,
}

impl HadamardTest {
    /// Build the test for `operator`, preparing the register with
    /// `initial_state` first when given.
    pub fn new(operator: &Circuit, initial_state: Option<&Circuit>) -> CoreResult<Self> {
        let n = operator.num_qubits();
        if let Some(init) = initial_state {
            if init.num_qubits() != n {
                return Err(VqlsError::DimensionMismatch(format!(
                    "operator has {n} qubits, initial state has {}",
                    init.num_qubits()
                )));
            }
        }

        let register: Vec<usize> = (1..=n).collect();
        let controlled = operator.controlled();
        let build = |imaginary: bool| -> CoreResult<Circuit> {
            let suffix = if imaginary { "im" } else { "re" };
            let mut circuit = Circuit::new(format!("hdmr_{}_{suffix}", operator.name()), n + 1);
            circuit.h(0)?;
            if let Some(init) = initial_state {
                circuit.append(init, &register)?;
            }
            circuit.compose(&controlled)?;
            if imaginary {
                circuit.sdg(0)?;
            }
            circuit.h(0)?;
            Ok(circuit)
        };

        Ok(Self {
            circuits: [build(false)?, build(true)?],
            observable: Observable::z_on(0, n + 1),
        })
    }

    /// Real-part and imaginary-part circuits, in that order.
    pub fn circuits(&self) -> &[Circuit] {
        &self.circuits
    }

    pub fn observable(&self) -> &Observable {
        &self.observable
    }

    /// `⟨ψ|O|ψ⟩`
    pub fn get_value(&self, estimator: &dyn Estimator, parameters: &[f64]) -> CoreResult<Complex64> {
        let values = estimator.estimate(
            &self.circuits,
            &[self.observable.clone(), self.observable.clone()],
            parameters,
        )?;
        check_result_count(&values, 2, "estimator")?;
        Ok(Complex64::new(values[0], values[1]))
    }
}

/// Many Hadamard tests evaluated in one estimator call.
#[derive(Debug, Clone)]
pub struct BatchHadamardTest {
    circuits: Vec<Circuit>,
    observables: Vec<Observable>,
}

impl BatchHadamardTest {
    pub fn new(tests: &[HadamardTest]) -> Self {
        let circuits = tests.iter().flat_map(|t| t.circuits.iter().cloned()).collect();
        let observables = tests
            .iter()
            .flat_map(|t| [t.observable.clone(), t.observable.clone()])
            .collect();
        Self {
            circuits,
            observables,
        }
    }

    pub fn len(&self) -> usize {
        self.circuits.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.circuits.is_empty()
    }

    /// One complex value per test, in input order.
    pub fn get_values(&self, estimator: &dyn Estimator, parameters: &[f64]) -> CoreResult<Vec<Complex64>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let values = estimator.estimate(&self.circuits, &self.observables, parameters)?;
        check_result_count(&values, self.circuits.len(), "estimator")?;
        Ok(values
            .chunks_exact(2)
            .map(|pair| Complex64::new(pair[0], pair[1]))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vqls_adapter_sim::StatevectorEstimator;
    use vqls_ir::{Param, Statevector};

    #[test]
    fn test_phase_operator_value() {
        // ⟨+|S|+⟩ = (1 + i) / 2
        let mut init = Circuit::new("plus", 1);
        init.h(0).unwrap();
        let mut op = Circuit::new("s", 1);
        op.s(0).unwrap();

        let test = HadamardTest::new(&op, Some(&init)).unwrap();
        let value = test.get_value(&StatevectorEstimator::new(), &[]).unwrap();
        assert!((value - Complex64::new(0.5, 0.5)).norm() < 1e-12);
    }

    #[test]
    fn test_matches_statevector_overlap() {
        let mut ansatz = Circuit::new("v", 2);
        ansatz
            .ry(Param::free(0), 0)
            .unwrap()
            .ry(Param::free(1), 1)
            .unwrap()
            .cx(0, 1)
            .unwrap();
        let mut op = Circuit::new("op", 2);
        op.x(0).unwrap().s(1).unwrap().cz(0, 1).unwrap();
        let params = [0.4, -1.1];

        let psi = Statevector::from_circuit(&ansatz, &params).unwrap();
        let mut o_psi = psi.clone();
        o_psi.evolve(&op, &[]).unwrap();
        let expected = psi.inner(&o_psi).unwrap();

        let tests = vec![
            HadamardTest::new(&op, Some(&ansatz)).unwrap(),
            HadamardTest::new(&Circuit::new("id", 2), Some(&ansatz)).unwrap(),
        ];
        let values = BatchHadamardTest::new(&tests)
            .get_values(&StatevectorEstimator::new(), &params)
            .unwrap();
        assert!((values[0] - expected).norm() < 1e-12);
        assert!((values[1] - Complex64::new(1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_width_mismatch() {
        let op = Circuit::new("op", 2);
        let init = Circuit::new("init", 3);
        assert!(matches!(
            HadamardTest::new(&op, Some(&init)),
            Err(VqlsError::DimensionMismatch(_))
        ));
    }
}
