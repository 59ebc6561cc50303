//! Sampler-based Hadamard overlap test.

use num_complex::Complex64;
use vqls_hal::{QuasiDistribution, Sampler};
use vqls_ir::Circuit;

use super::check_result_count;
use crate::error::{CoreResult, VqlsError};

/// Circuits computing `⟨0|U†A_lV|0⟩⟨0|V†A_m†U|0⟩` on `2n + 1` qubits.
///
/// Qubit 0 is the control, register 0 (`1..=n`) holds `V|0⟩` and register 1
/// (`n+1..=2n`) holds `U|0⟩`. A Bell-basis measurement of the two registers
/// turns the swap overlap into a parity of the sampled bitstrings.
#[derive(Debug, Clone)]
pub struct HadamardOverlapTest {
    circuits: [Circuit; 2],
    operator_qubits: usize,
    shots: Option<u32>,
}

impl HadamardOverlapTest {
    /// Build the test for `[U, A_l, A_m]`, with `V` as `initial_state`.
    pub fn new(
        u: &Circuit,
        a_l: &Circuit,
        a_m: &Circuit,
        initial_state: Option<&Circuit>,
        shots: Option<u32>,
    ) -> CoreResult<Self> {
        let n = a_l.num_qubits();
        let widths = [
            Some(u.num_qubits()),
            Some(a_m.num_qubits()),
            initial_state.map(Circuit::num_qubits),
        ];
        if let Some(bad) = widths.into_iter().flatten().find(|&w| w != n) {
            return Err(VqlsError::DimensionMismatch(format!(
                "overlap test operators must all act on {n} qubits, found {bad}"
            )));
        }

        let reg0: Vec<usize> = (1..=n).collect();
        let reg1: Vec<usize> = (n + 1..=2 * n).collect();
        let ctrl_reg0: Vec<usize> = std::iter::once(0).chain(reg0.iter().copied()).collect();
        let ctrl_reg1: Vec<usize> = std::iter::once(0).chain(reg1.iter().copied()).collect();
        let c_al = a_l.controlled();
        let c_am_dg = a_m.inverse().controlled();

        let build = |imaginary: bool| -> CoreResult<Circuit> {
            let suffix = if imaginary { "im" } else { "re" };
            let name = format!("hdmr_overlap_{}_{}_{suffix}", a_l.name(), a_m.name());
            let mut circuit = Circuit::new(name, 2 * n + 1);
            circuit.h(0)?;
            if let Some(init) = initial_state {
                circuit.append(init, &reg0)?;
            }
            circuit.append(u, &reg1)?;
            circuit.append(&c_al, &ctrl_reg0)?;
            circuit.append(&c_am_dg, &ctrl_reg1)?;
            for (&q0, &q1) in reg0.iter().zip(&reg1) {
                circuit.cx(q0, q1)?;
            }
            if imaginary {
                circuit.sdg(0)?;
            }
            circuit.h(0)?;
            for &q0 in &reg0 {
                circuit.h(q0)?;
            }
            Ok(circuit)
        };

        Ok(Self {
            circuits: [build(false)?, build(true)?],
            operator_qubits: n,
            shots,
        })
    }

    pub fn circuits(&self) -> &[Circuit] {
        &self.circuits
    }

    /// `Σ_k p_k (-1)^{popcount(r0 & r1)} (-1)^{ctrl}` over sampled outcomes `k`.
    pub fn post_process(&self, distribution: &QuasiDistribution) -> f64 {
        let n = self.operator_qubits;
        let mask = (1usize << n) - 1;
        distribution
            .iter()
            .map(|(k, p)| {
                let ctrl = k & 1;
                let r0 = (k >> 1) & mask;
                let r1 = (k >> (n + 1)) & mask;
                let odd = ((r0 & r1).count_ones() as usize + ctrl) % 2 == 1;
                if odd { -p } else { p }
            })
            .sum()
    }

    pub fn get_value(&self, sampler: &dyn Sampler, parameters: &[f64]) -> CoreResult<Complex64> {
        let dists = sampler.sample(&self.circuits, parameters, self.shots)?;
        check_result_count(&dists, self.circuits.len(), "sampler")?;
        Ok(Complex64::new(
            self.post_process(&dists[0]),
            self.post_process(&dists[1]),
        ))
    }
}

/// Many overlap tests sampled in one call.
#[derive(Debug, Clone)]
pub struct BatchHadamardOverlapTest {
    tests: Vec<HadamardOverlapTest>,
    circuits: Vec<Circuit>,
    shots: Option<u32>,
}

impl BatchHadamardOverlapTest {
    /// Batch `tests`; the first test's shot count applies to all.
    pub fn new(tests: Vec<HadamardOverlapTest>) -> Self {
        let circuits = tests.iter().flat_map(|t| t.circuits.iter().cloned()).collect();
        let shots = tests.first().and_then(|t| t.shots);
        Self {
            tests,
            circuits,
            shots,
        }
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn get_values(&self, sampler: &dyn Sampler, parameters: &[f64]) -> CoreResult<Vec<Complex64>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let dists = sampler.sample(&self.circuits, parameters, self.shots)?;
        check_result_count(&dists, self.circuits.len(), "sampler")?;
        Ok(self
            .tests
            .iter()
            .zip(dists.chunks_exact(2))
            .map(|(test, pair)| {
                Complex64::new(test.post_process(&pair[0]), test.post_process(&pair[1]))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vqls_adapter_sim::StatevectorSampler;
    use vqls_ir::{Param, Statevector};

    fn overlap(u: &Circuit, a: &Circuit, v: &Circuit, params: &[f64]) -> Complex64 {
        let u_state = Statevector::from_circuit(u, &[]).unwrap();
        let mut av = Statevector::from_circuit(v, params).unwrap();
        av.evolve(a, &[]).unwrap();
        u_state.inner(&av).unwrap()
    }

    #[test]
    fn test_two_qubit_overlap_product() {
        let mut u = Circuit::new("u", 2);
        u.ry(0.8, 0).unwrap().h(1).unwrap().cx(1, 0).unwrap();
        let mut v = Circuit::new("v", 2);
        v.ry(Param::free(0), 0).unwrap().ry(Param::free(1), 1).unwrap().cx(0, 1).unwrap();
        let mut a_l = Circuit::new("al", 2);
        a_l.x(0).unwrap().z(1).unwrap();
        let mut a_m = Circuit::new("am", 2);
        a_m.y(1).unwrap();
        let params = [0.3, 1.9];

        let expected = overlap(&u, &a_l, &v, &params) * overlap(&u, &a_m, &v, &params).conj();
        let test = HadamardOverlapTest::new(&u, &a_l, &a_m, Some(&v), None).unwrap();
        let value = test.get_value(&StatevectorSampler::new(), &params).unwrap();
        assert!((value - expected).norm() < 1e-10, "got {value}, want {expected}");
    }

    #[test]
    fn test_batch_matches_single() {
        let mut u = Circuit::new("u", 1);
        u.h(0).unwrap();
        let mut v = Circuit::new("v", 1);
        v.ry(Param::free(0), 0).unwrap();
        let id = Circuit::new("id", 1);
        let mut z = Circuit::new("z", 1);
        z.z(0).unwrap();
        let params = [0.6];
        let sampler = StatevectorSampler::new();

        let single = HadamardOverlapTest::new(&u, &z, &id, Some(&v), None)
            .unwrap()
            .get_value(&sampler, &params)
            .unwrap();
        let batch = BatchHadamardOverlapTest::new(vec![
            HadamardOverlapTest::new(&u, &id, &id, Some(&v), None).unwrap(),
            HadamardOverlapTest::new(&u, &z, &id, Some(&v), None).unwrap(),
        ])
        .get_values(&sampler, &params)
        .unwrap();
        assert_eq!(batch.len(), 2);
        assert!((batch[1] - single).norm() < 1e-12);
        let h = overlap(&u, &id, &v, &params);
        assert!((batch[0] - h * h.conj()).norm() < 1e-10);
    }

    #[test]
    fn test_width_mismatch() {
        let a = Circuit::new("a", 2);
        let b = Circuit::new("b", 3);
        assert!(matches!(
            HadamardOverlapTest::new(&a, &a, &b, None, None),
            Err(VqlsError::DimensionMismatch(_))
        ));
    }
}
