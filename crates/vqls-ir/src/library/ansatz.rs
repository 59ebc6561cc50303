//! Hardware-efficient ansatz circuits.
//!
//! The real-amplitudes ansatz alternates layers of RY rotations with CX
//! entanglers. Every amplitude it produces is real, which is what the
//! sign-recovering tomography in `vqls-core` assumes.

use serde::{Deserialize, Serialize};

use crate::circuit::{Circuit, Param};

/// Entangler layout between rotation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entanglement {
    /// CX(i, i+1)
    Linear,
    /// CX(i, j) for every i < j
    #[default]
    Full,
    /// Linear plus CX(n-1, 0)
    Circular,
}

impl Entanglement {
    /// (control, target) pairs for `n` qubits.
    pub fn pairs(self, n: usize) -> Vec<(usize, usize)> {
        if n < 2 {
            return Vec::new();
        }
        match self {
            Entanglement::Linear => (0..n - 1).map(|i| (i, i + 1)).collect(),
            Entanglement::Full => (0..n)
                .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
                .collect(),
            Entanglement::Circular => {
                let mut pairs: Vec<(usize, usize)> = (0..n - 1).map(|i| (i, i + 1)).collect();
                if n > 2 {
                    pairs.push((n - 1, 0));
                }
                pairs
            }
        }
    }
}

/// Number of free parameters of [`real_amplitudes`].
pub fn num_parameters(num_qubits: usize, reps: usize) -> usize {
    num_qubits * (reps + 1)
}

/// Real-amplitudes ansatz with `reps` entangling layers.
///
/// Layout: `[RY layer, entangler] × reps`, then a final RY layer. Parameter
/// `k * num_qubits + q` drives the RY on qubit `q` in layer `k`.
pub fn real_amplitudes(num_qubits: usize, reps: usize, entanglement: Entanglement) -> Circuit {
    let mut circuit = Circuit::new("real_amplitudes", num_qubits);
    let pairs = entanglement.pairs(num_qubits);

    for layer in 0..=reps {
        for q in 0..num_qubits {
            circuit
                .ry(Param::free(layer * num_qubits + q), q)
                .expect("qubit index is within the ansatz width");
        }
        if layer < reps {
            for &(control, target) in &pairs {
                circuit
                    .cx(control, target)
                    .expect("entangler pairs are within the ansatz width");
            }
        }
    }

    circuit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statevector::Statevector;

    #[test]
    fn test_parameter_count() {
        let c = real_amplitudes(3, 2, Entanglement::Linear);
        assert_eq!(c.num_parameters(), num_parameters(3, 2));
        assert_eq!(c.num_parameters(), 9);
        // 9 rotations + 2 layers of 2 CX
        assert_eq!(c.len(), 13);
    }

    #[test]
    fn test_entanglement_pairs() {
        assert_eq!(Entanglement::Linear.pairs(3), vec![(0, 1), (1, 2)]);
        assert_eq!(Entanglement::Full.pairs(3), vec![(0, 1), (0, 2), (1, 2)]);
        assert_eq!(
            Entanglement::Circular.pairs(3),
            vec![(0, 1), (1, 2), (2, 0)]
        );
        assert!(Entanglement::Full.pairs(1).is_empty());
    }

    #[test]
    fn test_amplitudes_are_real() {
        let c = real_amplitudes(2, 3, Entanglement::Full);
        let params: Vec<f64> = (0..c.num_parameters()).map(|k| 0.3 * k as f64 - 1.0).collect();
        let sv = Statevector::from_circuit(&c, &params).unwrap();
        assert!(sv.amplitudes().iter().all(|a| a.im.abs() < 1e-12));
        assert!((sv.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_parameters_give_ground_state() {
        let c = real_amplitudes(2, 1, Entanglement::Linear);
        let sv = Statevector::from_circuit(&c, &vec![0.0; c.num_parameters()]).unwrap();
        assert!((sv.probabilities()[0] - 1.0).abs() < 1e-12);
    }
}
