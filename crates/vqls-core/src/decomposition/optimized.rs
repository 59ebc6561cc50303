//! Measurement-optimized Pauli decomposition.
//!
//! The unique contracted strings are grouped into qubit-wise commuting sets;
//! each set is measured with one circuit that rotates every qubit into the
//! shared eigenbasis of the group.

use std::f64::consts::FRAC_PI_2;

use ndarray::Array2;
use num_complex::Complex64;
use petgraph::graph::{NodeIndex, UnGraph};
use tracing::debug;
use vqls_ir::{Circuit, Pauli, PauliString};

use super::contracted::ContractedPauliDecomposition;
use super::pauli_overlaps;
use crate::error::{CoreResult, VqlsError};

/// Strings measured together.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementGroup {
    /// Indices into the unique contracted strings.
    pub members: Vec<usize>,
    /// Per-qubit union of the members' factors.
    pub shared_basis: PauliString,
    /// Rotation into the shared eigenbasis.
    pub basis_rotation: Circuit,
}

/// A contracted Pauli decomposition with its measurement grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedPauliDecomposition {
    contracted: ContractedPauliDecomposition,
    groups: Vec<MeasurementGroup>,
    group_of: Vec<usize>,
}

impl OptimizedPauliDecomposition {
    pub fn new(matrix: &Array2<Complex64>) -> CoreResult<Self> {
        Self::from_contracted(ContractedPauliDecomposition::new(matrix)?)
    }

    pub fn from_contracted(contracted: ContractedPauliDecomposition) -> CoreResult<Self> {
        let strings = contracted.unique_strings();
        let colouring = colour_commuting_groups(strings);
        let num_groups = colouring.iter().copied().max().map_or(0, |c| c + 1);

        let mut members = vec![Vec::new(); num_groups];
        for (string_idx, &colour) in colouring.iter().enumerate() {
            members[colour].push(string_idx);
        }

        let num_qubits = contracted.num_qubits();
        let groups = members
            .into_iter()
            .map(|members| {
                let shared_basis = shared_basis(num_qubits, members.iter().map(|&m| &strings[m]));
                let basis_rotation = basis_rotation(&shared_basis)?;
                Ok(MeasurementGroup {
                    members,
                    shared_basis,
                    basis_rotation,
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        debug!(
            unique_strings = strings.len(),
            groups = groups.len(),
            "grouped contracted strings"
        );

        Ok(Self {
            contracted,
            groups,
            group_of: colouring,
        })
    }

    pub fn contracted(&self) -> &ContractedPauliDecomposition {
        &self.contracted
    }

    pub fn num_qubits(&self) -> usize {
        self.contracted.num_qubits()
    }

    pub fn groups(&self) -> &[MeasurementGroup] {
        &self.groups
    }

    /// Basis rotation circuits, one per group.
    pub fn basis_rotations(&self) -> impl Iterator<Item = &Circuit> {
        self.groups.iter().map(|g| &g.basis_rotation)
    }

    /// Pair values `⟨x|P_i P_j|x⟩` from one probability vector per group,
    /// each sampled after the group's basis rotation.
    pub fn norm_values(&self, group_distributions: &[Vec<f64>]) -> CoreResult<Vec<Complex64>> {
        if group_distributions.len() != self.groups.len() {
            return Err(VqlsError::DimensionMismatch(format!(
                "{} distributions for {} measurement groups",
                group_distributions.len(),
                self.groups.len()
            )));
        }
        let unique_values: Vec<Complex64> = self
            .contracted
            .unique_strings()
            .iter()
            .zip(&self.group_of)
            .map(|(string, &group)| {
                let value: f64 = group_distributions[group]
                    .iter()
                    .enumerate()
                    .map(|(k, p)| string.eigenvalue(k) * p)
                    .sum();
                Complex64::new(value, 0.0)
            })
            .collect();
        self.contracted.post_process_norm_values(&unique_values)
    }

    /// `⟨b|P_i|x⟩` for every decomposition term.
    pub fn overlap_values(&self, amplitudes: &[Complex64], rhs: &[Complex64]) -> CoreResult<Vec<Complex64>> {
        pauli_overlaps(self.contracted.pauli().strings(), amplitudes, rhs)
    }
}

/// Greedy largest-first colouring of the complement of the qubit-wise
/// commutation graph. Strings sharing a colour commute qubit-wise.
fn colour_commuting_groups(strings: &[PauliString]) -> Vec<usize> {
    let mut qwc: UnGraph<usize, ()> = UnGraph::new_undirected();
    let nodes: Vec<NodeIndex> = (0..strings.len()).map(|i| qwc.add_node(i)).collect();
    for i in 0..strings.len() {
        for j in i + 1..strings.len() {
            if strings[i].qubit_wise_commutes(&strings[j]) {
                qwc.add_edge(nodes[i], nodes[j], ());
            }
        }
    }

    let mut conflicts: UnGraph<usize, ()> = UnGraph::new_undirected();
    let conflict_nodes: Vec<NodeIndex> = (0..strings.len()).map(|i| conflicts.add_node(i)).collect();
    for i in 0..strings.len() {
        for j in i + 1..strings.len() {
            if !qwc.contains_edge(nodes[i], nodes[j]) {
                conflicts.add_edge(conflict_nodes[i], conflict_nodes[j], ());
            }
        }
    }

    let mut order: Vec<NodeIndex> = conflict_nodes.clone();
    order.sort_by_key(|&n| std::cmp::Reverse(conflicts.neighbors(n).count()));

    let mut colour: Vec<Option<usize>> = vec![None; strings.len()];
    for node in order {
        let taken: Vec<usize> = conflicts
            .neighbors(node)
            .filter_map(|nb| colour[conflicts[nb]])
            .collect();
        let free = (0..).find(|c| !taken.contains(c)).unwrap_or(0);
        colour[conflicts[node]] = Some(free);
    }
    colour.into_iter().map(|c| c.unwrap_or(0)).collect()
}

fn shared_basis<'a>(num_qubits: usize, members: impl Iterator<Item = &'a PauliString>) -> PauliString {
    let mut basis = vec![Pauli::I; num_qubits];
    for string in members {
        for (q, &p) in string.paulis().iter().enumerate() {
            if !p.is_identity() {
                basis[q] = p;
            }
        }
    }
    PauliString::new(basis)
}

fn basis_rotation(basis: &PauliString) -> CoreResult<Circuit> {
    let mut circuit = Circuit::new(format!("basis_{basis}"), basis.num_qubits());
    for (q, p) in basis.paulis().iter().enumerate() {
        match p {
            Pauli::X => {
                circuit.ry(-FRAC_PI_2, q)?;
            }
            Pauli::Y => {
                circuit.rx(FRAC_PI_2, q)?;
            }
            Pauli::I | Pauli::Z => {}
        }
    }
    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decomposition::pauli_expectation;
    use ndarray::array;
    use vqls_ir::Statevector;

    fn matrix() -> Array2<Complex64> {
        array![
            [1.0, 0.2, -0.3, 0.0],
            [0.2, 2.0, 0.5, 0.1],
            [-0.3, 0.5, 0.7, 0.4],
            [0.0, 0.1, 0.4, 1.3]
        ]
        .mapv(|x| Complex64::new(x, 0.0))
    }

    #[test]
    fn test_groups_commute_qubit_wise() {
        let dec = OptimizedPauliDecomposition::new(&matrix()).unwrap();
        let strings = dec.contracted().unique_strings();
        let mut seen = vec![false; strings.len()];
        for group in dec.groups() {
            for &a in &group.members {
                seen[a] = true;
                for &b in &group.members {
                    assert!(strings[a].qubit_wise_commutes(&strings[b]));
                }
            }
        }
        assert!(seen.into_iter().all(|s| s));
        assert!(dec.groups().len() <= strings.len());
    }

    #[test]
    fn test_colouring_separates_conflicts() {
        let strings: Vec<PauliString> = ["XI", "ZI", "IX", "XX"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let colours = colour_commuting_groups(&strings);
        // XI and ZI clash on qubit 1
        assert_ne!(colours[0], colours[1]);
        // XX commutes qubit-wise with XI and IX
        assert_eq!(colours.iter().max(), Some(&1));
    }

    #[test]
    fn test_norm_values_from_exact_distributions() {
        let dec = OptimizedPauliDecomposition::new(&matrix()).unwrap();
        let mut prep = Circuit::new("x", 2);
        prep.ry(0.7, 0).unwrap().ry(-1.3, 1).unwrap().cx(0, 1).unwrap().ry(0.4, 1).unwrap();
        let x = Statevector::from_circuit(&prep, &[]).unwrap();

        let distributions: Vec<Vec<f64>> = dec
            .basis_rotations()
            .map(|rot| {
                let mut state = x.clone();
                state.evolve(rot, &[]).unwrap();
                state.probabilities()
            })
            .collect();
        let measured = dec.norm_values(&distributions).unwrap();

        let contracted = dec.contracted();
        let exact: Vec<Complex64> = contracted
            .unique_strings()
            .iter()
            .map(|p| pauli_expectation(p, x.amplitudes()).unwrap())
            .collect();
        let expected = contracted.post_process_norm_values(&exact).unwrap();
        for (m, e) in measured.iter().zip(&expected) {
            assert!((m - e).norm() < 1e-10, "measured {m}, expected {e}");
        }
    }

    #[test]
    fn test_basis_rotation_gates() {
        let basis: PauliString = "YZX".parse().unwrap();
        let rot = basis_rotation(&basis).unwrap();
        let names: Vec<&str> = rot.instructions().iter().map(|i| i.gate.name()).collect();
        assert_eq!(names, vec!["ry", "rx"]);
        assert_eq!(rot.instructions()[0].target, 0);
        assert_eq!(rot.instructions()[1].target, 2);
    }
}
