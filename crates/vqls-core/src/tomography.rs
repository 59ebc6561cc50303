//! Reconstruction of the ansatz state.
//!
//! [`SimulatorTomography`] reads the exact statevector. [`RealAmplitudeTomography`]
//! recovers real amplitudes from `n + 1` sampled circuits: the ansatz itself
//! gives the magnitudes, and the ansatz followed by H on qubit `q` gives the
//! relative sign of every pair of amplitudes that differ in bit `q`.
//! [`FullTomography`] measures all `3^n` Pauli product bases and rebuilds the
//! density matrix.

use std::sync::Arc;

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::warn;
use vqls_hal::Sampler;
use vqls_ir::{Circuit, Pauli, PauliString, Statevector};

use crate::error::{CoreResult, VqlsError};
use crate::hadamard::check_result_count;
use crate::linalg::mat_vec;

/// Sign products below this magnitude count as zero.
const SIGN_EPS: f64 = 1e-12;

/// Power-iteration cap when extracting the state from a density matrix.
const POWER_ITERATIONS: usize = 200;

/// Access to the amplitudes of `V(θ)|0⟩`.
pub trait Tomography {
    /// Amplitudes of the ansatz state, up to a global sign.
    fn statevector(&self, parameters: &[f64]) -> CoreResult<Vec<Complex64>>;

    /// Sign of every amplitude (`+1`, `-1`, or `0` when unresolved).
    fn relative_signs(&self, parameters: &[f64]) -> CoreResult<Vec<f64>>;
}

/// Available tomography methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TomographyKind {
    /// Exact statevector simulation.
    Simulator,
    /// Sampled reconstruction of real amplitudes.
    #[default]
    RealAmplitudes,
    /// Pauli-basis state tomography by linear inversion.
    Full,
}

/// Exact statevector of the bound ansatz.
#[derive(Debug, Clone)]
pub struct SimulatorTomography {
    ansatz: Circuit,
}

impl SimulatorTomography {
    pub fn new(ansatz: Circuit) -> Self {
        Self { ansatz }
    }
}

impl Tomography for SimulatorTomography {
    fn statevector(&self, parameters: &[f64]) -> CoreResult<Vec<Complex64>> {
        Ok(Statevector::from_circuit(&self.ansatz, parameters)?.into_amplitudes())
    }

    fn relative_signs(&self, parameters: &[f64]) -> CoreResult<Vec<f64>> {
        Ok(self
            .statevector(parameters)?
            .iter()
            .map(|a| sign(a.re))
            .collect())
    }
}

/// Sign-recovering tomography for ansatz states with real amplitudes.
pub struct RealAmplitudeTomography {
    num_qubits: usize,
    circuits: Vec<Circuit>,
    sampler: Arc<dyn Sampler>,
    shots: Option<u32>,
}

impl RealAmplitudeTomography {
    pub fn new(ansatz: &Circuit, sampler: Arc<dyn Sampler>, shots: Option<u32>) -> CoreResult<Self> {
        let num_qubits = ansatz.num_qubits();
        let mut circuits = vec![ansatz.clone().with_name(format!("{}_z", ansatz.name()))];
        for q in 0..num_qubits {
            let mut circuit = ansatz.clone().with_name(format!("{}_h{q}", ansatz.name()));
            circuit.h(q)?;
            circuits.push(circuit);
        }
        Ok(Self {
            num_qubits,
            circuits,
            sampler,
            shots,
        })
    }

    /// The ansatz followed by the `n` single-qubit H variants.
    pub fn circuits(&self) -> &[Circuit] {
        &self.circuits
    }

    fn samples(&self, parameters: &[f64]) -> CoreResult<Vec<Vec<f64>>> {
        let dim = 1 << self.num_qubits;
        let dists = self.sampler.sample(&self.circuits, parameters, self.shots)?;
        check_result_count(&dists, self.circuits.len(), "sampler")?;
        Ok(dists.iter().map(|d| d.to_dense(dim)).collect())
    }
}

/// Resolve amplitude signs from the plain distribution `samples[0]` and the
/// H-on-qubit-`q` distributions `samples[q + 1]`.
///
/// Each index is linked to its parent (lowest set bit cleared). For real
/// amplitudes `2 p_q[parent] - p_0[parent] - p_0[index] = 2 a_parent a_index`,
/// whose sign is the relative sign of the two. Index 0 is fixed to `+1`.
///
/// `samples` must hold `n + 1` distributions of length `2^n`.
pub fn signs_from_samples(samples: &[Vec<f64>]) -> CoreResult<Vec<f64>> {
    let Some(p0) = samples.first() else {
        return Err(VqlsError::DimensionMismatch(
            "no distributions to recover signs from".to_string(),
        ));
    };
    let num_qubits = samples.len() - 1;
    let dim = 1usize << num_qubits;
    if samples.iter().any(|p| p.len() != dim) {
        return Err(VqlsError::DimensionMismatch(format!(
            "{} distributions need {dim} probabilities each",
            samples.len()
        )));
    }
    let mut signs = vec![0.0; dim];
    signs[0] = 1.0;
    let mut broken = false;
    for index in 1..p0.len() {
        let q = index.trailing_zeros() as usize;
        let parent = index & (index - 1);
        let weight = sign(2.0 * samples[q + 1][parent] - p0[parent] - p0[index]);
        if weight == 0.0 && p0[index] > SIGN_EPS {
            broken = true;
        }
        signs[index] = signs[parent] * weight;
    }
    if broken {
        warn!("zero amplitude on a sign path, some amplitude signs are unresolved");
    }
    Ok(signs)
}

impl Tomography for RealAmplitudeTomography {
    fn statevector(&self, parameters: &[f64]) -> CoreResult<Vec<Complex64>> {
        let samples = self.samples(parameters)?;
        let signs = signs_from_samples(&samples)?;
        Ok(samples[0]
            .iter()
            .zip(&signs)
            .map(|(p, s)| Complex64::new(s * p.max(0.0).sqrt(), 0.0))
            .collect())
    }

    fn relative_signs(&self, parameters: &[f64]) -> CoreResult<Vec<f64>> {
        let samples = self.samples(parameters)?;
        signs_from_samples(&samples)
    }
}

const BASES: [Pauli; 3] = [Pauli::X, Pauli::Y, Pauli::Z];

/// Measurement letter of every qubit in basis `basis` (base-3 digits, qubit 0 lowest).
fn basis_letters(basis: usize, num_qubits: usize) -> Vec<Pauli> {
    (0..num_qubits)
        .map(|q| BASES[(basis / 3usize.pow(q as u32)) % 3])
        .collect()
}

/// Basis that diagonalizes `string`. Identity factors are read in Z.
fn basis_index(string: &PauliString) -> usize {
    string.paulis().iter().rev().fold(0, |acc, p| {
        acc * 3
            + match p {
                Pauli::X => 0,
                Pauli::Y => 1,
                Pauli::I | Pauli::Z => 2,
            }
    })
}

/// State tomography in the `3^n` Pauli product bases.
///
/// Every Pauli string is read from the basis that diagonalizes it, the
/// density matrix is `ρ = 2^{-n} Σ_P ⟨P⟩ P` and the state is its dominant
/// eigenvector, phased so that its largest amplitude is real and positive.
pub struct FullTomography {
    num_qubits: usize,
    circuits: Vec<Circuit>,
    sampler: Arc<dyn Sampler>,
    shots: Option<u32>,
}

impl FullTomography {
    pub fn new(ansatz: &Circuit, sampler: Arc<dyn Sampler>, shots: Option<u32>) -> CoreResult<Self> {
        let num_qubits = ansatz.num_qubits();
        let num_bases = 3usize.pow(num_qubits as u32);
        let mut circuits = Vec::with_capacity(num_bases);
        for basis in 0..num_bases {
            let letters = basis_letters(basis, num_qubits);
            let label: String = letters.iter().rev().map(|p| p.as_char()).collect();
            let mut circuit = ansatz.clone().with_name(format!("{}_{label}", ansatz.name()));
            for (q, letter) in letters.iter().enumerate() {
                match letter {
                    Pauli::X => {
                        circuit.h(q)?;
                    }
                    Pauli::Y => {
                        circuit.sdg(q)?.h(q)?;
                    }
                    Pauli::I | Pauli::Z => {}
                }
            }
            circuits.push(circuit);
        }
        Ok(Self {
            num_qubits,
            circuits,
            sampler,
            shots,
        })
    }

    /// One circuit per measurement basis.
    pub fn circuits(&self) -> &[Circuit] {
        &self.circuits
    }

    /// Linear-inversion estimate of the density matrix.
    pub fn density_matrix(&self, parameters: &[f64]) -> CoreResult<Array2<Complex64>> {
        let dim = 1usize << self.num_qubits;
        let dists = self.sampler.sample(&self.circuits, parameters, self.shots)?;
        check_result_count(&dists, self.circuits.len(), "sampler")?;
        let probabilities: Vec<Vec<f64>> = dists.iter().map(|d| d.to_dense(dim)).collect();

        let scale = 1.0 / dim as f64;
        let mut rho = Array2::<Complex64>::zeros((dim, dim));
        for string in PauliString::all(self.num_qubits) {
            let expectation: f64 = probabilities[basis_index(&string)]
                .iter()
                .enumerate()
                .map(|(k, p)| string.eigenvalue(k) * p)
                .sum();
            for col in 0..dim {
                let (row, phase) = string.apply_to_index(col);
                rho[[row, col]] += phase * (expectation * scale);
            }
        }
        Ok(rho)
    }
}

/// Dominant eigenvector of a positive semidefinite matrix, by power iteration
/// from the column with the largest diagonal entry.
fn dominant_eigenvector(rho: &Array2<Complex64>) -> Vec<Complex64> {
    let dim = rho.nrows();
    let start = (0..dim)
        .max_by(|&a, &b| rho[[a, a]].re.total_cmp(&rho[[b, b]].re))
        .unwrap_or(0);
    let mut v: Array1<Complex64> = rho.column(start).to_owned();
    for _ in 0..POWER_ITERATIONS {
        let next = mat_vec(rho, &v);
        let norm = next.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt();
        if norm < SIGN_EPS {
            break;
        }
        let next = next.mapv(|z| z / norm);
        let delta = next
            .iter()
            .zip(v.iter())
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, f64::max);
        v = next;
        if delta < SIGN_EPS {
            break;
        }
    }

    let pivot = v
        .iter()
        .copied()
        .max_by(|a, b| a.norm().total_cmp(&b.norm()))
        .unwrap_or_default();
    if pivot.norm() < SIGN_EPS {
        return v.to_vec();
    }
    let phase = pivot.conj() / pivot.norm();
    v.iter().map(|z| z * phase).collect()
}

impl Tomography for FullTomography {
    fn statevector(&self, parameters: &[f64]) -> CoreResult<Vec<Complex64>> {
        Ok(dominant_eigenvector(&self.density_matrix(parameters)?))
    }

    fn relative_signs(&self, parameters: &[f64]) -> CoreResult<Vec<f64>> {
        Ok(self
            .statevector(parameters)?
            .iter()
            .map(|a| sign(a.re))
            .collect())
    }
}

fn sign(x: f64) -> f64 {
    if x > SIGN_EPS {
        1.0
    } else if x < -SIGN_EPS {
        -1.0
    } else {
        0.0
    }
}
