//! Weighted sums of unitary circuits.

use ndarray::Array2;
use num_complex::Complex64;
use vqls_ir::{Circuit, Statevector};

use crate::error::{CoreResult, VqlsError};

/// One `c_i A_i` term.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitaryTerm {
    pub coeff: Complex64,
    pub circuit: Circuit,
}

/// `A = Σ_i c_i A_i` with every `A_i` given as a circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixDecomposition {
    num_qubits: usize,
    terms: Vec<UnitaryTerm>,
}

impl MatrixDecomposition {
    /// Pair coefficients with circuits. All circuits must share a width.
    pub fn from_terms(coeffs: Vec<Complex64>, circuits: Vec<Circuit>) -> CoreResult<Self> {
        if coeffs.len() != circuits.len() {
            return Err(VqlsError::InvalidDecomposition(format!(
                "{} coefficients for {} circuits",
                coeffs.len(),
                circuits.len()
            )));
        }
        let Some(first) = circuits.first() else {
            return Err(VqlsError::InvalidDecomposition(
                "a decomposition needs at least one term".to_string(),
            ));
        };
        let num_qubits = first.num_qubits();
        if let Some(bad) = circuits.iter().find(|c| c.num_qubits() != num_qubits) {
            return Err(VqlsError::InvalidDecomposition(format!(
                "circuit {} has {} qubits, expected {num_qubits}",
                bad.name(),
                bad.num_qubits()
            )));
        }
        if let Some(bad) = circuits.iter().find(|c| c.is_parameterized()) {
            return Err(VqlsError::InvalidDecomposition(format!(
                "circuit {} has free parameters",
                bad.name()
            )));
        }

        let terms = coeffs
            .into_iter()
            .zip(circuits)
            .map(|(coeff, circuit)| UnitaryTerm { coeff, circuit })
            .collect();
        Ok(Self { num_qubits, terms })
    }

    /// Same as [`from_terms`](Self::from_terms) with real coefficients.
    pub fn from_real_terms(coeffs: &[f64], circuits: Vec<Circuit>) -> CoreResult<Self> {
        Self::from_terms(
            coeffs.iter().map(|&c| Complex64::new(c, 0.0)).collect(),
            circuits,
        )
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Matrix dimension `2^n`.
    pub fn dim(&self) -> usize {
        1 << self.num_qubits
    }

    pub fn terms(&self) -> &[UnitaryTerm] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn coefficients(&self) -> Vec<Complex64> {
        self.terms.iter().map(|t| t.coeff).collect()
    }

    pub fn circuits(&self) -> impl Iterator<Item = &Circuit> {
        self.terms.iter().map(|t| &t.circuit)
    }

    /// Dense matrix `Σ_i c_i A_i`, column by column.
    pub fn recompose(&self) -> CoreResult<Array2<Complex64>> {
        let dim = self.dim();
        let mut matrix = Array2::<Complex64>::zeros((dim, dim));
        for term in &self.terms {
            for col in 0..dim {
                let mut basis = vec![Complex64::new(0.0, 0.0); dim];
                basis[col] = Complex64::new(1.0, 0.0);
                let mut state = Statevector::from_amplitudes(basis)?;
                state.evolve(&term.circuit, &[])?;
                for (row, amp) in state.amplitudes().iter().enumerate() {
                    matrix[[row, col]] += term.coeff * amp;
                }
            }
        }
        Ok(matrix)
    }
}
