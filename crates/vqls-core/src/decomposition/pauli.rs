//! Pauli-basis decomposition of dense matrices.

use ndarray::Array2;
use num_complex::Complex64;
use tracing::{debug, warn};
use vqls_ir::PauliString;

use super::unitary::MatrixDecomposition;
use crate::error::{CoreResult, VqlsError};

/// Coefficients below this modulus are dropped.
const COEFF_CUTOFF: f64 = 1e-12;
const HERMITIAN_TOL: f64 = 1e-10;

/// `A = Σ_i c_i P_i` over Pauli strings, with `c_i = tr(P_i A) / 2^n`.
#[derive(Debug, Clone, PartialEq)]
pub struct PauliDecomposition {
    strings: Vec<PauliString>,
    decomposition: MatrixDecomposition,
}

impl PauliDecomposition {
    /// Decompose a square matrix whose size is a power of two.
    pub fn new(matrix: &Array2<Complex64>) -> CoreResult<Self> {
        let (rows, cols) = matrix.dim();
        if rows != cols || rows < 2 || !rows.is_power_of_two() {
            return Err(VqlsError::InvalidMatrixShape { rows, cols });
        }
        if !is_hermitian(matrix) {
            warn!("the input matrix is not Hermitian");
        }

        let num_qubits = rows.trailing_zeros() as usize;
        let scale = 1.0 / rows as f64;
        let mut coeffs = Vec::new();
        let mut strings = Vec::new();

        for string in PauliString::all(num_qubits) {
            // tr(P A) = Σ_r P[j(r), r] A[r, j(r)] with P|r⟩ = phase |j(r)⟩
            let trace: Complex64 = (0..rows)
                .map(|r| {
                    let (j, phase) = string.apply_to_index(r);
                    phase * matrix[[r, j]]
                })
                .sum();
            let coeff = trace * scale;
            if coeff.norm() > COEFF_CUTOFF {
                coeffs.push(coeff);
                strings.push(string);
            }
        }

        if strings.is_empty() {
            return Err(VqlsError::InvalidDecomposition(
                "the zero matrix has no Pauli terms".to_string(),
            ));
        }
        debug!(num_qubits, terms = strings.len(), "pauli decomposition");

        let circuits = strings.iter().map(PauliString::to_circuit).collect();
        let decomposition = MatrixDecomposition::from_terms(coeffs, circuits)?;
        Ok(Self {
            strings,
            decomposition,
        })
    }

    /// Real-valued convenience constructor.
    pub fn from_real(matrix: &Array2<f64>) -> CoreResult<Self> {
        Self::new(&matrix.mapv(|x| Complex64::new(x, 0.0)))
    }

    pub fn num_qubits(&self) -> usize {
        self.decomposition.num_qubits()
    }

    pub fn strings(&self) -> &[PauliString] {
        &self.strings
    }

    pub fn coefficients(&self) -> Vec<Complex64> {
        self.decomposition.coefficients()
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// The decomposition as circuits.
    pub fn as_decomposition(&self) -> &MatrixDecomposition {
        &self.decomposition
    }

    pub fn into_decomposition(self) -> MatrixDecomposition {
        self.decomposition
    }

    /// Dense `Σ_i c_i P_i`, built from the strings directly.
    pub fn recompose(&self) -> Array2<Complex64> {
        let dim = self.decomposition.dim();
        let mut matrix = Array2::<Complex64>::zeros((dim, dim));
        for (string, term) in self.strings.iter().zip(self.decomposition.terms()) {
            for col in 0..dim {
                let (row, phase) = string.apply_to_index(col);
                matrix[[row, col]] += term.coeff * phase;
            }
        }
        matrix
    }
}

fn is_hermitian(matrix: &Array2<Complex64>) -> bool {
    let (n, _) = matrix.dim();
    (0..n).all(|i| (i..n).all(|j| (matrix[[i, j]] - matrix[[j, i]].conj()).norm() < HERMITIAN_TOL))
}
