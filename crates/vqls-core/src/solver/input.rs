//! Accepted forms of the linear system.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use vqls_ir::Circuit;

use crate::decomposition::{MatrixDecomposition, PauliDecomposition};
use crate::error::{CoreResult, VqlsError};
use crate::linalg;

/// Left-hand side of `A x = b`.
#[derive(Debug, Clone)]
pub enum MatrixInput {
    /// Dense matrix, decomposed into Pauli strings by the solver.
    Dense(Array2<Complex64>),
    /// Weighted list of unitary circuits.
    Decomposition(MatrixDecomposition),
}

impl From<Array2<Complex64>> for MatrixInput {
    fn from(m: Array2<Complex64>) -> Self {
        MatrixInput::Dense(m)
    }
}

impl From<Array2<f64>> for MatrixInput {
    fn from(m: Array2<f64>) -> Self {
        MatrixInput::Dense(linalg::complexify_matrix(&m))
    }
}

impl From<&Array2<f64>> for MatrixInput {
    fn from(m: &Array2<f64>) -> Self {
        MatrixInput::Dense(linalg::complexify_matrix(m))
    }
}

impl From<MatrixDecomposition> for MatrixInput {
    fn from(d: MatrixDecomposition) -> Self {
        MatrixInput::Decomposition(d)
    }
}

impl From<PauliDecomposition> for MatrixInput {
    fn from(d: PauliDecomposition) -> Self {
        MatrixInput::Decomposition(d.into_decomposition())
    }
}

impl MatrixInput {
    pub(crate) fn into_dense(self, solver: &str) -> CoreResult<Array2<Complex64>> {
        match self {
            MatrixInput::Dense(m) => Ok(m),
            MatrixInput::Decomposition(_) => Err(VqlsError::UnsupportedInput(format!(
                "{solver} needs a dense matrix"
            ))),
        }
    }
}

/// Right-hand side of `A x = b`.
#[derive(Debug, Clone)]
pub enum VectorInput {
    /// Dense vector, loaded with a state-preparation circuit when needed.
    Dense(Array1<Complex64>),
    /// Circuit `U` with `U|0⟩ = |b⟩`.
    Circuit(Circuit),
}

impl From<Array1<Complex64>> for VectorInput {
    fn from(v: Array1<Complex64>) -> Self {
        VectorInput::Dense(v)
    }
}

impl From<Array1<f64>> for VectorInput {
    fn from(v: Array1<f64>) -> Self {
        VectorInput::Dense(linalg::complexify_vector(&v))
    }
}

impl From<&Array1<f64>> for VectorInput {
    fn from(v: &Array1<f64>) -> Self {
        VectorInput::Dense(linalg::complexify_vector(v))
    }
}

impl From<Vec<f64>> for VectorInput {
    fn from(v: Vec<f64>) -> Self {
        Array1::from(v).into()
    }
}

impl From<Circuit> for VectorInput {
    fn from(c: Circuit) -> Self {
        VectorInput::Circuit(c)
    }
}

impl VectorInput {
    /// `b / ‖b‖` for dense inputs.
    pub(crate) fn into_normalized(self, solver: &str) -> CoreResult<Vec<Complex64>> {
        match self {
            VectorInput::Dense(v) => {
                if linalg::norm(&v) == 0.0 {
                    return Err(vqls_ir::IrError::ZeroVector.into());
                }
                Ok(linalg::normalize(&v).to_vec())
            }
            VectorInput::Circuit(_) => Err(VqlsError::UnsupportedInput(format!(
                "{solver} needs a dense right-hand side"
            ))),
        }
    }
}
