//! Error types for the circuit representation.

use thiserror::Error;

/// Errors raised while building or evaluating circuits.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IrError {
    /// A qubit index is outside the circuit.
    #[error("qubit {qubit} out of range for a {num_qubits}-qubit circuit")]
    InvalidQubit { qubit: usize, num_qubits: usize },

    /// The same qubit appears twice in one instruction.
    #[error("qubit {0} used more than once in one instruction")]
    DuplicateQubit(usize),

    /// Not enough parameter values to bind a circuit.
    #[error("circuit needs {required} parameter values, got {provided}")]
    MissingParameters { required: usize, provided: usize },

    /// A qubit map does not cover the appended circuit.
    #[error("qubit map has {provided} entries, circuit has {expected} qubits")]
    QubitMapMismatch { expected: usize, provided: usize },

    /// Malformed Pauli label.
    #[error("invalid Pauli string: {0}")]
    InvalidPauli(String),

    /// Two objects that must share a size do not.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A state vector whose length is not a power of two.
    #[error("vector length {0} is not a power of two")]
    NotPowerOfTwo(usize),

    /// State preparation from a vector with zero norm.
    #[error("cannot prepare a state from the zero vector")]
    ZeroVector,
}

/// Result alias for circuit operations.
pub type IrResult<T> = Result<T, IrError>;
