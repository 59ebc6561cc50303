//! HAL error types.

use thiserror::Error;
use vqls_ir::IrError;

/// Errors raised by primitives and sessions.
#[derive(Debug, Error)]
pub enum HalError {
    /// The request is malformed (length mismatches, empty batches, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A circuit is wider than the backend allows.
    #[error("circuit uses {required} qubits, backend {backend} supports {available}")]
    CapacityExceeded {
        backend: String,
        required: usize,
        available: usize,
    },

    /// A call was made on a closed session.
    #[error("session {0} is closed")]
    SessionClosed(String),

    /// Circuit evaluation failed.
    #[error("circuit error: {0}")]
    Circuit(#[from] IrError),

    /// Backend-side failure.
    #[error("execution failed: {0}")]
    Execution(String),
}

/// Result alias for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
