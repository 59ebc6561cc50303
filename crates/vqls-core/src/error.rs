//! Solver error types.

use thiserror::Error;
use vqls_hal::HalError;
use vqls_ir::IrError;

/// Errors raised by the variational linear solvers.
#[derive(Debug, Error)]
pub enum VqlsError {
    /// A sampler or estimator call failed.
    #[error("the primitive to evaluate the Hadamard test failed: {0}")]
    Primitive(#[from] HalError),

    /// Building or simulating a circuit failed.
    #[error("circuit error: {0}")]
    Circuit(#[from] IrError),

    /// The ansatz has no free parameters to optimize.
    #[error("the ansatz must be parameterized, but has 0 free parameters")]
    UnparameterizedAnsatz,

    /// Matrix, vector, ansatz or decomposition sizes disagree.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// The matrix is not square with a power-of-two size.
    #[error("matrix must be square with a power-of-two size, got {rows}x{cols}")]
    InvalidMatrixShape { rows: usize, cols: usize },

    /// Gaussian elimination hit a zero pivot.
    #[error("matrix is singular")]
    SingularMatrix,

    /// The overlap test or a sampled tomography has no sampler.
    #[error("a sampler is required by the overlap Hadamard test and the sampled tomographies")]
    MissingSampler,

    /// A solver was handed an input form it does not support.
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// A decomposition with no terms, mixed widths or mismatched counts.
    #[error("invalid decomposition: {0}")]
    InvalidDecomposition(String),

    /// The initial point does not match the ansatz.
    #[error("initial point has {provided} values, ansatz has {expected} parameters")]
    InitialPointMismatch { expected: usize, provided: usize },

    /// Invalid optimizer settings.
    #[error(transparent)]
    Optimizer(#[from] OptimizerError),
}

/// Errors raised while configuring a classical optimizer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizerError {
    #[error("invalid optimizer configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias for solver operations.
pub type CoreResult<T> = Result<T, VqlsError>;
