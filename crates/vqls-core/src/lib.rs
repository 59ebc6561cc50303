//! Variational quantum linear solvers.
//!
//! Solves `A x = b` by training a parameterized circuit `V(θ)` so that
//! `A V(θ)|0⟩` is proportional to `|b⟩`. Three solvers share one
//! optimization driver:
//!
//! - [`Vqls`]: Hadamard tests on a decomposition `A = Σ c_i A_i` into
//!   unitary circuits, with global, local or overlap-test cost functions
//! - [`Evqls`]: direct measurement of qubit-wise commuting groups of Pauli
//!   products plus sign-recovering tomography
//! - [`QstVqls`]: full state reconstruction and classical evaluation of the
//!   cost
//!
//! Circuit evaluation goes through the `vqls-hal` primitives, so any
//! backend implementing [`vqls_hal::Sampler`] or [`vqls_hal::Estimator`]
//! can drive the solvers.
//!
//! ```ignore
//! use std::sync::Arc;
//! use vqls_core::{ClassicalOptimizer, VariationalLinearSolver, Vqls};
//! use vqls_ir::library::{Entanglement, real_amplitudes};
//!
//! let ansatz = real_amplitudes(2, 3, Entanglement::Full);
//! let solver = Vqls::new(estimator, ansatz, ClassicalOptimizer::default()).with_seed(7);
//! let result = solver.solve(matrix, rhs)?;
//! let x = result.solution_vector()?;
//! ```

pub mod cost;
pub mod decomposition;
pub mod error;
pub mod hadamard;
pub mod linalg;
pub mod optimizers;
pub mod solver;
pub mod tomography;

pub use decomposition::{
    ContractedPauliDecomposition, MatrixDecomposition, OptimizedPauliDecomposition,
    PauliDecomposition, UnitaryTerm,
};
pub use error::{CoreResult, OptimizerError, VqlsError};
pub use optimizers::{
    Bfgs, ClassicalOptimizer, NelderMead, OptimizationResult, Optimizer, Spsa,
};
pub use solver::{
    Callback, Evqls, EvqlsOptions, MatrixInput, QstVqls, QstVqlsOptions,
    VariationalLinearSolver, Vqls, VqlsLog, VqlsOptions, VqlsResult, VectorInput,
};
pub use tomography::{
    FullTomography, RealAmplitudeTomography, SimulatorTomography, Tomography, TomographyKind,
};
