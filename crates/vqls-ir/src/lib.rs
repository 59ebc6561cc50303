//! VQLS circuit intermediate representation.
//!
//! This crate holds the quantum-side vocabulary shared by the rest of the
//! workspace:
//!
//! - **Circuits**: single-qubit gates with arbitrary control lists, free
//!   parameters, structural inversion and control
//! - **Pauli algebra**: Pauli strings, their products and qubit-wise
//!   commutation, weighted observables
//! - **Statevectors**: dense simulation used by the local primitives and the
//!   exact tomography
//! - **Library**: the real-amplitudes ansatz and amplitude-encoding state
//!   preparation

pub mod circuit;
pub mod error;
pub mod library;
pub mod pauli;
pub mod statevector;

pub use circuit::{Circuit, Gate, Instruction, Param};
pub use error::{IrError, IrResult};
pub use pauli::{Observable, Pauli, PauliString};
pub use statevector::Statevector;
