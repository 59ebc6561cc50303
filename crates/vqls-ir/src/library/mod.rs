//! Circuit generators.

pub mod ansatz;
pub mod state_prep;

pub use ansatz::{Entanglement, num_parameters, real_amplitudes};
pub use state_prep::state_preparation;
