//! Local statevector backend for the VQLS primitives.
//!
//! Provides exact (or shot-sampled) implementations of the
//! [`vqls_hal::Sampler`] and [`vqls_hal::Estimator`] primitives on top of
//! [`vqls_ir::Statevector`], and a [`SimBackend`] to open sessions on.

mod backend;
mod estimator;
mod sampler;

pub use backend::SimBackend;
pub use estimator::StatevectorEstimator;
pub use sampler::StatevectorSampler;
