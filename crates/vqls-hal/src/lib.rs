//! VQLS hardware abstraction layer.
//!
//! Solvers never talk to a simulator or device directly; they consume the
//! two primitives defined here:
//!
//! - [`Sampler`]: measurement distributions of circuits
//! - [`Estimator`]: expectation values of observables
//!
//! A [`Backend`] hands out both, and a [`Session`] wraps a backend in an
//! opaque, scoped handle that implements the primitives itself.

pub mod backend;
pub mod error;
pub mod primitives;
pub mod session;

pub use backend::Backend;
pub use error::{HalError, HalResult};
pub use primitives::{Estimator, QuasiDistribution, Sampler};
pub use session::Session;
