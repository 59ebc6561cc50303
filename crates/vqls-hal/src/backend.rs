//! Backend abstraction.

use std::sync::Arc;

use crate::primitives::{Estimator, Sampler};

/// An execution target able to hand out primitives.
pub trait Backend: Send + Sync {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Widest circuit the backend accepts.
    fn max_qubits(&self) -> usize;

    /// Sampler bound to this backend.
    fn sampler(&self) -> Arc<dyn Sampler>;

    /// Estimator bound to this backend.
    fn estimator(&self) -> Arc<dyn Estimator>;
}
