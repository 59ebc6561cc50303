//! Scoped backend sessions.
//!
//! A session is opened on a backend, serves blocking primitive calls, and is
//! closed afterwards. It forwards to the backend's primitives, checks circuit
//! width against the backend capacity and counts the jobs it served.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracing::{debug, info};
use uuid::Uuid;
use vqls_ir::{Circuit, Observable};

use crate::backend::Backend;
use crate::error::{HalError, HalResult};
use crate::primitives::{Estimator, QuasiDistribution, Sampler};

/// An open connection to a backend.
pub struct Session {
    id: Uuid,
    backend: String,
    max_qubits: usize,
    sampler: Arc<dyn Sampler>,
    estimator: Arc<dyn Estimator>,
    jobs: AtomicUsize,
    closed: AtomicBool,
}

impl Session {
    /// Open a session on `backend`.
    pub fn open(backend: &dyn Backend) -> Arc<Session> {
        let session = Session {
            id: Uuid::new_v4(),
            backend: backend.name().to_string(),
            max_qubits: backend.max_qubits(),
            sampler: backend.sampler(),
            estimator: backend.estimator(),
            jobs: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        };
        info!(session = %session.id, backend = %session.backend, "session opened");
        Arc::new(session)
    }

    /// Open a session, run `f` with it, and close it.
    pub fn scoped<T>(backend: &dyn Backend, f: impl FnOnce(&Arc<Session>) -> T) -> T {
        let session = Session::open(backend);
        let out = f(&session);
        session.close();
        out
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn backend_name(&self) -> &str {
        &self.backend
    }

    /// Number of primitive calls served so far.
    pub fn num_jobs(&self) -> usize {
        self.jobs.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Close the session. Later calls fail with [`HalError::SessionClosed`].
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!(
                session = %self.id,
                backend = %self.backend,
                jobs = self.num_jobs(),
                "session closed"
            );
        }
    }

    fn admit(&self, circuits: &[Circuit]) -> HalResult<()> {
        if self.is_closed() {
            return Err(HalError::SessionClosed(self.id.to_string()));
        }
        if let Some(widest) = circuits.iter().map(Circuit::num_qubits).max() {
            if widest > self.max_qubits {
                return Err(HalError::CapacityExceeded {
                    backend: self.backend.clone(),
                    required: widest,
                    available: self.max_qubits,
                });
            }
        }
        let job = self.jobs.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(session = %self.id, job, circuits = circuits.len(), "job submitted");
        Ok(())
    }
}

impl Sampler for Session {
    fn sample(
        &self,
        circuits: &[Circuit],
        parameters: &[f64],
        shots: Option<u32>,
    ) -> HalResult<Vec<QuasiDistribution>> {
        self.admit(circuits)?;
        self.sampler.sample(circuits, parameters, shots)
    }
}

impl Estimator for Session {
    fn estimate(
        &self,
        circuits: &[Circuit],
        observables: &[Observable],
        parameters: &[f64],
    ) -> HalResult<Vec<f64>> {
        self.admit(circuits)?;
        self.estimator.estimate(circuits, observables, parameters)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstantSampler;

    impl Sampler for ConstantSampler {
        fn sample(
            &self,
            circuits: &[Circuit],
            _parameters: &[f64],
            _shots: Option<u32>,
        ) -> HalResult<Vec<QuasiDistribution>> {
            Ok(circuits
                .iter()
                .map(|_| QuasiDistribution::from_dense(&[1.0]))
                .collect())
        }
    }

    struct ZeroEstimator;

    impl Estimator for ZeroEstimator {
        fn estimate(
            &self,
            circuits: &[Circuit],
            _observables: &[Observable],
            _parameters: &[f64],
        ) -> HalResult<Vec<f64>> {
            Ok(vec![0.0; circuits.len()])
        }
    }

    struct TinyBackend;

    impl Backend for TinyBackend {
        fn name(&self) -> &str {
            "tiny"
        }

        fn max_qubits(&self) -> usize {
            2
        }

        fn sampler(&self) -> Arc<dyn Sampler> {
            Arc::new(ConstantSampler)
        }

        fn estimator(&self) -> Arc<dyn Estimator> {
            Arc::new(ZeroEstimator)
        }
    }

    #[test]
    fn test_scoped_session_counts_and_closes() {
        let circuits = vec![Circuit::new("a", 1), Circuit::new("b", 2)];
        let session = Session::scoped(&TinyBackend, |session| {
            session.sample(&circuits, &[], None).unwrap();
            session
                .estimate(&circuits, &[Observable::z_on(0, 1), Observable::z_on(0, 2)], &[])
                .unwrap();
            assert_eq!(session.num_jobs(), 2);
            Arc::clone(session)
        });
        assert!(session.is_closed());
        assert!(matches!(
            session.sample(&circuits, &[], None),
            Err(HalError::SessionClosed(_))
        ));
    }

    #[test]
    fn test_capacity_is_enforced() {
        let session = Session::open(&TinyBackend);
        let wide = vec![Circuit::new("wide", 3)];
        assert!(matches!(
            session.sample(&wide, &[], None),
            Err(HalError::CapacityExceeded {
                required: 3,
                available: 2,
                ..
            })
        ));
        assert_eq!(session.num_jobs(), 0);
    }
}
