//! Variational linear solvers.
//!
//! Every solver minimizes a cost built from circuit evaluations of the
//! ansatz `V(θ)`. They share the optimization driver in this module: the
//! initial point, evaluation counting, the progress callback and error
//! propagation out of the objective.

mod evqls;
mod input;
mod options;
mod qst;
mod result;
mod vqls;

pub use evqls::Evqls;
pub use input::{MatrixInput, VectorInput};
pub use options::{EvqlsOptions, QstVqlsOptions, VqlsOptions};
pub use qst::QstVqls;
pub use result::{VqlsLog, VqlsResult};
pub use vqls::Vqls;

use std::f64::consts::PI;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};
use vqls_hal::Sampler;
use vqls_ir::Circuit;

use crate::error::{CoreResult, VqlsError};
use crate::optimizers::Optimizer;
use crate::tomography::{
    FullTomography, RealAmplitudeTomography, SimulatorTomography, Tomography, TomographyKind,
};

/// Progress callback: evaluation count, cost and parameters.
pub type Callback<'a> = &'a mut dyn FnMut(usize, f64, &[f64]);

/// A solver of `A x = b` returning the optimized ansatz.
pub trait VariationalLinearSolver {
    /// Solve, invoking `callback` after every cost evaluation.
    fn solve_with_callback(
        &self,
        matrix: MatrixInput,
        vector: VectorInput,
        callback: Callback<'_>,
    ) -> CoreResult<VqlsResult>;

    /// Solve without progress reporting.
    fn solve(
        &self,
        matrix: impl Into<MatrixInput>,
        vector: impl Into<VectorInput>,
    ) -> CoreResult<VqlsResult>
    where
        Self: Sized,
    {
        self.solve_with_callback(matrix.into(), vector.into(), &mut |_, _, _| {})
    }
}

/// Tomography of `kind` for `ansatz`. The sampled variants need a sampler.
fn tomography_for(
    kind: TomographyKind,
    ansatz: &Circuit,
    sampler: Option<&Arc<dyn Sampler>>,
    shots: Option<u32>,
) -> CoreResult<Box<dyn Tomography>> {
    let tomography: Box<dyn Tomography> = match kind {
        TomographyKind::Simulator => Box::new(SimulatorTomography::new(ansatz.clone())),
        TomographyKind::RealAmplitudes => {
            let sampler = sampler.ok_or(VqlsError::MissingSampler)?;
            Box::new(RealAmplitudeTomography::new(ansatz, Arc::clone(sampler), shots)?)
        }
        TomographyKind::Full => {
            let sampler = sampler.ok_or(VqlsError::MissingSampler)?;
            Box::new(FullTomography::new(ansatz, Arc::clone(sampler), shots)?)
        }
    };
    Ok(tomography)
}

/// Ansatz, optimizer and starting point shared by the solvers.
#[derive(Debug, Clone)]
struct Variational<O> {
    ansatz: Circuit,
    optimizer: O,
    initial_point: Option<Vec<f64>>,
    seed: Option<u64>,
}

impl<O: Optimizer> Variational<O> {
    fn new(ansatz: Circuit, optimizer: O) -> Self {
        Self {
            ansatz,
            optimizer,
            initial_point: None,
            seed: None,
        }
    }

    fn num_parameters(&self) -> CoreResult<usize> {
        match self.ansatz.num_parameters() {
            0 => Err(VqlsError::UnparameterizedAnsatz),
            n => Ok(n),
        }
    }

    fn check_width(&self, num_qubits: usize, what: &str) -> CoreResult<()> {
        if self.ansatz.num_qubits() != num_qubits {
            return Err(VqlsError::DimensionMismatch(format!(
                "ansatz has {} qubits, {what} has {num_qubits}",
                self.ansatz.num_qubits()
            )));
        }
        Ok(())
    }

    /// The configured initial point, or one drawn uniformly from `[-π, π)`.
    fn initial_point(&self, num_parameters: usize) -> CoreResult<Vec<f64>> {
        if let Some(point) = &self.initial_point {
            if point.len() != num_parameters {
                return Err(VqlsError::InitialPointMismatch {
                    expected: num_parameters,
                    provided: point.len(),
                });
            }
            return Ok(point.clone());
        }
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok((0..num_parameters).map(|_| rng.gen_range(-PI..PI)).collect())
    }

    /// Minimize `cost`. The first error returned by `cost` stops the
    /// optimizer and is returned.
    fn run<C>(&self, solver: &str, mut cost: C, callback: Callback<'_>) -> CoreResult<VqlsResult>
    where
        C: FnMut(&[f64]) -> CoreResult<f64>,
    {
        self.optimizer.validate()?;
        let num_parameters = self.num_parameters()?;
        let initial_point = self.initial_point(num_parameters)?;
        info!(solver, num_parameters, qubits = self.ansatz.num_qubits(), "starting solve");

        let mut evals = 0usize;
        let mut cost_history = Vec::new();
        let mut failure: Option<VqlsError> = None;

        let result = self.optimizer.minimize(
            |params: &[f64]| {
                if failure.is_some() {
                    return f64::NAN;
                }
                match cost(params) {
                    Ok(value) => {
                        evals += 1;
                        cost_history.push(value);
                        debug!("VQLS iteration {evals} cost {value}");
                        callback(evals, value, params);
                        value
                    }
                    Err(err) => {
                        failure = Some(err);
                        f64::NAN
                    }
                }
            },
            initial_point,
        );

        if let Some(err) = failure {
            return Err(err);
        }

        let state = self
            .ansatz
            .bind(&result.optimal_params)?
            .with_name(format!("{}_solution", self.ansatz.name()));
        info!(
            solver,
            cost = result.optimal_value,
            evals,
            iterations = result.num_iterations,
            converged = result.converged,
            "solve finished"
        );

        Ok(VqlsResult {
            optimal_point: result.optimal_params,
            optimal_value: result.optimal_value,
            cost_function_evals: evals,
            iterations: result.num_iterations,
            converged: result.converged,
            cost_history,
            state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizers::NelderMead;
    use vqls_ir::library::{Entanglement, real_amplitudes};

    #[test]
    fn test_seeded_initial_point_in_range() {
        let mut v = Variational::new(real_amplitudes(2, 1, Entanglement::Linear), NelderMead::new());
        v.seed = Some(5);
        let a = v.initial_point(4).unwrap();
        let b = v.initial_point(4).unwrap();
        assert_eq!(a, b);
        assert!(a.iter().all(|x| (-PI..PI).contains(x)));
    }

    #[test]
    fn test_initial_point_length_checked() {
        let mut v = Variational::new(real_amplitudes(2, 1, Entanglement::Linear), NelderMead::new());
        v.initial_point = Some(vec![0.0; 3]);
        assert!(matches!(
            v.initial_point(4),
            Err(VqlsError::InitialPointMismatch { expected: 4, provided: 3 })
        ));
    }

    #[test]
    fn test_unparameterized_ansatz() {
        let v = Variational::new(Circuit::new("fixed", 2), NelderMead::new());
        let err = v.run("test", |_| Ok(0.0), &mut |_, _, _| {}).unwrap_err();
        assert!(matches!(err, VqlsError::UnparameterizedAnsatz));
    }

    #[test]
    fn test_invalid_optimizer_rejected_before_evaluating() {
        let v = Variational::new(real_amplitudes(1, 0, Entanglement::Linear), NelderMead::new().with_maxiter(0));
        let mut calls = 0;
        let err = v
            .run(
                "test",
                |_| {
                    calls += 1;
                    Ok(0.0)
                },
                &mut |_, _, _| {},
            )
            .unwrap_err();
        assert!(matches!(err, VqlsError::Optimizer(_)));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_cost_error_aborts() {
        let v = Variational::new(real_amplitudes(1, 0, Entanglement::Linear), NelderMead::new());
        let mut calls = 0;
        let err = v
            .run(
                "test",
                |_| {
                    calls += 1;
                    if calls == 3 {
                        Err(VqlsError::SingularMatrix)
                    } else {
                        Ok(1.0)
                    }
                },
                &mut |_, _, _| {},
            )
            .unwrap_err();
        assert!(matches!(err, VqlsError::SingularMatrix));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_callback_sees_every_evaluation() {
        let v = Variational::new(real_amplitudes(1, 0, Entanglement::Linear), NelderMead::new().with_maxiter(10));
        let mut log = VqlsLog::new();
        let result = v
            .run("test", |p| Ok((p[0] - 1.0).powi(2)), &mut |n, c, p| log.update(n, c, p))
            .unwrap();
        assert_eq!(log.len(), result.cost_function_evals);
        assert_eq!(log.values, result.cost_history);
        assert_eq!(result.state.num_parameters(), 0);
    }
}
