//! Classical optimizers for the variational loop.
//!
//! All optimizers minimize a plain `FnMut(&[f64]) -> f64`. A NaN objective
//! value stops the search, which is how the solvers abort on evaluation
//! errors.

mod bfgs;
mod nelder_mead;
mod spsa;

pub use bfgs::Bfgs;
pub use nelder_mead::NelderMead;
pub use spsa::Spsa;

use serde::{Deserialize, Serialize};

use crate::error::OptimizerError;

/// Outcome of a minimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Best parameters found.
    pub optimal_params: Vec<f64>,
    /// Objective value at `optimal_params`.
    pub optimal_value: f64,
    /// Outer iterations performed.
    pub num_iterations: usize,
    /// Objective evaluations performed.
    pub num_evaluations: usize,
    /// Best value after each iteration.
    pub history: Vec<f64>,
    /// Whether a convergence criterion was met.
    pub converged: bool,
}

/// Trait for classical optimizers.
pub trait Optimizer {
    /// Minimize `objective` starting from `initial_params`.
    fn minimize<F>(&self, objective: F, initial_params: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64;

    /// Reject settings the optimizer cannot run with.
    fn validate(&self) -> Result<(), OptimizerError> {
        Ok(())
    }
}

/// A positive iteration cap and non-negative tolerances.
fn check_budget(maxiter: usize, tolerances: &[f64]) -> Result<(), OptimizerError> {
    if maxiter == 0 {
        return Err(OptimizerError::InvalidConfig(
            "maxiter must be positive".to_string(),
        ));
    }
    if let Some(tol) = tolerances.iter().find(|t| t.is_nan() || **t < 0.0) {
        return Err(OptimizerError::InvalidConfig(format!(
            "tolerances must be non-negative, got {tol}"
        )));
    }
    Ok(())
}

/// Optimizer selected at runtime, e.g. from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ClassicalOptimizer {
    NelderMead(NelderMead),
    Bfgs(Bfgs),
    Spsa(Spsa),
}

impl ClassicalOptimizer {
    pub fn name(&self) -> &'static str {
        match self {
            ClassicalOptimizer::NelderMead(_) => "nelder_mead",
            ClassicalOptimizer::Bfgs(_) => "bfgs",
            ClassicalOptimizer::Spsa(_) => "spsa",
        }
    }

    /// Override the iteration cap of whichever method is selected.
    pub fn with_maxiter(self, maxiter: usize) -> Self {
        match self {
            ClassicalOptimizer::NelderMead(o) => ClassicalOptimizer::NelderMead(o.with_maxiter(maxiter)),
            ClassicalOptimizer::Bfgs(o) => ClassicalOptimizer::Bfgs(o.with_maxiter(maxiter)),
            ClassicalOptimizer::Spsa(o) => ClassicalOptimizer::Spsa(o.with_maxiter(maxiter)),
        }
    }
}

impl Default for ClassicalOptimizer {
    fn default() -> Self {
        ClassicalOptimizer::NelderMead(NelderMead::default())
    }
}

impl From<NelderMead> for ClassicalOptimizer {
    fn from(o: NelderMead) -> Self {
        ClassicalOptimizer::NelderMead(o)
    }
}

impl From<Bfgs> for ClassicalOptimizer {
    fn from(o: Bfgs) -> Self {
        ClassicalOptimizer::Bfgs(o)
    }
}

impl From<Spsa> for ClassicalOptimizer {
    fn from(o: Spsa) -> Self {
        ClassicalOptimizer::Spsa(o)
    }
}

impl Optimizer for ClassicalOptimizer {
    fn minimize<F>(&self, objective: F, initial_params: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64,
    {
        match self {
            ClassicalOptimizer::NelderMead(o) => o.minimize(objective, initial_params),
            ClassicalOptimizer::Bfgs(o) => o.minimize(objective, initial_params),
            ClassicalOptimizer::Spsa(o) => o.minimize(objective, initial_params),
        }
    }

    fn validate(&self) -> Result<(), OptimizerError> {
        match self {
            ClassicalOptimizer::NelderMead(o) => o.validate(),
            ClassicalOptimizer::Bfgs(o) => o.validate(),
            ClassicalOptimizer::Spsa(o) => o.validate(),
        }
    }
}

/// Objective wrapper counting evaluations and tracking the best point.
struct Tracked<F> {
    objective: F,
    evaluations: usize,
    best_value: f64,
    best_params: Vec<f64>,
    aborted: bool,
}

impl<F: FnMut(&[f64]) -> f64> Tracked<F> {
    fn new(objective: F, initial: &[f64]) -> Self {
        Self {
            objective,
            evaluations: 0,
            best_value: f64::INFINITY,
            best_params: initial.to_vec(),
            aborted: false,
        }
    }

    fn eval(&mut self, x: &[f64]) -> f64 {
        let value = (self.objective)(x);
        self.evaluations += 1;
        if value.is_nan() {
            self.aborted = true;
            return f64::INFINITY;
        }
        if value < self.best_value {
            self.best_value = value;
            self.best_params = x.to_vec();
        }
        value
    }

    fn finish(self, num_iterations: usize, history: Vec<f64>, converged: bool) -> OptimizationResult {
        OptimizationResult {
            optimal_params: self.best_params,
            optimal_value: self.best_value,
            num_iterations,
            num_evaluations: self.evaluations,
            history,
            converged: converged && !self.aborted,
        }
    }
}
