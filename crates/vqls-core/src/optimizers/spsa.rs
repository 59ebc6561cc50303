//! Simultaneous perturbation stochastic approximation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{OptimizationResult, Optimizer, Tracked, check_budget};
use crate::error::OptimizerError;

/// SPSA: two objective evaluations per iteration regardless of the number
/// of parameters, suited to shot-noisy cost functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spsa {
    pub maxiter: usize,
    /// Gain `a` of the step size `a / (k + 1 + A)^α`.
    pub learning_rate: f64,
    /// Gain `c` of the perturbation `c / (k + 1)^γ`.
    pub perturbation: f64,
    pub alpha: f64,
    pub gamma: f64,
    /// Stability constant `A`.
    pub stability: f64,
    /// Stop once a parameter update is shorter than this.
    pub tol: f64,
    pub seed: Option<u64>,
}

impl Default for Spsa {
    fn default() -> Self {
        Self {
            maxiter: 300,
            learning_rate: 0.2,
            perturbation: 0.1,
            alpha: 0.602,
            gamma: 0.101,
            stability: 10.0,
            tol: 1e-8,
            seed: None,
        }
    }
}

impl Spsa {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_gains(mut self, learning_rate: f64, perturbation: f64) -> Self {
        self.learning_rate = learning_rate;
        self.perturbation = perturbation;
        self
    }
}

impl Optimizer for Spsa {
    fn validate(&self) -> Result<(), OptimizerError> {
        check_budget(self.maxiter, &[self.tol])?;
        if self.learning_rate <= 0.0 || self.perturbation <= 0.0 {
            return Err(OptimizerError::InvalidConfig(
                "SPSA gains must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn minimize<F>(&self, objective: F, initial_params: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64,
    {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut tracked = Tracked::new(objective, &initial_params);
        let mut history = Vec::new();
        let mut x = initial_params;

        let mut converged = false;
        let mut iterations = 0;
        while iterations < self.maxiter && !tracked.aborted {
            let k = iterations as f64;
            iterations += 1;
            let ak = self.learning_rate / (k + 1.0 + self.stability).powf(self.alpha);
            let ck = self.perturbation / (k + 1.0).powf(self.gamma);

            let delta: Vec<f64> = x
                .iter()
                .map(|_| if rng.gen_bool(0.5) { 1.0 } else { -1.0 })
                .collect();
            let plus: Vec<f64> = x.iter().zip(&delta).map(|(xi, d)| xi + ck * d).collect();
            let minus: Vec<f64> = x.iter().zip(&delta).map(|(xi, d)| xi - ck * d).collect();
            let f_plus = tracked.eval(&plus);
            let f_minus = tracked.eval(&minus);
            if tracked.aborted {
                break;
            }

            let scale = (f_plus - f_minus) / (2.0 * ck);
            let mut step_sq = 0.0;
            for (xi, d) in x.iter_mut().zip(&delta) {
                let step = ak * scale / d;
                *xi -= step;
                step_sq += step * step;
            }
            history.push(tracked.best_value);

            if step_sq.sqrt() < self.tol {
                converged = true;
                break;
            }
        }

        if !tracked.aborted {
            tracked.eval(&x);
        }
        tracked.finish(iterations, history, converged)
    }
}
