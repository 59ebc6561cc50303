//! Nelder-Mead simplex search.

use serde::{Deserialize, Serialize};

use super::{OptimizationResult, Optimizer, Tracked, check_budget};
use crate::error::OptimizerError;

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Derivative-free simplex optimizer, robust to the shot noise of sampled
/// cost functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NelderMead {
    /// Maximum number of simplex iterations.
    pub maxiter: usize,
    /// Convergence tolerance on the simplex size.
    pub xatol: f64,
    /// Convergence tolerance on the spread of objective values.
    pub fatol: f64,
    /// Edge length of the initial simplex.
    pub initial_step: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            maxiter: 1000,
            xatol: 1e-6,
            fatol: 1e-8,
            initial_step: 0.5,
        }
    }
}

impl NelderMead {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set both convergence tolerances.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.xatol = tol;
        self.fatol = tol;
        self
    }

    pub fn with_initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }
}

impl Optimizer for NelderMead {
    fn validate(&self) -> Result<(), OptimizerError> {
        check_budget(self.maxiter, &[self.xatol, self.fatol])
    }

    fn minimize<F>(&self, objective: F, initial_params: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64,
    {
        let n = initial_params.len();
        let mut tracked = Tracked::new(objective, &initial_params);
        let mut history = Vec::new();

        let f0 = tracked.eval(&initial_params);
        if n == 0 || tracked.aborted {
            return tracked.finish(0, vec![f0], n == 0);
        }

        let mut simplex = vec![initial_params.clone()];
        let mut fvals = vec![f0];
        for i in 0..n {
            let mut vertex = initial_params.clone();
            vertex[i] += self.initial_step;
            fvals.push(tracked.eval(&vertex));
            simplex.push(vertex);
        }

        let mut converged = false;
        let mut iterations = 0;
        while iterations < self.maxiter && !tracked.aborted {
            iterations += 1;

            let mut order: Vec<usize> = (0..=n).collect();
            order.sort_by(|&a, &b| fvals[a].total_cmp(&fvals[b]));
            simplex = order.iter().map(|&i| simplex[i].clone()).collect();
            fvals = order.iter().map(|&i| fvals[i]).collect();
            history.push(fvals[0]);

            let f_spread = fvals.iter().map(|f| (f - fvals[0]).abs()).fold(0.0, f64::max);
            let x_spread = simplex[1..]
                .iter()
                .flat_map(|v| v.iter().zip(&simplex[0]).map(|(a, b)| (a - b).abs()))
                .fold(0.0, f64::max);
            if f_spread <= self.fatol && x_spread <= self.xatol {
                converged = true;
                break;
            }

            let mut centroid = vec![0.0; n];
            for vertex in &simplex[..n] {
                for (c, x) in centroid.iter_mut().zip(vertex) {
                    *c += x / n as f64;
                }
            }
            let worst = simplex[n].clone();
            let toward = |coef: f64, from: &[f64]| -> Vec<f64> {
                centroid
                    .iter()
                    .zip(from)
                    .map(|(c, x)| c + coef * (x - c))
                    .collect()
            };

            let reflected = toward(-REFLECT, &worst);
            let f_reflected = tracked.eval(&reflected);
            if tracked.aborted {
                break;
            }

            if f_reflected < fvals[0] {
                let expanded = toward(EXPAND, &reflected);
                let f_expanded = tracked.eval(&expanded);
                if f_expanded < f_reflected {
                    simplex[n] = expanded;
                    fvals[n] = f_expanded;
                } else {
                    simplex[n] = reflected;
                    fvals[n] = f_reflected;
                }
                continue;
            }
            if f_reflected < fvals[n - 1] {
                simplex[n] = reflected;
                fvals[n] = f_reflected;
                continue;
            }

            let (contracted, bound) = if f_reflected < fvals[n] {
                (toward(CONTRACT, &reflected), f_reflected)
            } else {
                (toward(CONTRACT, &worst), fvals[n])
            };
            let f_contracted = tracked.eval(&contracted);
            if f_contracted < bound {
                simplex[n] = contracted;
                fvals[n] = f_contracted;
                continue;
            }

            let best = simplex[0].clone();
            for i in 1..=n {
                let shrunk: Vec<f64> = best
                    .iter()
                    .zip(&simplex[i])
                    .map(|(b, x)| b + SHRINK * (x - b))
                    .collect();
                fvals[i] = tracked.eval(&shrunk);
                simplex[i] = shrunk;
            }
        }

        tracked.finish(iterations, history, converged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quadratic() {
        let nm = NelderMead::new().with_tol(1e-10);
        let result = nm.minimize(
            |p: &[f64]| (p[0] - 2.0).powi(2) + (p[1] + 3.0).powi(2) + 1.0,
            vec![0.0, 0.0],
        );
        assert!(result.converged);
        assert_relative_eq!(result.optimal_params[0], 2.0, epsilon = 1e-4);
        assert_relative_eq!(result.optimal_params[1], -3.0, epsilon = 1e-4);
        assert_relative_eq!(result.optimal_value, 1.0, epsilon = 1e-8);
        assert!(result.num_evaluations > result.num_iterations);
    }

    #[test]
    fn test_history_is_monotone() {
        let result = NelderMead::new()
            .with_maxiter(50)
            .minimize(|p: &[f64]| p.iter().map(|x| x.cos()).sum::<f64>(), vec![0.1, 0.2, 0.3]);
        assert_eq!(result.history.len(), result.num_iterations);
        assert!(result.history.windows(2).all(|w| w[1] <= w[0] + 1e-15));
    }
}
