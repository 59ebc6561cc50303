//! BFGS with finite-difference gradients.

use serde::{Deserialize, Serialize};

use super::{OptimizationResult, Optimizer, Tracked, check_budget};
use crate::error::OptimizerError;

/// Quasi-Newton optimizer using the Broyden-Fletcher-Goldfarb-Shanno update
/// of the inverse Hessian, forward-difference gradients and Armijo
/// backtracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bfgs {
    /// Maximum iterations
    pub maxiter: usize,
    /// Convergence tolerance for gradient norm
    pub gtol: f64,
    /// Convergence tolerance for objective change
    pub ftol: f64,
    /// Finite difference step size
    pub fd_step: f64,
    /// Armijo sufficient-decrease constant
    pub c1: f64,
    /// Maximum line search iterations
    pub max_line_search: usize,
}

impl Default for Bfgs {
    fn default() -> Self {
        Self {
            maxiter: 200,
            gtol: 1e-6,
            ftol: 1e-10,
            fd_step: 1e-6,
            c1: 1e-4,
            max_line_search: 20,
        }
    }
}

impl Bfgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.gtol = tol;
        self
    }

    pub fn with_fd_step(mut self, step: f64) -> Self {
        self.fd_step = step;
        self
    }

    fn gradient<F>(&self, x: &[f64], fx: f64, tracked: &mut Tracked<F>) -> Vec<f64>
    where
        F: FnMut(&[f64]) -> f64,
    {
        let mut probe = x.to_vec();
        (0..x.len())
            .map(|i| {
                probe[i] += self.fd_step;
                let f_plus = tracked.eval(&probe);
                probe[i] = x[i];
                (f_plus - fx) / self.fd_step
            })
            .collect()
    }

    /// `H ← (I - ρ s yᵀ) H (I - ρ y sᵀ) + ρ s sᵀ`
    fn update_inverse_hessian(h_inv: &mut [Vec<f64>], s: &[f64], y: &[f64], sy: f64) {
        let n = s.len();
        let rho = 1.0 / sy;
        let hy: Vec<f64> = (0..n)
            .map(|i| (0..n).map(|j| h_inv[i][j] * y[j]).sum())
            .collect();
        let yhy: f64 = y.iter().zip(&hy).map(|(a, b)| a * b).sum();
        for i in 0..n {
            for j in 0..n {
                h_inv[i][j] += rho * ((1.0 + rho * yhy) * s[i] * s[j] - hy[i] * s[j] - s[i] * hy[j]);
            }
        }
    }
}

impl Optimizer for Bfgs {
    fn validate(&self) -> Result<(), OptimizerError> {
        check_budget(self.maxiter, &[self.gtol, self.ftol])?;
        if self.fd_step <= 0.0 {
            return Err(OptimizerError::InvalidConfig(
                "finite-difference step must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn minimize<F>(&self, objective: F, initial_params: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64,
    {
        let n = initial_params.len();
        let mut tracked = Tracked::new(objective, &initial_params);
        let mut history = Vec::new();

        let mut x = initial_params;
        let mut f = tracked.eval(&x);
        let mut g = self.gradient(&x, f, &mut tracked);
        let mut h_inv: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect();

        let mut converged = false;
        let mut iterations = 0;
        while iterations < self.maxiter && !tracked.aborted {
            let g_norm = g.iter().map(|gi| gi * gi).sum::<f64>().sqrt();
            if g_norm < self.gtol {
                converged = true;
                break;
            }
            iterations += 1;

            let p: Vec<f64> = (0..n)
                .map(|i| -(0..n).map(|j| h_inv[i][j] * g[j]).sum::<f64>())
                .collect();
            let slope: f64 = p.iter().zip(&g).map(|(pi, gi)| pi * gi).sum();

            let mut alpha = 1.0;
            let mut accepted = None;
            for _ in 0..self.max_line_search {
                let x_new: Vec<f64> = x.iter().zip(&p).map(|(xi, pi)| xi + alpha * pi).collect();
                let f_new = tracked.eval(&x_new);
                if tracked.aborted {
                    break;
                }
                if f_new <= f + self.c1 * alpha * slope {
                    accepted = Some((x_new, f_new, alpha));
                    break;
                }
                alpha *= 0.5;
            }

            let Some((x_new, f_new, alpha)) = accepted else {
                history.push(tracked.best_value);
                break;
            };
            let g_new = self.gradient(&x_new, f_new, &mut tracked);
            let s: Vec<f64> = p.iter().map(|pi| alpha * pi).collect();
            let y: Vec<f64> = g_new.iter().zip(&g).map(|(a, b)| a - b).collect();
            let f_change = (f - f_new).abs();

            let sy: f64 = s.iter().zip(&y).map(|(a, b)| a * b).sum();
            if sy > 1e-12 {
                Self::update_inverse_hessian(&mut h_inv, &s, &y, sy);
            }
            x = x_new;
            f = f_new;
            g = g_new;
            history.push(tracked.best_value);

            if f_change < self.ftol {
                converged = true;
                break;
            }
        }

        tracked.finish(iterations, history, converged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic() {
        let bfgs = Bfgs::new();
        // Minimise (x-2)² + (y-3)² starting from (0, 0)
        let result = bfgs.minimize(
            |p: &[f64]| (p[0] - 2.0).powi(2) + (p[1] - 3.0).powi(2),
            vec![0.0, 0.0],
        );
        assert!((result.optimal_params[0] - 2.0).abs() < 0.01);
        assert!((result.optimal_params[1] - 3.0).abs() < 0.01);
    }

    #[test]
    fn test_trigonometric_minimum() {
        let result = Bfgs::new().minimize(|p: &[f64]| p[0].cos() + 0.5 * p[1].sin(), vec![2.0, -0.5]);
        assert!((result.optimal_value + 1.5).abs() < 1e-6);
    }
}
