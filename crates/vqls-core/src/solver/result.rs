//! Solver results and progress logging.

use ndarray::Array1;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use vqls_ir::{Circuit, Statevector};

use crate::error::CoreResult;

const PHASE_EPS: f64 = 1e-10;

/// Result of a variational solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VqlsResult {
    /// Optimal ansatz parameters.
    pub optimal_point: Vec<f64>,
    /// Cost at the optimal point.
    pub optimal_value: f64,
    /// Number of cost evaluations.
    pub cost_function_evals: usize,
    /// Optimizer iterations.
    pub iterations: usize,
    pub converged: bool,
    /// Cost of every evaluation, in order.
    pub cost_history: Vec<f64>,
    /// Ansatz bound to the optimal point.
    pub state: Circuit,
}

impl VqlsResult {
    /// Normalized solution `|x⟩ = V(θ*)|0⟩`, with the global phase chosen so
    /// that the first significant amplitude is real and positive.
    pub fn solution_vector(&self) -> CoreResult<Array1<Complex64>> {
        let amplitudes = Statevector::from_circuit(&self.state, &[])?.into_amplitudes();
        let phase = amplitudes
            .iter()
            .find(|a| a.norm() > PHASE_EPS)
            .map(|a| a.conj() / a.norm())
            .unwrap_or(Complex64::new(1.0, 0.0));
        Ok(amplitudes.into_iter().map(|a| a * phase).collect())
    }
}

/// Records every cost evaluation; pass [`VqlsLog::update`] as the callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VqlsLog {
    pub values: Vec<f64>,
    pub parameters: Vec<Vec<f64>>,
}

impl VqlsLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, _count: usize, cost: f64, parameters: &[f64]) {
        self.values.push(cost);
        self.parameters.push(parameters.to_vec());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_solution_vector_fixes_phase() {
        let mut state = Circuit::new("minus", 1);
        state.x(0).unwrap().h(0).unwrap();
        let result = VqlsResult {
            optimal_point: vec![],
            optimal_value: 0.0,
            cost_function_evals: 0,
            iterations: 0,
            converged: true,
            cost_history: vec![],
            state,
        };
        let x = result.solution_vector().unwrap();
        assert_relative_eq!(x[0].re, std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(x[1].re, -std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_log_update() {
        let mut log = VqlsLog::new();
        log.update(1, 0.5, &[0.1, 0.2]);
        log.update(2, 0.25, &[0.3, 0.4]);
        assert_eq!(log.values, vec![0.5, 0.25]);
        assert_eq!(log.parameters[1], vec![0.3, 0.4]);
    }
}
