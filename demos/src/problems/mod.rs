//! Linear systems used by the demos.

use anyhow::Result;
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vqls_core::MatrixDecomposition;
use vqls_core::linalg::{complexify_matrix, complexify_vector, normalize, solve_dense};
use vqls_ir::{Circuit, Statevector};

/// A dense system `A x = b` with its classical solution.
#[derive(Debug, Clone)]
pub struct DenseProblem {
    pub matrix: Array2<f64>,
    pub rhs: Array1<f64>,
    /// Normalized `A⁻¹ b`.
    pub solution: Array1<Complex64>,
}

impl DenseProblem {
    /// Random symmetric system of size `2^num_qubits`.
    ///
    /// Off-diagonal entries are uniform in `[-0.5, 0.5]` and the diagonal in
    /// `[1, 2]` plus the row's absolute sum, so the matrix is diagonally
    /// dominant and well conditioned.
    pub fn random_symmetric(num_qubits: usize, seed: Option<u64>) -> Result<Self> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let dim = 1usize << num_qubits;
        let mut matrix = Array2::<f64>::zeros((dim, dim));
        for i in 0..dim {
            for j in i + 1..dim {
                let v = rng.gen_range(-0.5..=0.5);
                matrix[[i, j]] = v;
                matrix[[j, i]] = v;
            }
        }
        for i in 0..dim {
            let off: f64 = matrix.row(i).iter().map(|v| v.abs()).sum();
            matrix[[i, i]] = off + rng.gen_range(1.0..=2.0);
        }
        let rhs = Array1::from_shape_fn(dim, |_| rng.gen_range(-1.0..=1.0));
        Self::new(matrix, rhs)
    }

    pub fn new(matrix: Array2<f64>, rhs: Array1<f64>) -> Result<Self> {
        let exact = solve_dense(&complexify_matrix(&matrix), &complexify_vector(&rhs))?;
        Ok(Self {
            matrix,
            rhs,
            solution: normalize(&exact),
        })
    }

    pub fn num_qubits(&self) -> usize {
        self.rhs.len().trailing_zeros() as usize
    }
}

/// A system given as `Σ c_i A_i` over unitary circuits with `|b⟩ = U|0⟩`.
#[derive(Debug, Clone)]
pub struct UnitarySumProblem {
    pub decomposition: MatrixDecomposition,
    pub rhs: Circuit,
    pub solution: Array1<Complex64>,
}

impl UnitarySumProblem {
    /// `A = I + 0.2 X_0 + 0.1 Z_0 Z_1 + …` on `num_qubits` qubits and
    /// `|b⟩ = H^{⊗n}|0⟩`.
    ///
    /// Coupling terms only exist for two or more qubits.
    pub fn ising_like(num_qubits: usize) -> Result<Self> {
        let mut coeffs = vec![1.0];
        let mut circuits = vec![Circuit::new("identity", num_qubits)];

        let mut field = Circuit::new("x0", num_qubits);
        field.x(0)?;
        coeffs.push(0.2);
        circuits.push(field);

        for q in 0..num_qubits.saturating_sub(1) {
            let mut coupling = Circuit::new(format!("z{q}z{}", q + 1), num_qubits);
            coupling.z(q)?.z(q + 1)?;
            coeffs.push(0.1);
            circuits.push(coupling);
        }

        let decomposition = MatrixDecomposition::from_real_terms(&coeffs, circuits)?;

        let mut rhs = Circuit::new("rhs", num_qubits);
        for q in 0..num_qubits {
            rhs.h(q)?;
        }

        let b: Array1<Complex64> = Statevector::from_circuit(&rhs, &[])?.into_amplitudes().into();
        let exact = solve_dense(&decomposition.recompose()?, &b)?;
        Ok(Self {
            decomposition,
            rhs,
            solution: normalize(&exact),
        })
    }

    pub fn num_qubits(&self) -> usize {
        self.decomposition.num_qubits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use vqls_core::linalg::{mat_vec, max_abs_error};

    #[test]
    fn test_random_problem_is_seeded_and_symmetric() {
        let a = DenseProblem::random_symmetric(2, Some(3)).unwrap();
        let b = DenseProblem::random_symmetric(2, Some(3)).unwrap();
        assert_eq!(a.matrix, b.matrix);
        assert_eq!(a.matrix, a.matrix.t());
        assert_eq!(a.num_qubits(), 2);
        let norm: f64 = a.solution.iter().map(|v| v.norm_sqr()).sum();
        assert_relative_eq!(norm, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unitary_sum_solution() {
        let p = UnitarySumProblem::ising_like(2).unwrap();
        assert_eq!(p.decomposition.len(), 3);
        let a = p.decomposition.recompose().unwrap();
        let ax = normalize(&mat_vec(&a, &p.solution));
        let b = Array1::from_elem(4, Complex64::new(0.5, 0.0));
        assert!(max_abs_error(&ax, &b) < 1e-10);
    }
}
