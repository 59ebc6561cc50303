//! Dense linear algebra used to check variational solutions.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::error::{CoreResult, VqlsError};

const PIVOT_EPS: f64 = 1e-14;

/// Solve `A x = b` by Gaussian elimination with partial pivoting.
pub fn solve_dense(a: &Array2<Complex64>, b: &Array1<Complex64>) -> CoreResult<Array1<Complex64>> {
    let (rows, cols) = a.dim();
    if rows != cols {
        return Err(VqlsError::InvalidMatrixShape { rows, cols });
    }
    if b.len() != rows {
        return Err(VqlsError::DimensionMismatch(format!(
            "matrix has {rows} rows, vector has {} entries",
            b.len()
        )));
    }

    let n = rows;
    let mut m = a.clone();
    let mut rhs = b.clone();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| m[[i, col]].norm().total_cmp(&m[[j, col]].norm()))
            .unwrap_or(col);
        if m[[pivot, col]].norm() < PIVOT_EPS {
            return Err(VqlsError::SingularMatrix);
        }
        if pivot != col {
            for k in 0..n {
                m.swap([col, k], [pivot, k]);
            }
            rhs.swap(col, pivot);
        }

        for row in col + 1..n {
            let factor = m[[row, col]] / m[[col, col]];
            if factor.norm() == 0.0 {
                continue;
            }
            for k in col..n {
                let delta = factor * m[[col, k]];
                m[[row, k]] -= delta;
            }
            let delta = factor * rhs[col];
            rhs[row] -= delta;
        }
    }

    let mut x = Array1::<Complex64>::zeros(n);
    for row in (0..n).rev() {
        let mut acc = rhs[row];
        for k in row + 1..n {
            acc -= m[[row, k]] * x[k];
        }
        x[row] = acc / m[[row, row]];
    }
    Ok(x)
}

/// Euclidean norm.
pub fn norm(v: &Array1<Complex64>) -> f64 {
    v.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt()
}

/// `v / ‖v‖`; the zero vector is returned unchanged.
pub fn normalize(v: &Array1<Complex64>) -> Array1<Complex64> {
    let n = norm(v);
    if n == 0.0 { v.clone() } else { v.mapv(|a| a / n) }
}

/// Rotate `candidate` by the global phase that makes its overlap with
/// `reference` real and non-negative. For real vectors this is a sign flip.
pub fn align_sign(reference: &Array1<Complex64>, candidate: &Array1<Complex64>) -> Array1<Complex64> {
    let overlap: Complex64 = reference
        .iter()
        .zip(candidate)
        .map(|(r, c)| r.conj() * c)
        .sum();
    if overlap.norm() == 0.0 {
        return candidate.clone();
    }
    let phase = overlap.conj() / overlap.norm();
    candidate.mapv(|c| c * phase)
}

/// Largest entry-wise distance.
pub fn max_abs_error(a: &Array1<Complex64>, b: &Array1<Complex64>) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max)
}

/// `A · v`.
pub fn mat_vec(a: &Array2<Complex64>, v: &Array1<Complex64>) -> Array1<Complex64> {
    a.dot(v)
}

/// Lift a real matrix into complex entries.
pub fn complexify_matrix(a: &Array2<f64>) -> Array2<Complex64> {
    a.mapv(|x| Complex64::new(x, 0.0))
}

/// Lift a real vector into complex entries.
pub fn complexify_vector(v: &Array1<f64>) -> Array1<Complex64> {
    v.mapv(|x| Complex64::new(x, 0.0))
}
