//! Assembly of the VQLS cost function from measured values.
//!
//! With `A = Σ_i c_i A_i` and `C_ij = conj(c_i) c_j`:
//!
//! ```text
//! ⟨x|A†A|x⟩      = Σ_ij C_ij ⟨x|A_i† A_j|x⟩
//! |⟨b|A|x⟩|²     = Σ_ij C_ij conj(⟨b|A_i|x⟩) ⟨b|A_j|x⟩
//! cost           = 1 - Re(terms / norm)
//! ```

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{CoreResult, VqlsError};

/// `C_ij = conj(c_i) c_j`.
pub fn coefficient_matrix(coeffs: &[Complex64]) -> Array2<Complex64> {
    let n = coeffs.len();
    Array2::from_shape_fn((n, n), |(i, j)| coeffs[i].conj() * coeffs[j])
}

fn expect_len(values: &[Complex64], expected: usize, what: &str) -> CoreResult<()> {
    if values.len() != expected {
        return Err(VqlsError::DimensionMismatch(format!(
            "expected {expected} {what} values, got {}",
            values.len()
        )));
    }
    Ok(())
}

/// Fill a Hermitian matrix from its upper triangle, diagonal included,
/// given row-major over `i <= j`.
fn hermitian_from_upper(n: usize, upper: impl IntoIterator<Item = Complex64>) -> Array2<Complex64> {
    let mut m = Array2::<Complex64>::zeros((n, n));
    let mut values = upper.into_iter();
    for i in 0..n {
        for j in i..n {
            let v = values.next().unwrap_or_default();
            m[[i, j]] = v;
            m[[j, i]] = v.conj();
        }
    }
    m
}

fn weighted_sum(coeff_matrix: &Array2<Complex64>, m: &Array2<Complex64>) -> Complex64 {
    coeff_matrix.iter().zip(m.iter()).map(|(c, v)| c * v).sum()
}

/// `⟨x|A†A|x⟩` from the pair values `⟨x|A_i†A_j|x⟩`, `i < j`, row-major.
pub fn normalization_term(coeff_matrix: &Array2<Complex64>, pair_values: &[Complex64]) -> CoreResult<Complex64> {
    let n = coeff_matrix.nrows();
    expect_len(pair_values, n * n.saturating_sub(1) / 2, "norm")?;

    let mut pairs = pair_values.iter().copied();
    let upper = (0..n).flat_map(|i| (i..n).map(move |j| (i, j))).map(|(i, j)| {
        if i == j {
            Complex64::new(1.0, 0.0)
        } else {
            pairs.next().unwrap_or_default()
        }
    });
    let upper: Vec<Complex64> = upper.collect();
    Ok(weighted_sum(coeff_matrix, &hermitian_from_upper(n, upper)))
}

/// `|⟨b|A|x⟩|²`.
///
/// Without the overlap test `values` holds `h_i = ⟨b|A_i|x⟩` for every term.
/// With it, `values` holds `conj(h_i) h_j` for `i <= j`, row-major.
pub fn global_terms(
    coeff_matrix: &Array2<Complex64>,
    values: &[Complex64],
    overlap_test: bool,
) -> CoreResult<Complex64> {
    let n = coeff_matrix.nrows();
    if overlap_test {
        expect_len(values, n * (n + 1) / 2, "overlap")?;
        let m = hermitian_from_upper(n, values.iter().copied());
        Ok(weighted_sum(coeff_matrix, &m))
    } else {
        expect_len(values, n, "overlap")?;
        let m = Array2::from_shape_fn((n, n), |(i, j)| values[i].conj() * values[j]);
        Ok(weighted_sum(coeff_matrix, &m))
    }
}

/// Local cost numerator `(Σ_ij C_ij M_ij + norm) / 2` with
/// `M_ij = (1/n) Σ_k ⟨x|A_i† U Z_k U† A_j|x⟩`.
///
/// `values` holds, for each pair `i <= j` (row-major), `num_qubits`
/// consecutive entries, one per qubit `k`.
pub fn local_terms(
    coeff_matrix: &Array2<Complex64>,
    values: &[Complex64],
    num_qubits: usize,
    norm: Complex64,
) -> CoreResult<Complex64> {
    let n = coeff_matrix.nrows();
    expect_len(values, n * (n + 1) / 2 * num_qubits, "local")?;
    let averaged = values
        .chunks_exact(num_qubits.max(1))
        .map(|chunk| chunk.iter().sum::<Complex64>() / num_qubits.max(1) as f64);
    let m = hermitian_from_upper(n, averaged);
    Ok((weighted_sum(coeff_matrix, &m) + norm) * 0.5)
}

/// `1 - Re(terms / norm)`.
pub fn assemble_cost(norm: Complex64, terms: Complex64) -> f64 {
    1.0 - (terms / norm).re
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_coefficient_matrix_is_hermitian() {
        let m = coefficient_matrix(&[c(1.0, 2.0), c(-0.5, 0.3)]);
        assert_eq!(m[[0, 1]], m[[1, 0]].conj());
        assert_relative_eq!(m[[0, 0]].re, 5.0);
    }

    #[test]
    fn test_single_term_norm() {
        let cm = coefficient_matrix(&[c(2.0, 0.0)]);
        let norm = normalization_term(&cm, &[]).unwrap();
        assert_relative_eq!(norm.re, 4.0);
    }

    #[test]
    fn test_global_overlap_matches_direct() {
        let coeffs = [c(0.7, 0.0), c(0.2, -0.1), c(-0.4, 0.3)];
        let h = [c(0.3, 0.1), c(-0.2, 0.5), c(0.6, -0.4)];
        let cm = coefficient_matrix(&coeffs);
        let direct = global_terms(&cm, &h, false).unwrap();

        let mut upper = Vec::new();
        for i in 0..3 {
            for j in i..3 {
                upper.push(h[i].conj() * h[j]);
            }
        }
        let via_overlap = global_terms(&cm, &upper, true).unwrap();
        assert!((direct - via_overlap).norm() < 1e-12);

        let amplitude: Complex64 = coeffs.iter().zip(&h).map(|(ci, hi)| ci * hi).sum();
        assert_relative_eq!(direct.re, amplitude.norm_sqr(), epsilon = 1e-12);
        assert_relative_eq!(direct.im, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_perfect_solution_has_zero_cost() {
        // A = I, b = x: norm 1, overlap 1
        let cm = coefficient_matrix(&[c(1.0, 0.0)]);
        let norm = normalization_term(&cm, &[]).unwrap();
        let terms = global_terms(&cm, &[c(1.0, 0.0)], false).unwrap();
        assert_relative_eq!(assemble_cost(norm, terms), 0.0);

        let local = local_terms(&cm, &[c(1.0, 0.0), c(1.0, 0.0)], 2, norm).unwrap();
        assert_relative_eq!(assemble_cost(norm, local), 0.0);
    }

    #[test]
    fn test_length_checks() {
        let cm = coefficient_matrix(&[c(1.0, 0.0), c(1.0, 0.0)]);
        assert!(normalization_term(&cm, &[]).is_err());
        assert!(global_terms(&cm, &[c(1.0, 0.0)], false).is_err());
        assert!(global_terms(&cm, &[c(1.0, 0.0); 2], true).is_err());
        assert!(local_terms(&cm, &[c(1.0, 0.0); 3], 2, c(1.0, 0.0)).is_err());
    }
}
