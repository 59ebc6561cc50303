//! Decompositions of the system matrix into weighted unitaries.
//!
//! A matrix is written as `A = Σ_i c_i A_i` where every `A_i` is a circuit.
//! Dense matrices go through a Pauli decomposition; the contracted and
//! optimized variants additionally precompute the pairwise products
//! `A_i† A_j` needed by measurement-based cost evaluation.

mod contracted;
mod optimized;
mod pauli;
mod unitary;

pub use contracted::ContractedPauliDecomposition;
pub use optimized::{MeasurementGroup, OptimizedPauliDecomposition};
pub use pauli::PauliDecomposition;
pub use unitary::{MatrixDecomposition, UnitaryTerm};

use num_complex::Complex64;
use vqls_ir::PauliString;

use crate::error::{CoreResult, VqlsError};

/// `⟨b|P_i|x⟩` for every string `P_i`.
pub fn pauli_overlaps(
    strings: &[PauliString],
    amplitudes: &[Complex64],
    rhs: &[Complex64],
) -> CoreResult<Vec<Complex64>> {
    if amplitudes.len() != rhs.len() {
        return Err(VqlsError::DimensionMismatch(format!(
            "state has {} amplitudes, right-hand side has {}",
            amplitudes.len(),
            rhs.len()
        )));
    }
    strings
        .iter()
        .map(|p| {
            // Pauli strings are Hermitian: ⟨b|P|x⟩ = ⟨Pb|x⟩.
            let pb = p.apply(rhs)?;
            Ok(pb
                .iter()
                .zip(amplitudes)
                .map(|(l, r)| l.conj() * r)
                .sum())
        })
        .collect()
}

/// `⟨x|P|x⟩` for a dense state.
pub fn pauli_expectation(string: &PauliString, amplitudes: &[Complex64]) -> CoreResult<Complex64> {
    let px = string.apply(amplitudes)?;
    Ok(amplitudes
        .iter()
        .zip(&px)
        .map(|(l, r)| l.conj() * r)
        .sum())
}
