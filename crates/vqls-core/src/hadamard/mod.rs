//! Hadamard-test circuit families.
//!
//! - [`HadamardTest`]: `⟨ψ|O|ψ⟩` from a control qubit, evaluated with an
//!   estimator.
//! - [`HadamardOverlapTest`]: `⟨0|U†A_lV|0⟩⟨0|V†A_m†U|0⟩` from a Bell-basis
//!   measurement of two registers, evaluated with a sampler.
//! - [`DirectHadamardTest`]: the ansatz (plus an optional basis rotation)
//!   sampled directly.

mod direct;
mod overlap;
mod standard;

pub use direct::{BatchDirectHadamardTest, DirectHadamardTest};
pub use overlap::{BatchHadamardOverlapTest, HadamardOverlapTest};
pub use standard::{BatchHadamardTest, HadamardTest};

use crate::error::{CoreResult, VqlsError};

/// Fail unless a primitive returned one result per submitted item.
pub(crate) fn check_result_count<T>(results: &[T], expected: usize, primitive: &str) -> CoreResult<()> {
    if results.len() != expected {
        return Err(VqlsError::DimensionMismatch(format!(
            "{primitive} returned {} results for {expected} circuits",
            results.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vqls_hal::{Estimator, HalResult, QuasiDistribution, Sampler};
    use vqls_ir::{Circuit, Observable};

    /// Answers every call with a single result.
    struct Truncating;

    impl Sampler for Truncating {
        fn sample(&self, _: &[Circuit], _: &[f64], _: Option<u32>) -> HalResult<Vec<QuasiDistribution>> {
            Ok(vec![QuasiDistribution::from_dense(&[1.0])])
        }
    }

    impl Estimator for Truncating {
        fn estimate(&self, _: &[Circuit], _: &[Observable], _: &[f64]) -> HalResult<Vec<f64>> {
            Ok(vec![1.0])
        }
    }

    fn is_mismatch<T: std::fmt::Debug>(result: CoreResult<T>) -> bool {
        matches!(result, Err(VqlsError::DimensionMismatch(_)))
    }

    #[test]
    fn test_short_primitive_results_are_errors() {
        let mut op = Circuit::new("x", 1);
        op.x(0).unwrap();
        let id = Circuit::new("id", 1);

        let hadamard = HadamardTest::new(&op, None).unwrap();
        assert!(is_mismatch(hadamard.get_value(&Truncating, &[])));
        let batch = BatchHadamardTest::new(&[hadamard.clone(), hadamard]);
        assert!(is_mismatch(batch.get_values(&Truncating, &[])));

        let overlap = HadamardOverlapTest::new(&id, &op, &id, None, None).unwrap();
        assert!(is_mismatch(overlap.get_value(&Truncating, &[])));
        let batch = BatchHadamardOverlapTest::new(vec![overlap]);
        assert!(is_mismatch(batch.get_values(&Truncating, &[])));

        let direct = DirectHadamardTest::new(&op, None, None).unwrap();
        let batch = BatchDirectHadamardTest::new(&[direct.clone(), direct]);
        assert!(is_mismatch(batch.get_values(&Truncating, &[])));
    }

    #[test]
    fn test_result_count_message() {
        let err = check_result_count(&[0.0; 3], 4, "estimator").unwrap_err();
        assert_eq!(err.to_string(), "dimension mismatch: estimator returned 3 results for 4 circuits");
    }
}
