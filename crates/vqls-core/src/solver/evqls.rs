//! Measurement-based VQLS over an optimized Pauli decomposition.

use std::sync::Arc;

use num_complex::Complex64;
use tracing::debug;
use vqls_hal::Sampler;
use vqls_ir::Circuit;

use super::{
    Callback, EvqlsOptions, MatrixInput, VariationalLinearSolver, Variational, VectorInput,
    VqlsResult, tomography_for,
};
use crate::cost::{assemble_cost, coefficient_matrix, global_terms, normalization_term};
use crate::decomposition::OptimizedPauliDecomposition;
use crate::error::{CoreResult, VqlsError};
use crate::hadamard::{BatchDirectHadamardTest, DirectHadamardTest};
use crate::optimizers::{ClassicalOptimizer, Optimizer};

/// VQLS without Hadamard tests.
///
/// The pair products `P_i P_j` of the Pauli decomposition are grouped into
/// qubit-wise commuting sets. Each set is measured with one basis rotation
/// after the ansatz, which yields every norm value of the group at once. The
/// overlaps `⟨b|P_i|x⟩` are computed classically from the ansatz amplitudes,
/// whose magnitudes come from the plain ansatz distribution and whose signs
/// come from a tomography.
pub struct Evqls<O = ClassicalOptimizer> {
    sampler: Arc<dyn Sampler>,
    variational: Variational<O>,
    options: EvqlsOptions,
}

impl<O: Optimizer> Evqls<O> {
    pub fn new(sampler: Arc<dyn Sampler>, ansatz: Circuit, optimizer: O) -> Self {
        Self {
            sampler,
            variational: Variational::new(ansatz, optimizer),
            options: EvqlsOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EvqlsOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_initial_point(mut self, point: Vec<f64>) -> Self {
        self.variational.initial_point = Some(point);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.variational.seed = Some(seed);
        self
    }

    pub fn ansatz(&self) -> &Circuit {
        &self.variational.ansatz
    }

    pub fn options(&self) -> &EvqlsOptions {
        &self.options
    }
}

impl<O: Optimizer> VariationalLinearSolver for Evqls<O> {
    fn solve_with_callback(
        &self,
        matrix: MatrixInput,
        vector: VectorInput,
        callback: Callback<'_>,
    ) -> CoreResult<VqlsResult> {
        let matrix = matrix.into_dense("EVQLS")?;
        let rhs = vector.into_normalized("EVQLS")?;
        if rhs.len() != matrix.nrows() {
            return Err(VqlsError::DimensionMismatch(format!(
                "matrix has {} rows, vector has {} entries",
                matrix.nrows(),
                rhs.len()
            )));
        }

        let decomposition = OptimizedPauliDecomposition::new(&matrix)?;
        self.variational.check_width(decomposition.num_qubits(), "matrix")?;
        self.variational.num_parameters()?;

        let ansatz = &self.variational.ansatz;
        let shots = self.options.shots;
        // One circuit per measurement group, then the bare ansatz.
        let mut tests = decomposition
            .basis_rotations()
            .map(|rotation| DirectHadamardTest::new(ansatz, Some(rotation), shots))
            .collect::<CoreResult<Vec<_>>>()?;
        tests.push(DirectHadamardTest::new(ansatz, None, shots)?);
        let direct = BatchDirectHadamardTest::new(&tests);
        let num_groups = decomposition.groups().len();

        let tomography = tomography_for(
            self.options.tomography,
            ansatz,
            Some(&self.sampler),
            shots,
        )?;
        let coeff_matrix = coefficient_matrix(&decomposition.contracted().pauli().coefficients());
        debug!(
            terms = coeff_matrix.nrows(),
            groups = num_groups,
            "built measurement groups"
        );

        let sampler = self.sampler.as_ref();
        let cost = |params: &[f64]| -> CoreResult<f64> {
            let mut samples = direct.get_values(sampler, params)?;
            let probabilities = samples.pop().ok_or_else(|| {
                VqlsError::DimensionMismatch("sampler returned no distributions".to_string())
            })?;
            let norm_values = decomposition.norm_values(&samples)?;
            let norm = normalization_term(&coeff_matrix, &norm_values)?;

            let signs = tomography.relative_signs(params)?;
            let amplitudes: Vec<_> = probabilities
                .iter()
                .zip(&signs)
                .map(|(p, s)| Complex64::new(s * p.max(0.0).sqrt(), 0.0))
                .collect();
            let overlaps = decomposition.overlap_values(&amplitudes, &rhs)?;
            let terms = global_terms(&coeff_matrix, &overlaps, false)?;
            Ok(assemble_cost(norm, terms))
        };

        self.variational.run("evqls", cost, callback)
    }
}
