//! VQLS from a reconstructed ansatz statevector.

use std::sync::Arc;

use vqls_hal::Sampler;
use vqls_ir::Circuit;

use super::{
    Callback, MatrixInput, QstVqlsOptions, VariationalLinearSolver, Variational, VectorInput,
    VqlsResult, tomography_for,
};
use crate::cost::{assemble_cost, coefficient_matrix, global_terms, normalization_term};
use crate::decomposition::{ContractedPauliDecomposition, pauli_expectation, pauli_overlaps};
use crate::error::{CoreResult, VqlsError};
use crate::optimizers::{ClassicalOptimizer, Optimizer};

/// VQLS evaluated entirely on the classical side once the ansatz state is
/// known. Each cost call runs one tomography; norm values come from the
/// unique contracted strings and overlaps from the Pauli terms.
pub struct QstVqls<O = ClassicalOptimizer> {
    sampler: Option<Arc<dyn Sampler>>,
    variational: Variational<O>,
    options: QstVqlsOptions,
}

impl<O: Optimizer> QstVqls<O> {
    pub fn new(ansatz: Circuit, optimizer: O) -> Self {
        Self {
            sampler: None,
            variational: Variational::new(ansatz, optimizer),
            options: QstVqlsOptions::default(),
        }
    }

    /// Sampler for the sampled tomographies.
    pub fn with_sampler(mut self, sampler: Arc<dyn Sampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    pub fn with_options(mut self, options: QstVqlsOptions) -> Self {
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

    pub fn options(&self) -> &QstVqlsOptions {
        &self.options
    }
}

impl<O: Optimizer> VariationalLinearSolver for QstVqls<O> {
    fn solve_with_callback(
        &self,
        matrix: MatrixInput,
        vector: VectorInput,
        callback: Callback<'_>,
    ) -> CoreResult<VqlsResult> {
        let matrix = matrix.into_dense("QST-VQLS")?;
        let rhs = vector.into_normalized("QST-VQLS")?;
        if rhs.len() != matrix.nrows() {
            return Err(VqlsError::DimensionMismatch(format!(
                "matrix has {} rows, vector has {} entries",
                matrix.nrows(),
                rhs.len()
            )));
        }

        let decomposition = ContractedPauliDecomposition::new(&matrix)?;
        self.variational.check_width(decomposition.num_qubits(), "matrix")?;
        self.variational.num_parameters()?;

        let tomography = tomography_for(
            self.options.tomography,
            &self.variational.ansatz,
            self.sampler.as_ref(),
            self.options.shots,
        )?;
        let coeff_matrix = coefficient_matrix(&decomposition.pauli().coefficients());

        let cost = |params: &[f64]| -> CoreResult<f64> {
            let state = tomography.statevector(params)?;
            let unique_values = decomposition
                .unique_strings()
                .iter()
                .map(|string| pauli_expectation(string, &state))
                .collect::<CoreResult<Vec<_>>>()?;
            let norm_values = decomposition.post_process_norm_values(&unique_values)?;
            let norm = normalization_term(&coeff_matrix, &norm_values)?;
            let overlaps = pauli_overlaps(decomposition.pauli().strings(), &state, &rhs)?;
            let terms = global_terms(&coeff_matrix, &overlaps, false)?;
            Ok(assemble_cost(norm, terms))
        };

        self.variational.run("qst_vqls", cost, callback)
    }
}
