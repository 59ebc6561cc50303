//! Hadamard-test VQLS.

use std::sync::Arc;

use tracing::debug;
use vqls_hal::{Estimator, Sampler};
use vqls_ir::library::state_preparation;
use vqls_ir::{Circuit, Pauli, PauliString};

use super::{
    Callback, MatrixInput, VariationalLinearSolver, Variational, VectorInput, VqlsOptions,
    VqlsResult,
};
use crate::cost::{
    assemble_cost, coefficient_matrix, global_terms, local_terms, normalization_term,
};
use crate::decomposition::{MatrixDecomposition, PauliDecomposition};
use crate::error::{CoreResult, VqlsError};
use crate::hadamard::{
    BatchHadamardOverlapTest, BatchHadamardTest, HadamardOverlapTest, HadamardTest,
};
use crate::optimizers::{ClassicalOptimizer, Optimizer};

/// Variational Quantum Linear Solver (Bravo-Prieto et al., arXiv:1909.05820).
///
/// The matrix is a weighted sum of unitary circuits `A_i` and the right-hand
/// side a circuit `U` with `U|0⟩ = |b⟩`. The cost is assembled from
/// Hadamard tests evaluated with an estimator, or, for the overlap variant
/// of the global term, with a sampler.
pub struct Vqls<O = ClassicalOptimizer> {
    estimator: Arc<dyn Estimator>,
    sampler: Option<Arc<dyn Sampler>>,
    variational: Variational<O>,
    options: VqlsOptions,
}

/// Circuits of one solve, built once and evaluated at every cost call.
enum GlobalTerm {
    Direct(BatchHadamardTest),
    Overlap(BatchHadamardOverlapTest),
    Local(BatchHadamardTest),
}

impl<O: Optimizer> Vqls<O> {
    pub fn new(estimator: Arc<dyn Estimator>, ansatz: Circuit, optimizer: O) -> Self {
        Self {
            estimator,
            sampler: None,
            variational: Variational::new(ansatz, optimizer),
            options: VqlsOptions::default(),
        }
    }

    /// Sampler for the overlap Hadamard test.
    pub fn with_sampler(mut self, sampler: Arc<dyn Sampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    pub fn with_options(mut self, options: VqlsOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_initial_point(mut self, point: Vec<f64>) -> Self {
        self.variational.initial_point = Some(point);
        self
    }

    /// Seed for the random initial point.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.variational.seed = Some(seed);
        self
    }

    pub fn ansatz(&self) -> &Circuit {
        &self.variational.ansatz
    }

    pub fn options(&self) -> &VqlsOptions {
        &self.options
    }

    fn validate_options(&self) -> CoreResult<()> {
        if self.options.use_overlap_test && self.sampler.is_none() {
            return Err(VqlsError::MissingSampler);
        }
        if self.options.use_overlap_test && self.options.use_local_cost_function {
            return Err(VqlsError::UnsupportedInput(
                "the local cost function cannot be combined with the overlap test".to_string(),
            ));
        }
        Ok(())
    }

    fn decompose(matrix: MatrixInput) -> CoreResult<MatrixDecomposition> {
        match matrix {
            MatrixInput::Dense(m) => Ok(PauliDecomposition::new(&m)?.into_decomposition()),
            MatrixInput::Decomposition(d) => Ok(d),
        }
    }

    fn rhs_circuit(vector: VectorInput) -> CoreResult<Circuit> {
        match vector {
            VectorInput::Dense(b) => Ok(state_preparation(&b.to_vec())?),
            VectorInput::Circuit(c) if c.is_parameterized() => Err(VqlsError::UnsupportedInput(
                "right-hand side circuit must not have free parameters".to_string(),
            )),
            VectorInput::Circuit(c) => Ok(c),
        }
    }

    /// `⟨x|A_i† A_j|x⟩` for `i < j`.
    fn norm_tests(&self, dec: &MatrixDecomposition) -> CoreResult<BatchHadamardTest> {
        let ansatz = &self.variational.ansatz;
        let terms = dec.terms();
        let mut tests = Vec::new();
        for i in 0..terms.len() {
            for j in i + 1..terms.len() {
                let mut op = terms[j].circuit.clone().with_name(format!("a{i}dg_a{j}"));
                op.compose(&terms[i].circuit.inverse())?;
                tests.push(HadamardTest::new(&op, Some(ansatz))?);
            }
        }
        Ok(BatchHadamardTest::new(&tests))
    }

    fn global_tests(&self, dec: &MatrixDecomposition, rhs: &Circuit) -> CoreResult<GlobalTerm> {
        let ansatz = &self.variational.ansatz;
        let terms = dec.terms();
        let rhs_dg = rhs.inverse();

        if self.options.use_local_cost_function {
            let n = ansatz.num_qubits();
            let mut tests = Vec::new();
            for i in 0..terms.len() {
                for j in i..terms.len() {
                    for k in 0..n {
                        // A_j, U†, Z_k, U, A_i†
                        let mut op = terms[j].circuit.clone().with_name(format!("local_{i}_{j}_z{k}"));
                        op.compose(&rhs_dg)?;
                        op.compose(&PauliString::single(Pauli::Z, k, n).to_circuit())?;
                        op.compose(rhs)?;
                        op.compose(&terms[i].circuit.inverse())?;
                        tests.push(HadamardTest::new(&op, Some(ansatz))?);
                    }
                }
            }
            return Ok(GlobalTerm::Local(BatchHadamardTest::new(&tests)));
        }

        if self.options.use_overlap_test {
            let mut tests = Vec::new();
            for i in 0..terms.len() {
                for j in i..terms.len() {
                    // h_j conj(h_i)
                    tests.push(HadamardOverlapTest::new(
                        rhs,
                        &terms[j].circuit,
                        &terms[i].circuit,
                        Some(ansatz),
                        self.options.shots,
                    )?);
                }
            }
            return Ok(GlobalTerm::Overlap(BatchHadamardOverlapTest::new(tests)));
        }

        // ⟨0|U† A_i V|0⟩
        let tests = terms
            .iter()
            .enumerate()
            .map(|(i, term)| -> CoreResult<HadamardTest> {
                let mut op = ansatz.clone().with_name(format!("udg_a{i}_v"));
                op.compose(&term.circuit)?;
                op.compose(&rhs_dg)?;
                HadamardTest::new(&op, None)
            })
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(GlobalTerm::Direct(BatchHadamardTest::new(&tests)))
    }
}

impl<O: Optimizer> VariationalLinearSolver for Vqls<O> {
    fn solve_with_callback(
        &self,
        matrix: MatrixInput,
        vector: VectorInput,
        callback: Callback<'_>,
    ) -> CoreResult<VqlsResult> {
        self.validate_options()?;
        let dec = Self::decompose(matrix)?;
        let rhs = Self::rhs_circuit(vector)?;
        if rhs.num_qubits() != dec.num_qubits() {
            return Err(VqlsError::DimensionMismatch(format!(
                "matrix acts on {} qubits, vector on {}",
                dec.num_qubits(),
                rhs.num_qubits()
            )));
        }
        self.variational.check_width(dec.num_qubits(), "matrix")?;
        self.variational.num_parameters()?;

        let coeff_matrix = coefficient_matrix(&dec.coefficients());
        let norm_tests = self.norm_tests(&dec)?;
        let global = self.global_tests(&dec, &rhs)?;
        let num_qubits = dec.num_qubits();
        debug!(terms = dec.len(), norm_tests = norm_tests.len(), "built hadamard tests");

        let estimator = self.estimator.as_ref();
        let sampler = self.sampler.as_deref();
        let cost = |params: &[f64]| -> CoreResult<f64> {
            let norm_values = norm_tests.get_values(estimator, params)?;
            let norm = normalization_term(&coeff_matrix, &norm_values)?;
            let terms = match &global {
                GlobalTerm::Direct(batch) => {
                    global_terms(&coeff_matrix, &batch.get_values(estimator, params)?, false)?
                }
                GlobalTerm::Overlap(batch) => {
                    let sampler = sampler.ok_or(VqlsError::MissingSampler)?;
                    global_terms(&coeff_matrix, &batch.get_values(sampler, params)?, true)?
                }
                GlobalTerm::Local(batch) => local_terms(
                    &coeff_matrix,
                    &batch.get_values(estimator, params)?,
                    num_qubits,
                    norm,
                )?,
            };
            Ok(assemble_cost(norm, terms))
        };

        self.variational.run("vqls", cost, callback)
    }
}
