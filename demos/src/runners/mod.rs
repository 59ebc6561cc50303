//! Demo runners.
//!
//! Every runner opens a [`Session`] on the statevector simulator, builds its
//! solver from the [`DemoConfig`], solves with a live progress spinner,
//! closes the session and compares the result with the classical solution.

use std::sync::Arc;

use anyhow::{Context, Result};
use ndarray::Array1;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::info;
use vqls_adapter_sim::SimBackend;
use vqls_core::linalg::{align_sign, max_abs_error};
use vqls_core::{
    Evqls, MatrixInput, QstVqls, VariationalLinearSolver, VectorInput, Vqls, VqlsResult,
};
use vqls_hal::{Estimator, Sampler, Session};
use vqls_ir::library::real_amplitudes;

use crate::config::DemoConfig;
use crate::create_spinner;
use crate::problems::{DenseProblem, UnitarySumProblem};

/// Summary of one demo run, written by `--output`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoReport {
    pub demo: String,
    pub num_qubits: usize,
    pub backend: String,
    /// Primitive calls served by the session.
    pub jobs: usize,
    pub optimal_value: f64,
    pub cost_function_evals: usize,
    pub iterations: usize,
    pub converged: bool,
    pub cost_history: Vec<f64>,
    pub optimal_point: Vec<f64>,
    pub classical_solution: Vec<Complex64>,
    pub vqls_solution: Vec<Complex64>,
    /// Largest amplitude difference after sign alignment.
    pub max_abs_error: f64,
}

/// The four demos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demo {
    Dense,
    UnitarySum,
    Evqls,
    Qst,
}

impl Demo {
    pub const ALL: [Demo; 4] = [Demo::Dense, Demo::UnitarySum, Demo::Evqls, Demo::Qst];

    pub fn name(self) -> &'static str {
        match self {
            Demo::Dense => "dense",
            Demo::UnitarySum => "unitary_sum",
            Demo::Evqls => "evqls",
            Demo::Qst => "qst_vqls",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Demo::Dense => "VQLS: dense symmetric system",
            Demo::UnitarySum => "VQLS: weighted sum of unitaries",
            Demo::Evqls => "EVQLS: measurement-based cost",
            Demo::Qst => "QST-VQLS: tomography-based cost",
        }
    }

    pub fn run(self, config: &DemoConfig) -> Result<DemoReport> {
        match self {
            Demo::Dense => run_dense(config),
            Demo::UnitarySum => run_unitary_sum(config),
            Demo::Evqls => run_evqls(config),
            Demo::Qst => run_qst(config),
        }
    }
}

/// Simulator honouring the demo seed, with a shot-based estimator when
/// `shots` is set.
fn backend(config: &DemoConfig) -> SimBackend {
    let mut backend = SimBackend::new();
    if let Some(seed) = config.seed {
        backend = backend.with_seed(seed);
    }
    if let Some(shots) = config.shots {
        backend = backend.with_estimator_shots(shots);
    }
    backend
}

fn ansatz(config: &DemoConfig, num_qubits: usize) -> vqls_ir::Circuit {
    real_amplitudes(num_qubits, config.reps, config.entanglement)
}

/// Hadamard-test VQLS on a random dense system.
pub fn run_dense(config: &DemoConfig) -> Result<DemoReport> {
    let problem = DenseProblem::random_symmetric(config.num_qubits, config.seed)?;
    let session = Session::open(&backend(config));
    let estimator: Arc<dyn Estimator> = session.clone();
    let sampler: Arc<dyn Sampler> = session.clone();

    let mut solver = Vqls::new(
        estimator,
        ansatz(config, problem.num_qubits()),
        config.optimizer.clone(),
    )
    .with_sampler(sampler)
    .with_options(config.vqls);
    if let Some(seed) = config.seed {
        solver = solver.with_seed(seed);
    }

    let result = solve_with_progress(
        Demo::Dense,
        &solver,
        MatrixInput::from(&problem.matrix),
        VectorInput::from(&problem.rhs),
    );
    finish(Demo::Dense, &session, result, &problem.solution)
}

/// Hadamard-test VQLS on a unitary-sum system with a circuit right-hand side.
pub fn run_unitary_sum(config: &DemoConfig) -> Result<DemoReport> {
    let problem = UnitarySumProblem::ising_like(config.num_qubits)?;
    let session = Session::open(&backend(config));
    let estimator: Arc<dyn Estimator> = session.clone();
    let sampler: Arc<dyn Sampler> = session.clone();

    let mut solver = Vqls::new(
        estimator,
        ansatz(config, problem.num_qubits()),
        config.optimizer.clone(),
    )
    .with_sampler(sampler)
    .with_options(config.vqls);
    if let Some(seed) = config.seed {
        solver = solver.with_seed(seed);
    }

    let result = solve_with_progress(
        Demo::UnitarySum,
        &solver,
        MatrixInput::from(problem.decomposition.clone()),
        VectorInput::from(problem.rhs.clone()),
    );
    finish(Demo::UnitarySum, &session, result, &problem.solution)
}

/// EVQLS on a random dense system.
pub fn run_evqls(config: &DemoConfig) -> Result<DemoReport> {
    let problem = DenseProblem::random_symmetric(config.num_qubits, config.seed)?;
    let session = Session::open(&backend(config));
    let sampler: Arc<dyn Sampler> = session.clone();

    let mut solver = Evqls::new(
        sampler,
        ansatz(config, problem.num_qubits()),
        config.optimizer.clone(),
    )
    .with_options(config.evqls);
    if let Some(seed) = config.seed {
        solver = solver.with_seed(seed);
    }

    let result = solve_with_progress(
        Demo::Evqls,
        &solver,
        MatrixInput::from(&problem.matrix),
        VectorInput::from(&problem.rhs),
    );
    finish(Demo::Evqls, &session, result, &problem.solution)
}

/// QST-VQLS on a random dense system.
pub fn run_qst(config: &DemoConfig) -> Result<DemoReport> {
    let problem = DenseProblem::random_symmetric(config.num_qubits, config.seed)?;
    let session = Session::open(&backend(config));
    let sampler: Arc<dyn Sampler> = session.clone();

    let mut solver = QstVqls::new(ansatz(config, problem.num_qubits()), config.optimizer.clone())
        .with_sampler(sampler)
        .with_options(config.qst);
    if let Some(seed) = config.seed {
        solver = solver.with_seed(seed);
    }

    let result = solve_with_progress(
        Demo::Qst,
        &solver,
        MatrixInput::from(&problem.matrix),
        VectorInput::from(&problem.rhs),
    );
    finish(Demo::Qst, &session, result, &problem.solution)
}

fn solve_with_progress(
    demo: Demo,
    solver: &impl VariationalLinearSolver,
    matrix: MatrixInput,
    vector: VectorInput,
) -> vqls_core::CoreResult<VqlsResult> {
    let pb = create_spinner(demo.name());
    let result = solver.solve_with_callback(matrix, vector, &mut |evals, cost, _| {
        pb.set_message(format!("eval {evals:>5}  cost {cost:.6e}"));
        pb.tick();
    });
    pb.finish_and_clear();
    result
}

/// Close the session and compare with the classical solution.
fn finish(
    demo: Demo,
    session: &Session,
    result: vqls_core::CoreResult<VqlsResult>,
    classical: &Array1<Complex64>,
) -> Result<DemoReport> {
    let jobs = session.num_jobs();
    let backend = session.backend_name().to_string();
    session.close();
    let result = result.with_context(|| format!("{} solve failed", demo.name()))?;

    let solution = result.solution_vector()?;
    let aligned = align_sign(classical, &solution);
    let error = max_abs_error(classical, &aligned);
    info!(demo = demo.name(), cost = result.optimal_value, error, "demo finished");

    Ok(DemoReport {
        demo: demo.name().to_string(),
        num_qubits: result.state.num_qubits(),
        backend,
        jobs,
        optimal_value: result.optimal_value,
        cost_function_evals: result.cost_function_evals,
        iterations: result.iterations,
        converged: result.converged,
        cost_history: result.cost_history,
        optimal_point: result.optimal_point,
        classical_solution: classical.to_vec(),
        vqls_solution: aligned.to_vec(),
        max_abs_error: error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vqls_core::NelderMead;

    fn small_config() -> DemoConfig {
        DemoConfig {
            num_qubits: 1,
            reps: 1,
            optimizer: NelderMead::new().with_maxiter(400).into(),
            seed: Some(21),
            ..DemoConfig::default()
        }
    }

    #[test]
    fn test_every_demo_runs_on_one_qubit() {
        let config = small_config();
        for demo in Demo::ALL {
            let report = demo.run(&config).unwrap();
            assert_eq!(report.demo, demo.name());
            assert_eq!(report.num_qubits, 1);
            assert!(report.jobs > 0);
            assert_eq!(report.cost_history.len(), report.cost_function_evals);
            assert!(report.max_abs_error < 1e-2, "{}: {}", demo.name(), report.max_abs_error);
        }
    }

    #[test]
    fn test_shots_make_the_dense_demo_sampled() {
        let exact = DemoConfig {
            optimizer: NelderMead::new().with_maxiter(5).into(),
            ..small_config()
        };
        let sampled = DemoConfig {
            shots: Some(16),
            ..exact.clone()
        }
        .resolved();

        let exact = run_dense(&exact).unwrap();
        let sampled = run_dense(&sampled).unwrap();
        assert_ne!(exact.cost_history, sampled.cost_history);
    }

    #[test]
    fn test_report_serializes() {
        let report = run_qst(&small_config()).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        let back: DemoReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.cost_history, report.cost_history);
    }
}
