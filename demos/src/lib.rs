//! VQLS Demo Suite
//!
//! Walkthroughs of the variational linear solvers on the local statevector
//! simulator:
//!
//! - **Dense**: random symmetric system solved with Hadamard-test VQLS
//! - **Unitary sum**: matrix given as weighted unitary circuits, right-hand
//!   side as a state-preparation circuit
//! - **EVQLS**: measurement-based cost with sign-recovering tomography
//! - **QST-VQLS**: cost evaluated from a reconstructed statevector

pub mod cli;
pub mod config;
pub mod problems;
pub mod runners;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use num_complex::Complex64;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::DemoConfig;
use crate::runners::{Demo, DemoReport};

/// Install the `tracing` subscriber. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A second call (demo-all running several demos) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

/// Create a progress bar for demo operations.
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}

/// Spinner ticking once per cost evaluation.
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_prefix(message.to_string());
    pb
}

/// Print a demo header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", style("═".repeat(60)).cyan());
    println!("{}", style(format!("  {}", title)).cyan().bold());
    println!("{}", style("═".repeat(60)).cyan());
    println!();
}

/// Print a demo section.
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("▶ {}", title)).green().bold());
    println!("{}", style("─".repeat(40)).dim());
}

/// Print a result line.
pub fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{}:", label)).dim(), value);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("⚠").yellow().bold(), message);
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("ℹ").blue(), message);
}

/// Side-by-side classical and variational solution amplitudes.
pub fn print_comparison(classical: &[Complex64], quantum: &[Complex64]) {
    println!(
        "  {:>6}  {:>22}  {:>22}",
        style("index").dim(),
        style("classical").dim(),
        style("vqls").dim()
    );
    for (k, (c, q)) in classical.iter().zip(quantum).enumerate() {
        println!(
            "  {:>6}  {:>22}  {:>22}",
            k,
            format_amplitude(*c),
            format_amplitude(*q)
        );
    }
}

/// Print the cost trajectory, thinned to at most `max_rows` lines.
pub fn print_cost_trajectory(history: &[f64], max_rows: usize) {
    if history.is_empty() {
        return;
    }
    let stride = history.len().div_ceil(max_rows.max(1));
    for (k, cost) in history.iter().enumerate().step_by(stride) {
        println!("  {:>6}  {:.6e}", k + 1, cost);
    }
    if (history.len() - 1) % stride != 0 {
        println!("  {:>6}  {:.6e}", history.len(), history[history.len() - 1]);
    }
}

/// Run `demo` and print the configuration, the solution comparison and the
/// cost trajectory.
pub fn present(demo: Demo, config: &DemoConfig) -> anyhow::Result<DemoReport> {
    print_header(demo.title());
    print_section("Configuration");
    print_result("Qubits", config.num_qubits);
    print_result("Ansatz", format!("real_amplitudes(reps={}, {:?})", config.reps, config.entanglement));
    print_result("Optimizer", config.optimizer.name());
    print_result(
        "Shots",
        config.shots.map_or("exact".to_string(), |s| s.to_string()),
    );
    if let Some(seed) = config.seed {
        print_result("Seed", seed);
    }

    let report = demo.run(config)?;

    print_section("Optimization");
    print_result("Final cost", format!("{:.6e}", report.optimal_value));
    print_result("Cost evaluations", report.cost_function_evals);
    print_result("Iterations", report.iterations);
    print_result("Converged", report.converged);
    print_result("Backend jobs", format!("{} on {}", report.jobs, report.backend));

    print_section("Solution");
    print_comparison(&report.classical_solution, &report.vqls_solution);
    print_result("Max abs error", format!("{:.3e}", report.max_abs_error));
    if report.max_abs_error < 1e-2 {
        print_success("variational solution matches the classical one");
    } else {
        print_warning("variational solution differs from the classical one");
    }

    print_section("Cost trajectory");
    print_cost_trajectory(&report.cost_history, 15);

    Ok(report)
}

fn format_amplitude(a: Complex64) -> String {
    if a.im.abs() < 1e-9 {
        format!("{:+.6}", a.re)
    } else {
        format!("{:+.6}{:+.6}i", a.re, a.im)
    }
}
