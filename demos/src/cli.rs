//! Command-line arguments shared by the demo binaries.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use crate::config::DemoConfig;

#[derive(Debug, Clone, Parser)]
#[command(version, about = "Variational quantum linear solver demo")]
pub struct DemoArgs {
    /// YAML configuration file
    #[arg(short, long, env = "VQLS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of qubits of the linear system
    #[arg(short = 'n', long)]
    pub qubits: Option<usize>,

    /// Entangling layers of the ansatz
    #[arg(long)]
    pub reps: Option<usize>,

    /// Optimizer iteration cap
    #[arg(long)]
    pub maxiter: Option<usize>,

    /// Shots per primitive call (exact probabilities when omitted)
    #[arg(long, env = "VQLS_SHOTS")]
    pub shots: Option<u32>,

    /// Seed for the problem, initial point and shot noise
    #[arg(long, env = "VQLS_SEED")]
    pub seed: Option<u64>,

    /// Write a JSON report to this path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl DemoArgs {
    /// Configuration file settings with the command-line overrides applied.
    pub fn load_config(&self) -> Result<DemoConfig> {
        let mut config = DemoConfig::load(self.config.as_deref())?;
        if let Some(n) = self.qubits {
            config.num_qubits = n;
        }
        if let Some(reps) = self.reps {
            config.reps = reps;
        }
        if let Some(maxiter) = self.maxiter {
            config.optimizer = config.optimizer.with_maxiter(maxiter);
        }
        if let Some(shots) = self.shots {
            config.shots = Some(shots);
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        config.validate()?;
        Ok(config.resolved())
    }

    /// Write `report` as pretty JSON when `--output` was given.
    pub fn write_report(&self, report: &impl Serialize) -> Result<()> {
        let Some(path) = &self.output else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(report).context("serializing report")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing report to {}", path.display()))?;
        crate::print_info(&format!("report written to {}", path.display()));
        Ok(())
    }
}
