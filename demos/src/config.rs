//! Demo configuration.
//!
//! Settings come from an optional YAML file and are then overridden by
//! command-line arguments (see [`crate::cli::DemoArgs`]).
//!
//! ```yaml
//! num_qubits: 2
//! reps: 3
//! entanglement: full
//! optimizer:
//!   method: nelder_mead
//!   maxiter: 500
//! shots: 4096
//! seed: 7
//! vqls:
//!   use_local_cost_function: true
//! ```

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use vqls_core::{ClassicalOptimizer, EvqlsOptions, Optimizer, QstVqlsOptions, VqlsOptions};
use vqls_ir::library::Entanglement;

/// Widest system the demos accept; the overlap test doubles it plus one.
pub const MAX_DEMO_QUBITS: usize = 6;

/// Problem size, ansatz and solver settings shared by every demo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Qubits of the linear system (matrix size `2^n`).
    pub num_qubits: usize,
    /// Entangling layers of the real-amplitudes ansatz.
    pub reps: usize,
    pub entanglement: Entanglement,
    pub optimizer: ClassicalOptimizer,
    /// Shots for sampled primitives; `None` means exact probabilities.
    pub shots: Option<u32>,
    /// Seed for the problem, initial point and shot noise.
    pub seed: Option<u64>,
    pub vqls: VqlsOptions,
    pub evqls: EvqlsOptions,
    pub qst: QstVqlsOptions,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            num_qubits: 2,
            reps: 3,
            entanglement: Entanglement::Full,
            optimizer: ClassicalOptimizer::default().with_maxiter(2000),
            shots: None,
            seed: None,
            vqls: VqlsOptions::default(),
            evqls: EvqlsOptions::default(),
            qst: QstVqlsOptions::default(),
        }
    }
}

impl DemoConfig {
    /// Load from `path`, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Propagate the shared `shots` setting into the per-solver options and
    /// the shared `seed` into an SPSA optimizer that has none of its own.
    pub fn resolved(mut self) -> Self {
        if let Some(shots) = self.shots {
            self.vqls = self.vqls.with_shots(shots);
            self.evqls = self.evqls.with_shots(shots);
            self.qst = self.qst.with_shots(shots);
        }
        if let (Some(seed), ClassicalOptimizer::Spsa(spsa)) = (self.seed, &mut self.optimizer) {
            if spsa.seed.is_none() {
                spsa.seed = Some(seed);
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_qubits == 0 || self.num_qubits > MAX_DEMO_QUBITS {
            bail!(
                "num_qubits must be between 1 and {MAX_DEMO_QUBITS}, got {}",
                self.num_qubits
            );
        }
        if self.shots == Some(0) {
            bail!("shots must be positive");
        }
        self.optimizer.validate().context("invalid optimizer")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vqls_core::{NelderMead, Spsa, TomographyKind};

    #[test]
    fn test_defaults_are_valid() {
        let config = DemoConfig::default();
        config.validate().unwrap();
        assert_eq!(config.optimizer.name(), "nelder_mead");
        assert_eq!(config.shots, None);
    }

    #[test]
    fn test_yaml_overrides() {
        let yaml = r#"
num_qubits: 3
reps: 1
entanglement: linear
optimizer:
  method: spsa
  maxiter: 50
shots: 2048
evqls:
  tomography: simulator
"#;
        let config: DemoConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.num_qubits, 3);
        assert_eq!(config.entanglement, Entanglement::Linear);
        assert_eq!(config.optimizer, ClassicalOptimizer::from(Spsa::new().with_maxiter(50)));
        assert_eq!(config.evqls.tomography, TomographyKind::Simulator);
        // Unset sections keep their defaults.
        assert_eq!(config.qst, QstVqlsOptions::default());

        let resolved = config.resolved();
        assert_eq!(resolved.vqls.shots, Some(2048));
        assert_eq!(resolved.qst.shots, Some(2048));
    }

    #[test]
    fn test_seed_reaches_spsa() {
        let config = DemoConfig {
            optimizer: Spsa::new().with_maxiter(20).into(),
            seed: Some(9),
            ..DemoConfig::default()
        };
        assert_eq!(
            config.resolved().optimizer,
            ClassicalOptimizer::from(Spsa::new().with_maxiter(20).with_seed(9))
        );

        // an explicit optimizer seed wins
        let config = DemoConfig {
            optimizer: Spsa::new().with_seed(3).into(),
            seed: Some(9),
            ..DemoConfig::default()
        };
        assert_eq!(
            config.resolved().optimizer,
            ClassicalOptimizer::from(Spsa::new().with_seed(3))
        );

        // other methods are left alone
        let config = DemoConfig {
            seed: Some(9),
            ..DemoConfig::default()
        };
        assert_eq!(config.clone().resolved().optimizer, config.optimizer);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = DemoConfig {
            num_qubits: 9,
            ..DemoConfig::default()
        };
        assert!(config.validate().is_err());

        config.num_qubits = 2;
        config.shots = Some(0);
        assert!(config.validate().is_err());

        config.shots = None;
        config.optimizer = NelderMead::new().with_maxiter(0).into();
        assert!(config.validate().is_err());
    }
}
