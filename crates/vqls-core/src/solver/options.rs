//! Typed solver options.

use serde::{Deserialize, Serialize};

use crate::tomography::TomographyKind;

/// Options of [`Vqls`](super::Vqls).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VqlsOptions {
    /// Evaluate the global term with the sampler-based overlap test.
    pub use_overlap_test: bool,
    /// Use the local cost function.
    pub use_local_cost_function: bool,
    /// Shots for sampled circuits; `None` asks for exact distributions.
    pub shots: Option<u32>,
}

impl VqlsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overlap_test(mut self, enabled: bool) -> Self {
        self.use_overlap_test = enabled;
        self
    }

    pub fn with_local_cost_function(mut self, enabled: bool) -> Self {
        self.use_local_cost_function = enabled;
        self
    }

    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = Some(shots);
        self
    }
}

/// Options of [`Evqls`](super::Evqls).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvqlsOptions {
    /// How amplitude signs of the ansatz are recovered.
    pub tomography: TomographyKind,
    pub shots: Option<u32>,
}

impl EvqlsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tomography(mut self, tomography: TomographyKind) -> Self {
        self.tomography = tomography;
        self
    }

    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = Some(shots);
        self
    }
}

/// Options of [`QstVqls`](super::QstVqls).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QstVqlsOptions {
    /// How the ansatz statevector is reconstructed.
    pub tomography: TomographyKind,
    pub shots: Option<u32>,
}

impl QstVqlsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tomography(mut self, tomography: TomographyKind) -> Self {
        self.tomography = tomography;
        self
    }

    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = Some(shots);
        self
    }
}
