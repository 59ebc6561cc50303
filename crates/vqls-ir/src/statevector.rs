//! Dense statevector simulation.

use num_complex::Complex64;

use crate::circuit::{Circuit, Instruction};
use crate::error::{IrError, IrResult};
use crate::pauli::{Observable, PauliString};

/// Amplitudes of an `n`-qubit pure state, little-endian basis ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    num_qubits: usize,
    amplitudes: Vec<Complex64>,
}

impl Statevector {
    /// |0…0⟩
    pub fn zero(num_qubits: usize) -> Self {
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            num_qubits,
            amplitudes,
        }
    }

    /// Wrap raw amplitudes. The length must be a power of two; no normalization.
    pub fn from_amplitudes(amplitudes: Vec<Complex64>) -> IrResult<Self> {
        let len = amplitudes.len();
        if len == 0 || !len.is_power_of_two() {
            return Err(IrError::NotPowerOfTwo(len));
        }
        Ok(Self {
            num_qubits: len.trailing_zeros() as usize,
            amplitudes,
        })
    }

    /// Run `circuit` from |0…0⟩.
    pub fn from_circuit(circuit: &Circuit, params: &[f64]) -> IrResult<Self> {
        let mut state = Self::zero(circuit.num_qubits());
        state.evolve(circuit, params)?;
        Ok(state)
    }

    /// Apply every instruction of `circuit` in order.
    pub fn evolve(&mut self, circuit: &Circuit, params: &[f64]) -> IrResult<()> {
        if circuit.num_qubits() != self.num_qubits {
            return Err(IrError::DimensionMismatch {
                expected: self.num_qubits,
                actual: circuit.num_qubits(),
            });
        }
        let required = circuit.num_parameters();
        if params.len() < required {
            return Err(IrError::MissingParameters {
                required,
                provided: params.len(),
            });
        }
        for instr in circuit.instructions() {
            self.apply(instr, params)?;
        }
        Ok(())
    }

    fn apply(&mut self, instr: &Instruction, params: &[f64]) -> IrResult<()> {
        let m = instr.gate.matrix(params)?;
        let target = 1usize << instr.target;
        let control_mask = instr.controls.iter().fold(0usize, |acc, &c| acc | (1 << c));

        for i in 0..self.amplitudes.len() {
            if i & target == 0 && i & control_mask == control_mask {
                let j = i | target;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
        Ok(())
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Hilbert space dimension.
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    pub fn into_amplitudes(self) -> Vec<Complex64> {
        self.amplitudes
    }

    /// Born-rule probabilities.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    pub fn norm(&self) -> f64 {
        self.amplitudes
            .iter()
            .map(|a| a.norm_sqr())
            .sum::<f64>()
            .sqrt()
    }

    /// ⟨self|other⟩
    pub fn inner(&self, other: &Statevector) -> IrResult<Complex64> {
        if other.dim() != self.dim() {
            return Err(IrError::DimensionMismatch {
                expected: self.dim(),
                actual: other.dim(),
            });
        }
        Ok(self
            .amplitudes
            .iter()
            .zip(&other.amplitudes)
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// ⟨ψ|P|ψ⟩ for a Pauli string.
    pub fn expectation(&self, pauli: &PauliString) -> IrResult<f64> {
        if pauli.num_qubits() != self.num_qubits {
            return Err(IrError::DimensionMismatch {
                expected: self.num_qubits,
                actual: pauli.num_qubits(),
            });
        }
        let mut value = Complex64::new(0.0, 0.0);
        for (i, &amp) in self.amplitudes.iter().enumerate() {
            let (j, phase) = pauli.apply_to_index(i);
            value += self.amplitudes[j].conj() * phase * amp;
        }
        Ok(value.re)
    }

    /// ⟨ψ|O|ψ⟩; the imaginary part vanishes for Hermitian observables and is dropped.
    pub fn expectation_observable(&self, observable: &Observable) -> IrResult<f64> {
        let mut total = Complex64::new(0.0, 0.0);
        for (coeff, pauli) in observable.terms() {
            total += *coeff * self.expectation(pauli)?;
        }
        Ok(total.re)
    }
}
