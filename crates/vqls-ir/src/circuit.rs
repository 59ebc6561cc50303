//! Gate-level circuit representation.
//!
//! Every instruction is a single-qubit gate acting on a target qubit, with
//! an optional list of control qubits (all controlled on |1⟩). Two-qubit
//! gates such as CX are expressed as a controlled X. This keeps inversion and
//! control of whole circuits, which the Hadamard tests rely on, a purely
//! structural operation.

use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};

/// A gate angle, either a constant or a reference into a parameter vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Param {
    /// A bound angle.
    Fixed(f64),
    /// `scale * parameters[index]`.
    Free { index: usize, scale: f64 },
}

impl Param {
    /// Free parameter with unit scale.
    pub fn free(index: usize) -> Self {
        Param::Free { index, scale: 1.0 }
    }

    /// Resolve the angle against a parameter vector.
    pub fn value(&self, params: &[f64]) -> IrResult<f64> {
        match *self {
            Param::Fixed(v) => Ok(v),
            Param::Free { index, scale } => params
                .get(index)
                .map(|v| scale * v)
                .ok_or(IrError::MissingParameters {
                    required: index + 1,
                    provided: params.len(),
                }),
        }
    }

    /// The angle if it is already bound.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Param::Fixed(v) => Some(v),
            Param::Free { .. } => None,
        }
    }

    /// Index into the parameter vector, if free.
    pub fn free_index(&self) -> Option<usize> {
        match *self {
            Param::Fixed(_) => None,
            Param::Free { index, .. } => Some(index),
        }
    }

    /// The negated angle.
    pub fn negated(self) -> Self {
        match self {
            Param::Fixed(v) => Param::Fixed(-v),
            Param::Free { index, scale } => Param::Free {
                index,
                scale: -scale,
            },
        }
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Fixed(value)
    }
}

/// Single-qubit gates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    H,
    X,
    Y,
    Z,
    S,
    Sdg,
    Rx(Param),
    Ry(Param),
    Rz(Param),
    /// diag(1, e^{iθ})
    Phase(Param),
}

impl Gate {
    /// Lowercase gate mnemonic.
    pub fn name(&self) -> &'static str {
        match self {
            Gate::H => "h",
            Gate::X => "x",
            Gate::Y => "y",
            Gate::Z => "z",
            Gate::S => "s",
            Gate::Sdg => "sdg",
            Gate::Rx(_) => "rx",
            Gate::Ry(_) => "ry",
            Gate::Rz(_) => "rz",
            Gate::Phase(_) => "p",
        }
    }

    /// The angle of a rotation gate.
    pub fn param(&self) -> Option<&Param> {
        match self {
            Gate::Rx(p) | Gate::Ry(p) | Gate::Rz(p) | Gate::Phase(p) => Some(p),
            _ => None,
        }
    }

    /// The adjoint gate.
    pub fn inverse(&self) -> Gate {
        match *self {
            Gate::S => Gate::Sdg,
            Gate::Sdg => Gate::S,
            Gate::Rx(p) => Gate::Rx(p.negated()),
            Gate::Ry(p) => Gate::Ry(p.negated()),
            Gate::Rz(p) => Gate::Rz(p.negated()),
            Gate::Phase(p) => Gate::Phase(p.negated()),
            g => g,
        }
    }

    /// Gate with its free angle resolved.
    pub fn bind(&self, params: &[f64]) -> IrResult<Gate> {
        Ok(match *self {
            Gate::Rx(p) => Gate::Rx(Param::Fixed(p.value(params)?)),
            Gate::Ry(p) => Gate::Ry(Param::Fixed(p.value(params)?)),
            Gate::Rz(p) => Gate::Rz(Param::Fixed(p.value(params)?)),
            Gate::Phase(p) => Gate::Phase(Param::Fixed(p.value(params)?)),
            g => g,
        })
    }

    /// The 2×2 unitary in the computational basis, row-major.
    pub fn matrix(&self, params: &[f64]) -> IrResult<[[Complex64; 2]; 2]> {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);

        Ok(match self {
            Gate::H => {
                let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
                [[h, h], [h, -h]]
            }
            Gate::X => [[zero, one], [one, zero]],
            Gate::Y => [[zero, -i], [i, zero]],
            Gate::Z => [[one, zero], [zero, -one]],
            Gate::S => [[one, zero], [zero, i]],
            Gate::Sdg => [[one, zero], [zero, -i]],
            Gate::Rx(p) => {
                let theta = p.value(params)?;
                let c = Complex64::new((theta / 2.0).cos(), 0.0);
                let s = Complex64::new(0.0, -(theta / 2.0).sin());
                [[c, s], [s, c]]
            }
            Gate::Ry(p) => {
                let theta = p.value(params)?;
                let c = Complex64::new((theta / 2.0).cos(), 0.0);
                let s = Complex64::new((theta / 2.0).sin(), 0.0);
                [[c, -s], [s, c]]
            }
            Gate::Rz(p) => {
                let theta = p.value(params)?;
                [
                    [Complex64::from_polar(1.0, -theta / 2.0), zero],
                    [zero, Complex64::from_polar(1.0, theta / 2.0)],
                ]
            }
            Gate::Phase(p) => {
                let theta = p.value(params)?;
                [[one, zero], [zero, Complex64::from_polar(1.0, theta)]]
            }
        })
    }
}

/// A gate applied to `target`, conditioned on every qubit in `controls`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub gate: Gate,
    pub target: usize,
    pub controls: Vec<usize>,
}

impl Instruction {
    /// All qubits touched by the instruction, controls first.
    pub fn qubits(&self) -> impl Iterator<Item = usize> + '_ {
        self.controls
            .iter()
            .copied()
            .chain(std::iter::once(self.target))
    }
}

/// An ordered list of instructions on a fixed number of qubits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    name: String,
    num_qubits: usize,
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create an empty circuit.
    pub fn new(name: impl Into<String>, num_qubits: usize) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            instructions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the circuit.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Append a gate on `target` controlled by `controls`.
    pub fn push(&mut self, gate: Gate, target: usize, controls: &[usize]) -> IrResult<&mut Self> {
        let instruction = Instruction {
            gate,
            target,
            controls: controls.to_vec(),
        };
        self.validate(&instruction)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    fn validate(&self, instruction: &Instruction) -> IrResult<()> {
        let mut seen = Vec::with_capacity(instruction.controls.len() + 1);
        for qubit in instruction.qubits() {
            if qubit >= self.num_qubits {
                return Err(IrError::InvalidQubit {
                    qubit,
                    num_qubits: self.num_qubits,
                });
            }
            if seen.contains(&qubit) {
                return Err(IrError::DuplicateQubit(qubit));
            }
            seen.push(qubit);
        }
        Ok(())
    }

    pub fn h(&mut self, q: usize) -> IrResult<&mut Self> {
        self.push(Gate::H, q, &[])
    }

    pub fn x(&mut self, q: usize) -> IrResult<&mut Self> {
        self.push(Gate::X, q, &[])
    }

    pub fn y(&mut self, q: usize) -> IrResult<&mut Self> {
        self.push(Gate::Y, q, &[])
    }

    pub fn z(&mut self, q: usize) -> IrResult<&mut Self> {
        self.push(Gate::Z, q, &[])
    }

    pub fn s(&mut self, q: usize) -> IrResult<&mut Self> {
        self.push(Gate::S, q, &[])
    }

    pub fn sdg(&mut self, q: usize) -> IrResult<&mut Self> {
        self.push(Gate::Sdg, q, &[])
    }

    pub fn rx(&mut self, theta: impl Into<Param>, q: usize) -> IrResult<&mut Self> {
        self.push(Gate::Rx(theta.into()), q, &[])
    }

    pub fn ry(&mut self, theta: impl Into<Param>, q: usize) -> IrResult<&mut Self> {
        self.push(Gate::Ry(theta.into()), q, &[])
    }

    pub fn rz(&mut self, theta: impl Into<Param>, q: usize) -> IrResult<&mut Self> {
        self.push(Gate::Rz(theta.into()), q, &[])
    }

    pub fn phase(&mut self, theta: impl Into<Param>, q: usize) -> IrResult<&mut Self> {
        self.push(Gate::Phase(theta.into()), q, &[])
    }

    pub fn cx(&mut self, control: usize, target: usize) -> IrResult<&mut Self> {
        self.push(Gate::X, target, &[control])
    }

    pub fn cy(&mut self, control: usize, target: usize) -> IrResult<&mut Self> {
        self.push(Gate::Y, target, &[control])
    }

    pub fn cz(&mut self, control: usize, target: usize) -> IrResult<&mut Self> {
        self.push(Gate::Z, target, &[control])
    }

    /// Append `other`, mapping its qubit `k` onto `qubit_map[k]`.
    pub fn append(&mut self, other: &Circuit, qubit_map: &[usize]) -> IrResult<&mut Self> {
        if qubit_map.len() != other.num_qubits {
            return Err(IrError::QubitMapMismatch {
                expected: other.num_qubits,
                provided: qubit_map.len(),
            });
        }
        for instr in &other.instructions {
            let controls: Vec<usize> = instr.controls.iter().map(|&c| qubit_map[c]).collect();
            self.push(instr.gate, qubit_map[instr.target], &controls)?;
        }
        Ok(self)
    }

    /// Append a circuit of the same width on the identity mapping.
    pub fn compose(&mut self, other: &Circuit) -> IrResult<&mut Self> {
        if other.num_qubits != self.num_qubits {
            return Err(IrError::DimensionMismatch {
                expected: self.num_qubits,
                actual: other.num_qubits,
            });
        }
        let map: Vec<usize> = (0..other.num_qubits).collect();
        self.append(other, &map)
    }

    /// The adjoint circuit.
    pub fn inverse(&self) -> Circuit {
        Circuit {
            name: format!("{}_dg", self.name),
            num_qubits: self.num_qubits,
            instructions: self
                .instructions
                .iter()
                .rev()
                .map(|instr| Instruction {
                    gate: instr.gate.inverse(),
                    target: instr.target,
                    controls: instr.controls.clone(),
                })
                .collect(),
        }
    }

    /// The circuit controlled by a new qubit 0; existing qubits shift up by one.
    pub fn controlled(&self) -> Circuit {
        Circuit {
            name: format!("c_{}", self.name),
            num_qubits: self.num_qubits + 1,
            instructions: self
                .instructions
                .iter()
                .map(|instr| {
                    let mut controls = Vec::with_capacity(instr.controls.len() + 1);
                    controls.push(0);
                    controls.extend(instr.controls.iter().map(|c| c + 1));
                    Instruction {
                        gate: instr.gate,
                        target: instr.target + 1,
                        controls,
                    }
                })
                .collect(),
        }
    }

    /// Size of the parameter vector the circuit reads from.
    pub fn num_parameters(&self) -> usize {
        self.instructions
            .iter()
            .filter_map(|instr| instr.gate.param().and_then(Param::free_index))
            .map(|idx| idx + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn is_parameterized(&self) -> bool {
        self.num_parameters() > 0
    }

    /// Replace every free angle by its value.
    pub fn bind(&self, params: &[f64]) -> IrResult<Circuit> {
        let required = self.num_parameters();
        if params.len() < required {
            return Err(IrError::MissingParameters {
                required,
                provided: params.len(),
            });
        }
        let instructions = self
            .instructions
            .iter()
            .map(|instr| {
                Ok(Instruction {
                    gate: instr.gate.bind(params)?,
                    target: instr.target,
                    controls: instr.controls.clone(),
                })
            })
            .collect::<IrResult<Vec<_>>>()?;
        Ok(Circuit {
            name: self.name.clone(),
            num_qubits: self.num_qubits,
            instructions,
        })
    }

    /// Circuit depth, counting each instruction as one layer on all of its qubits.
    pub fn depth(&self) -> usize {
        let mut layers = vec![0usize; self.num_qubits];
        for instr in &self.instructions {
            let next = instr.qubits().map(|q| layers[q]).max().unwrap_or(0) + 1;
            for q in instr.qubits() {
                layers[q] = next;
            }
        }
        layers.into_iter().max().unwrap_or(0)
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "circuit {} ({} qubits)", self.name, self.num_qubits)?;
        for instr in &self.instructions {
            let prefix = "c".repeat(instr.controls.len());
            write!(f, "  {}{}", prefix, instr.gate.name())?;
            if let Some(p) = instr.gate.param() {
                match p {
                    Param::Fixed(v) => write!(f, "({v:.4})")?,
                    Param::Free { index, scale } => write!(f, "({scale}*θ[{index}])")?,
                }
            }
            let qubits: Vec<String> = instr.qubits().map(|q| format!("q{q}")).collect();
            writeln!(f, " {}", qubits.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_validation() {
        let mut c = Circuit::new("bell", 2);
        c.h(0).unwrap().cx(0, 1).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.depth(), 2);

        assert_eq!(
            c.x(2).unwrap_err(),
            IrError::InvalidQubit {
                qubit: 2,
                num_qubits: 2
            }
        );
        assert_eq!(c.cx(1, 1).unwrap_err(), IrError::DuplicateQubit(1));
    }

    #[test]
    fn test_num_parameters_and_bind() {
        let mut c = Circuit::new("ansatz", 2);
        c.ry(Param::free(0), 0).unwrap();
        c.ry(Param::free(3), 1).unwrap();
        assert_eq!(c.num_parameters(), 4);

        assert!(matches!(
            c.bind(&[0.1, 0.2]),
            Err(IrError::MissingParameters {
                required: 4,
                provided: 2
            })
        ));

        let bound = c.bind(&[0.1, 0.2, 0.3, 0.4]).unwrap();
        assert!(!bound.is_parameterized());
        assert_eq!(bound.instructions()[1].gate, Gate::Ry(Param::Fixed(0.4)));
    }

    #[test]
    fn test_inverse_negates_free_params() {
        let mut c = Circuit::new("c", 1);
        c.s(0).unwrap().rx(Param::free(0), 0).unwrap();
        let inv = c.inverse();
        assert_eq!(
            inv.instructions()[0].gate,
            Gate::Rx(Param::Free {
                index: 0,
                scale: -1.0
            })
        );
        assert_eq!(inv.instructions()[1].gate, Gate::Sdg);
    }

    #[test]
    fn test_controlled_shifts_qubits() {
        let mut c = Circuit::new("u", 2);
        c.x(0).unwrap().cz(0, 1).unwrap();
        let cc = c.controlled();
        assert_eq!(cc.num_qubits(), 3);
        assert_eq!(cc.instructions()[0].target, 1);
        assert_eq!(cc.instructions()[0].controls, vec![0]);
        assert_eq!(cc.instructions()[1].controls, vec![0, 1]);
        assert_eq!(cc.instructions()[1].target, 2);
    }

    #[test]
    fn test_append_with_map() {
        let mut inner = Circuit::new("inner", 2);
        inner.cx(0, 1).unwrap();

        let mut outer = Circuit::new("outer", 4);
        outer.append(&inner, &[3, 1]).unwrap();
        assert_eq!(outer.instructions()[0].controls, vec![3]);
        assert_eq!(outer.instructions()[0].target, 1);

        assert!(matches!(
            outer.append(&inner, &[0]),
            Err(IrError::QubitMapMismatch { .. })
        ));
    }

    #[test]
    fn test_gate_matrices_unitary() {
        let params = [0.7];
        for gate in [
            Gate::H,
            Gate::Y,
            Gate::S,
            Gate::Rx(Param::free(0)),
            Gate::Ry(Param::free(0)),
            Gate::Rz(Param::free(0)),
            Gate::Phase(Param::free(0)),
        ] {
            let m = gate.matrix(&params).unwrap();
            // columns are orthonormal
            let dot = m[0][0].conj() * m[0][1] + m[1][0].conj() * m[1][1];
            let n0 = m[0][0].norm_sqr() + m[1][0].norm_sqr();
            assert!(dot.norm() < 1e-12, "{gate:?}");
            assert!((n0 - 1.0).abs() < 1e-12, "{gate:?}");
        }
    }
}
