//! Pauli operators, Pauli strings and weighted Pauli observables.

use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::circuit::{Circuit, Gate};
use crate::error::{IrError, IrResult};

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pauli {
    I,
    X,
    Y,
    Z,
}

impl Pauli {
    /// The four operators in canonical order.
    pub const ALL: [Pauli; 4] = [Pauli::I, Pauli::X, Pauli::Y, Pauli::Z];

    pub fn as_char(self) -> char {
        match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'I' => Some(Pauli::I),
            'X' => Some(Pauli::X),
            'Y' => Some(Pauli::Y),
            'Z' => Some(Pauli::Z),
            _ => None,
        }
    }

    pub fn is_identity(self) -> bool {
        self == Pauli::I
    }

    /// Product `self · rhs = phase · result`.
    pub fn mul(self, rhs: Pauli) -> (Complex64, Pauli) {
        let one = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        match (self, rhs) {
            (Pauli::I, p) | (p, Pauli::I) => (one, p),
            (a, b) if a == b => (one, Pauli::I),
            (Pauli::X, Pauli::Y) => (i, Pauli::Z),
            (Pauli::Y, Pauli::X) => (-i, Pauli::Z),
            (Pauli::Y, Pauli::Z) => (i, Pauli::X),
            (Pauli::Z, Pauli::Y) => (-i, Pauli::X),
            (Pauli::Z, Pauli::X) => (i, Pauli::Y),
            (Pauli::X, Pauli::Z) => (-i, Pauli::Y),
            _ => unreachable!("all Pauli pairs are covered"),
        }
    }

    fn gate(self) -> Option<Gate> {
        match self {
            Pauli::I => None,
            Pauli::X => Some(Gate::X),
            Pauli::Y => Some(Gate::Y),
            Pauli::Z => Some(Gate::Z),
        }
    }
}

/// Tensor product of Paulis, one per qubit (index = qubit).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PauliString {
    paulis: Vec<Pauli>,
}

impl PauliString {
    /// Build from operators ordered by qubit index.
    pub fn new(paulis: Vec<Pauli>) -> Self {
        Self { paulis }
    }

    pub fn identity(num_qubits: usize) -> Self {
        Self {
            paulis: vec![Pauli::I; num_qubits],
        }
    }

    /// A single Pauli on `qubit`, identity elsewhere.
    pub fn single(pauli: Pauli, qubit: usize, num_qubits: usize) -> Self {
        let mut paulis = vec![Pauli::I; num_qubits];
        paulis[qubit] = pauli;
        Self { paulis }
    }

    pub fn num_qubits(&self) -> usize {
        self.paulis.len()
    }

    /// Operator on `qubit`.
    pub fn get(&self, qubit: usize) -> Pauli {
        self.paulis[qubit]
    }

    pub fn paulis(&self) -> &[Pauli] {
        &self.paulis
    }

    /// Number of non-identity factors.
    pub fn weight(&self) -> usize {
        self.paulis.iter().filter(|p| !p.is_identity()).count()
    }

    pub fn is_identity(&self) -> bool {
        self.weight() == 0
    }

    /// Every string on `num_qubits` qubits; qubit `q` cycles with period `4^q`.
    pub fn all(num_qubits: usize) -> Vec<PauliString> {
        let total = 1usize << (2 * num_qubits);
        (0..total)
            .map(|k| {
                let paulis = (0..num_qubits)
                    .map(|q| Pauli::ALL[(k >> (2 * q)) & 3])
                    .collect();
                PauliString { paulis }
            })
            .collect()
    }

    fn check_width(&self, other: &PauliString) -> IrResult<()> {
        if self.num_qubits() != other.num_qubits() {
            return Err(IrError::DimensionMismatch {
                expected: self.num_qubits(),
                actual: other.num_qubits(),
            });
        }
        Ok(())
    }

    /// Product `self · other = phase · result`.
    pub fn mul(&self, other: &PauliString) -> IrResult<(Complex64, PauliString)> {
        self.check_width(other)?;
        let mut phase = Complex64::new(1.0, 0.0);
        let paulis = self
            .paulis
            .iter()
            .zip(&other.paulis)
            .map(|(&a, &b)| {
                let (ph, p) = a.mul(b);
                phase *= ph;
                p
            })
            .collect();
        Ok((phase, PauliString { paulis }))
    }

    /// Qubit-wise commutation: on every qubit the factors are equal or one is I.
    pub fn qubit_wise_commutes(&self, other: &PauliString) -> bool {
        self.num_qubits() == other.num_qubits()
            && self
                .paulis
                .iter()
                .zip(&other.paulis)
                .all(|(&a, &b)| a == b || a.is_identity() || b.is_identity())
    }

    /// Action on a basis state: `P|index⟩ = phase |new_index⟩`.
    pub fn apply_to_index(&self, index: usize) -> (usize, Complex64) {
        let mut new_index = index;
        let mut phase = Complex64::new(1.0, 0.0);

        for (qubit, &pauli) in self.paulis.iter().enumerate() {
            let bit = (index >> qubit) & 1;
            match pauli {
                Pauli::I => {}
                Pauli::X => {
                    new_index ^= 1 << qubit;
                }
                Pauli::Y => {
                    new_index ^= 1 << qubit;
                    if bit == 0 {
                        phase *= Complex64::new(0.0, 1.0);
                    } else {
                        phase *= Complex64::new(0.0, -1.0);
                    }
                }
                Pauli::Z => {
                    if bit == 1 {
                        phase = -phase;
                    }
                }
            }
        }

        (new_index, phase)
    }

    /// `P · v` for a dense vector.
    pub fn apply(&self, vector: &[Complex64]) -> IrResult<Vec<Complex64>> {
        let dim = 1usize << self.num_qubits();
        if vector.len() != dim {
            return Err(IrError::DimensionMismatch {
                expected: dim,
                actual: vector.len(),
            });
        }
        let mut out = vec![Complex64::new(0.0, 0.0); dim];
        for (i, &amp) in vector.iter().enumerate() {
            let (j, phase) = self.apply_to_index(i);
            out[j] += phase * amp;
        }
        Ok(out)
    }

    /// Entry `(row, col)` of the dense matrix.
    pub fn matrix_element(&self, row: usize, col: usize) -> Complex64 {
        let (j, phase) = self.apply_to_index(col);
        if j == row {
            phase
        } else {
            Complex64::new(0.0, 0.0)
        }
    }

    /// Eigenvalue carried by computational basis state `index` once the string is
    /// rotated into its Z basis: the parity of the bits on non-identity qubits.
    pub fn eigenvalue(&self, index: usize) -> f64 {
        let odd = self
            .paulis
            .iter()
            .enumerate()
            .filter(|(q, p)| !p.is_identity() && (index >> q) & 1 == 1)
            .count()
            % 2
            == 1;
        if odd { -1.0 } else { 1.0 }
    }

    /// Circuit applying the string.
    pub fn to_circuit(&self) -> Circuit {
        let mut circuit = Circuit::new(self.to_string(), self.num_qubits());
        for (q, pauli) in self.paulis.iter().enumerate() {
            if let Some(gate) = pauli.gate() {
                circuit
                    .push(gate, q, &[])
                    .expect("qubit index is within the string width");
            }
        }
        circuit
    }
}

impl FromStr for PauliString {
    type Err = IrError;

    /// Parses labels written highest qubit first, e.g. `"XZ"` is Z on qubit 0.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(IrError::InvalidPauli(s.to_string()));
        }
        let paulis = s
            .chars()
            .rev()
            .map(|c| Pauli::from_char(c).ok_or_else(|| IrError::InvalidPauli(s.to_string())))
            .collect::<IrResult<Vec<_>>>()?;
        Ok(Self { paulis })
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for p in self.paulis.iter().rev() {
            write!(f, "{}", p.as_char())?;
        }
        Ok(())
    }
}

/// Weighted sum of Pauli strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observable {
    num_qubits: usize,
    terms: Vec<(Complex64, PauliString)>,
}

impl Observable {
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            terms: Vec::new(),
        }
    }

    /// Add `coeff · string`.
    pub fn with_term(mut self, coeff: Complex64, string: PauliString) -> IrResult<Self> {
        if string.num_qubits() != self.num_qubits {
            return Err(IrError::DimensionMismatch {
                expected: self.num_qubits,
                actual: string.num_qubits(),
            });
        }
        self.terms.push((coeff, string));
        Ok(self)
    }

    /// `Z` on one qubit.
    pub fn z_on(qubit: usize, num_qubits: usize) -> Self {
        Self {
            num_qubits,
            terms: vec![(
                Complex64::new(1.0, 0.0),
                PauliString::single(Pauli::Z, qubit, num_qubits),
            )],
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn terms(&self) -> &[(Complex64, PauliString)] {
        &self.terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_and_display() {
        let p: PauliString = "XIZ".parse().unwrap();
        assert_eq!(p.get(0), Pauli::Z);
        assert_eq!(p.get(1), Pauli::I);
        assert_eq!(p.get(2), Pauli::X);
        assert_eq!(p.to_string(), "XIZ");
        assert_eq!(p.weight(), 2);
        assert!("XQ".parse::<PauliString>().is_err());
        assert!("".parse::<PauliString>().is_err());
    }

    #[test]
    fn test_single_qubit_products() {
        let i = Complex64::new(0.0, 1.0);
        assert_eq!(Pauli::X.mul(Pauli::Y), (i, Pauli::Z));
        assert_eq!(Pauli::Y.mul(Pauli::X), (-i, Pauli::Z));
        assert_eq!(Pauli::Z.mul(Pauli::X), (i, Pauli::Y));
        assert_eq!(Pauli::Y.mul(Pauli::Y).1, Pauli::I);
    }

    #[test]
    fn test_string_product() {
        let a: PauliString = "XY".parse().unwrap();
        let b: PauliString = "YY".parse().unwrap();
        let (phase, p) = a.mul(&b).unwrap();
        // X·Y = iZ on qubit 1, Y·Y = I on qubit 0
        assert_eq!(p.to_string(), "ZI");
        assert!((phase - Complex64::new(0.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_qubit_wise_commutation() {
        let a: PauliString = "XI".parse().unwrap();
        let b: PauliString = "XZ".parse().unwrap();
        let c: PauliString = "ZZ".parse().unwrap();
        assert!(a.qubit_wise_commutes(&b));
        assert!(!a.qubit_wise_commutes(&c));
        assert!(b.qubit_wise_commutes(&b));
    }

    #[test]
    fn test_all_strings() {
        let all = PauliString::all(2);
        assert_eq!(all.len(), 16);
        assert!(all[0].is_identity());
        assert_eq!(all[1].to_string(), "IX");
        assert_eq!(all[4].to_string(), "XI");
    }

    #[test]
    fn test_eigenvalue_parity() {
        let p: PauliString = "ZIX".parse().unwrap();
        assert_eq!(p.eigenvalue(0b000), 1.0);
        assert_eq!(p.eigenvalue(0b001), -1.0);
        assert_eq!(p.eigenvalue(0b010), 1.0);
        assert_eq!(p.eigenvalue(0b101), 1.0);
    }

    #[test]
    fn test_matrix_elements_of_y() {
        let y: PauliString = "Y".parse().unwrap();
        assert_eq!(y.matrix_element(0, 1), Complex64::new(0.0, -1.0));
        assert_eq!(y.matrix_element(1, 0), Complex64::new(0.0, 1.0));
        assert_eq!(y.matrix_element(0, 0), Complex64::new(0.0, 0.0));
    }

    fn pauli_string(n: usize) -> impl Strategy<Value = PauliString> {
        proptest::collection::vec(0usize..4, n)
            .prop_map(|v| PauliString::new(v.into_iter().map(|k| Pauli::ALL[k]).collect()))
    }

    proptest! {
        #[test]
        fn prop_product_matches_sequential_action(
            a in pauli_string(3),
            b in pauli_string(3),
            index in 0usize..8,
        ) {
            let (phase, p) = a.mul(&b).unwrap();
            let (j1, ph1) = b.apply_to_index(index);
            let (j2, ph2) = a.apply_to_index(j1);
            let (k, phk) = p.apply_to_index(index);
            prop_assert_eq!(j2, k);
            prop_assert!((ph1 * ph2 - phase * phk).norm() < 1e-12);
        }

        #[test]
        fn prop_string_squares_to_identity(a in pauli_string(4)) {
            let (phase, p) = a.mul(&a).unwrap();
            prop_assert!(p.is_identity());
            prop_assert!((phase - Complex64::new(1.0, 0.0)).norm() < 1e-12);
        }

        #[test]
        fn prop_label_roundtrip(a in pauli_string(5)) {
            let parsed: PauliString = a.to_string().parse().unwrap();
            prop_assert_eq!(parsed, a);
        }
    }
}
