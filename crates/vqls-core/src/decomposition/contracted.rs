//! Pairwise products of Pauli terms.

use ndarray::Array2;
use num_complex::Complex64;
use rustc_hash::FxHashMap;
use vqls_ir::PauliString;

use super::pauli::PauliDecomposition;
use crate::error::{CoreResult, VqlsError};

/// A Pauli decomposition together with every product `P_i · P_j` (`i < j`)
/// reduced to `phase · P_k` for a list of unique strings `P_k`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractedPauliDecomposition {
    pauli: PauliDecomposition,
    unique_strings: Vec<PauliString>,
    index_mapping: Vec<usize>,
    pair_phases: Vec<Complex64>,
}

impl ContractedPauliDecomposition {
    pub fn new(matrix: &Array2<Complex64>) -> CoreResult<Self> {
        Self::from_pauli(PauliDecomposition::new(matrix)?)
    }

    /// Contract the terms of an existing decomposition.
    pub fn from_pauli(pauli: PauliDecomposition) -> CoreResult<Self> {
        let strings = pauli.strings();
        let mut lookup: FxHashMap<PauliString, usize> = FxHashMap::default();
        let mut unique_strings = Vec::new();
        let mut index_mapping = Vec::new();
        let mut pair_phases = Vec::new();

        for i in 0..strings.len() {
            for j in i + 1..strings.len() {
                let (phase, product) = strings[i].mul(&strings[j])?;
                let index = *lookup.entry(product.clone()).or_insert_with(|| {
                    unique_strings.push(product);
                    unique_strings.len() - 1
                });
                index_mapping.push(index);
                pair_phases.push(phase);
            }
        }

        Ok(Self {
            pauli,
            unique_strings,
            index_mapping,
            pair_phases,
        })
    }

    pub fn pauli(&self) -> &PauliDecomposition {
        &self.pauli
    }

    pub fn num_qubits(&self) -> usize {
        self.pauli.num_qubits()
    }

    /// Strings whose expectation values must be measured.
    pub fn unique_strings(&self) -> &[PauliString] {
        &self.unique_strings
    }

    /// For pair number `p` (row-major over `i < j`), its unique string.
    pub fn index_mapping(&self) -> &[usize] {
        &self.index_mapping
    }

    pub fn pair_phases(&self) -> &[Complex64] {
        &self.pair_phases
    }

    /// `(i, j)` for every pair, in the order of [`index_mapping`](Self::index_mapping).
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.pauli.len();
        (0..n).flat_map(move |i| (i + 1..n).map(move |j| (i, j)))
    }

    /// Map expectation values of the unique strings onto the pair values
    /// `⟨x|P_i P_j|x⟩ = phase_ij ⟨x|P_k|x⟩`.
    pub fn post_process_norm_values(&self, unique_values: &[Complex64]) -> CoreResult<Vec<Complex64>> {
        if unique_values.len() != self.unique_strings.len() {
            return Err(VqlsError::DimensionMismatch(format!(
                "{} values for {} unique strings",
                unique_values.len(),
                self.unique_strings.len()
            )));
        }
        Ok(self
            .index_mapping
            .iter()
            .zip(&self.pair_phases)
            .map(|(&k, phase)| phase * unique_values[k])
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decomposition::pauli_expectation;
    use ndarray::array;

    fn matrix() -> Array2<Complex64> {
        array![
            [1.0, 0.2, -0.3, 0.0],
            [0.2, 2.0, 0.5, 0.1],
            [-0.3, 0.5, 0.7, 0.4],
            [0.0, 0.1, 0.4, 1.3]
        ]
        .mapv(|x| Complex64::new(x, 0.0))
    }

    #[test]
    fn test_pairs_and_mapping_align() {
        let dec = ContractedPauliDecomposition::new(&matrix()).unwrap();
        let n = dec.pauli().len();
        assert_eq!(dec.index_mapping().len(), n * (n - 1) / 2);
        assert_eq!(dec.pairs().count(), dec.index_mapping().len());
        assert!(dec.unique_strings().len() <= dec.index_mapping().len());
    }

    #[test]
    fn test_norm_values_match_direct_products() {
        let dec = ContractedPauliDecomposition::new(&matrix()).unwrap();
        let x: Vec<Complex64> = [0.1, -0.7, 0.5, 0.3]
            .iter()
            .map(|&v| Complex64::new(v, 0.2 * v))
            .collect();

        let unique: Vec<Complex64> = dec
            .unique_strings()
            .iter()
            .map(|p| pauli_expectation(p, &x).unwrap())
            .collect();
        let values = dec.post_process_norm_values(&unique).unwrap();

        let strings = dec.pauli().strings();
        for ((i, j), value) in dec.pairs().zip(values) {
            let pj_x = strings[j].apply(&x).unwrap();
            let pi_pj_x = strings[i].apply(&pj_x).unwrap();
            let direct: Complex64 = x.iter().zip(&pi_pj_x).map(|(a, b)| a.conj() * b).sum();
            assert!((direct - value).norm() < 1e-12, "pair ({i}, {j})");
        }
    }

    #[test]
    fn test_wrong_value_count() {
        let dec = ContractedPauliDecomposition::new(&matrix()).unwrap();
        assert!(dec.post_process_norm_values(&[]).is_err());
    }
}
