//! Benchmarks for matrix decompositions and cost evaluation.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ndarray::Array2;
use num_complex::Complex64;
use vqls_core::decomposition::pauli_overlaps;
use vqls_core::{ContractedPauliDecomposition, OptimizedPauliDecomposition, PauliDecomposition};
use vqls_ir::Statevector;
use vqls_ir::library::{Entanglement, real_amplitudes};

/// Banded symmetric test matrix.
fn banded(num_qubits: usize) -> Array2<Complex64> {
    let dim = 1 << num_qubits;
    Array2::from_shape_fn((dim, dim), |(i, j)| {
        let value = match i.abs_diff(j) {
            0 => 2.0 + 0.1 * i as f64,
            1 => -0.5,
            2 => 0.1,
            _ => 0.0,
        };
        Complex64::new(value, 0.0)
    })
}

fn benchmark_decompositions(c: &mut Criterion) {
    for n in [2usize, 4] {
        let matrix = banded(n);
        c.bench_function(&format!("pauli_decomposition_{n}q"), |b| {
            b.iter(|| PauliDecomposition::new(black_box(&matrix)))
        });
        c.bench_function(&format!("contracted_decomposition_{n}q"), |b| {
            b.iter(|| ContractedPauliDecomposition::new(black_box(&matrix)))
        });
        c.bench_function(&format!("optimized_decomposition_{n}q"), |b| {
            b.iter(|| OptimizedPauliDecomposition::new(black_box(&matrix)))
        });
    }
}

fn benchmark_overlaps(c: &mut Criterion) {
    let n = 4;
    let decomposition = PauliDecomposition::new(&banded(n)).unwrap();
    let ansatz = real_amplitudes(n, 2, Entanglement::Linear);
    let params: Vec<f64> = (0..ansatz.num_parameters()).map(|k| 0.2 * k as f64).collect();
    let state = Statevector::from_circuit(&ansatz, &params).unwrap().into_amplitudes();
    let rhs = vec![Complex64::new(0.25, 0.0); 1 << n];

    c.bench_function("pauli_overlaps_4q", |b| {
        b.iter(|| pauli_overlaps(black_box(decomposition.strings()), black_box(&state), black_box(&rhs)))
    });
}

criterion_group!(benches, benchmark_decompositions, benchmark_overlaps);
criterion_main!(benches);
