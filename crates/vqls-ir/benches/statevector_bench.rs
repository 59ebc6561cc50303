//! Benchmarks for statevector simulation.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use vqls_ir::library::{Entanglement, real_amplitudes};
use vqls_ir::{PauliString, Statevector};

fn benchmark_real_amplitudes(c: &mut Criterion) {
    for n in [3usize, 6] {
        let ansatz = real_amplitudes(n, 3, Entanglement::Full);
        let params: Vec<f64> = (0..ansatz.num_parameters()).map(|k| 0.1 * k as f64).collect();

        c.bench_function(&format!("real_amplitudes_{n}q"), |b| {
            b.iter(|| Statevector::from_circuit(black_box(&ansatz), black_box(&params)))
        });
    }
}

fn benchmark_controlled_ansatz(c: &mut Criterion) {
    let ansatz = real_amplitudes(4, 2, Entanglement::Linear).controlled();
    let params: Vec<f64> = (0..ansatz.num_parameters()).map(|k| 0.2 * k as f64).collect();

    c.bench_function("controlled_real_amplitudes_5q", |b| {
        b.iter(|| Statevector::from_circuit(black_box(&ansatz), black_box(&params)))
    });
}

fn benchmark_pauli_expectation(c: &mut Criterion) {
    let ansatz = real_amplitudes(6, 2, Entanglement::Linear);
    let params: Vec<f64> = (0..ansatz.num_parameters()).map(|k| 0.3 * k as f64).collect();
    let state = Statevector::from_circuit(&ansatz, &params).unwrap();
    let pauli: PauliString = "XZIYZX".parse().unwrap();

    c.bench_function("pauli_expectation_6q", |b| {
        b.iter(|| state.expectation(black_box(&pauli)))
    });
}

criterion_group!(
    benches,
    benchmark_real_amplitudes,
    benchmark_controlled_ansatz,
    benchmark_pauli_expectation
);
criterion_main!(benches);
