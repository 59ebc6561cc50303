//! Amplitude-encoding state preparation.

use num_complex::Complex64;

use crate::circuit::{Circuit, Gate, Param};
use crate::error::{IrError, IrResult};

const EPS: f64 = 1e-12;

/// Build `U` with `U|0⟩ = b / ‖b‖`.
///
/// Magnitudes are loaded top-down: for qubit `q` (highest first) and every
/// assignment of the qubits above it, an RY splits the remaining weight
/// between the `q = 0` and `q = 1` halves. Phases are then written one basis
/// state at a time with multi-controlled phase gates, and only for
/// amplitudes that are not real and positive.
pub fn state_preparation(amplitudes: &[Complex64]) -> IrResult<Circuit> {
    let len = amplitudes.len();
    if len < 2 || !len.is_power_of_two() {
        return Err(IrError::NotPowerOfTwo(len));
    }
    let norm = amplitudes.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
    if norm < EPS {
        return Err(IrError::ZeroVector);
    }

    let n = len.trailing_zeros() as usize;
    let weights: Vec<f64> = amplitudes.iter().map(|a| a.norm_sqr() / (norm * norm)).collect();
    let mut circuit = Circuit::new("state_prep", n);

    for q in (0..n).rev() {
        let controls: Vec<usize> = (q + 1..n).collect();
        let block = 1usize << q;
        for prefix in 0..(1usize << (n - 1 - q)) {
            let base = prefix << (q + 1);
            let w0: f64 = weights[base..base + block].iter().sum();
            let w1: f64 = weights[base + block..base + 2 * block].iter().sum();
            if w0 + w1 < EPS {
                continue;
            }
            let theta = 2.0 * w1.sqrt().atan2(w0.sqrt());
            if theta.abs() < EPS {
                continue;
            }
            apply_on_pattern(
                &mut circuit,
                Gate::Ry(Param::Fixed(theta)),
                q,
                &controls,
                prefix,
            )?;
        }
    }

    let all_qubits_but_first: Vec<usize> = (1..n).collect();
    for (k, amp) in amplitudes.iter().enumerate() {
        if amp.norm() < EPS {
            continue;
        }
        let phi = amp.arg();
        if phi.abs() < EPS {
            continue;
        }
        // Flip every zero bit of k so that |k⟩ maps to |1…1⟩, then phase it.
        let zeros: Vec<usize> = (0..n).filter(|&b| (k >> b) & 1 == 0).collect();
        for &b in &zeros {
            circuit.x(b)?;
        }
        circuit.push(Gate::Phase(Param::Fixed(phi)), 0, &all_qubits_but_first)?;
        for &b in &zeros {
            circuit.x(b)?;
        }
    }

    Ok(circuit)
}

/// Apply `gate` on `target` when the `controls` qubits read `pattern`
/// (bit `i` of `pattern` is the expected value of `controls[i]`).
fn apply_on_pattern(
    circuit: &mut Circuit,
    gate: Gate,
    target: usize,
    controls: &[usize],
    pattern: usize,
) -> IrResult<()> {
    let flipped: Vec<usize> = controls
        .iter()
        .enumerate()
        .filter(|(i, _)| (pattern >> i) & 1 == 0)
        .map(|(_, &c)| c)
        .collect();
    for &c in &flipped {
        circuit.x(c)?;
    }
    circuit.push(gate, target, controls)?;
    for &c in &flipped {
        circuit.x(c)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statevector::Statevector;

    fn assert_prepares(target: &[Complex64]) {
        let circuit = state_preparation(target).unwrap();
        let sv = Statevector::from_circuit(&circuit, &[]).unwrap();
        let norm = target.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
        for (got, want) in sv.amplitudes().iter().zip(target) {
            assert!(
                (*got - *want / norm).norm() < 1e-10,
                "got {got}, want {}",
                *want / norm
            );
        }
    }

    #[test]
    fn test_real_positive_vector() {
        let b: Vec<Complex64> = [1.0, 2.0, 3.0, 4.0]
            .iter()
            .map(|&x| Complex64::new(x, 0.0))
            .collect();
        assert_prepares(&b);
    }

    #[test]
    fn test_signed_vector_three_qubits() {
        let b: Vec<Complex64> = [0.5, -1.0, 0.0, 2.0, -0.3, 0.7, 1.1, -0.2]
            .iter()
            .map(|&x| Complex64::new(x, 0.0))
            .collect();
        assert_prepares(&b);
    }

    #[test]
    fn test_complex_vector() {
        let b = vec![
            Complex64::new(0.3, 0.4),
            Complex64::new(-0.1, 0.0),
            Complex64::new(0.0, -0.8),
            Complex64::new(0.2, 0.2),
        ];
        assert_prepares(&b);
    }

    #[test]
    fn test_basis_state() {
        let mut b = vec![Complex64::new(0.0, 0.0); 4];
        b[2] = Complex64::new(1.0, 0.0);
        assert_prepares(&b);
    }

    #[test]
    fn test_rejects_bad_input() {
        let zero = vec![Complex64::new(0.0, 0.0); 4];
        assert_eq!(state_preparation(&zero).unwrap_err(), IrError::ZeroVector);
        let three = vec![Complex64::new(1.0, 0.0); 3];
        assert_eq!(
            state_preparation(&three).unwrap_err(),
            IrError::NotPowerOfTwo(3)
        );
    }
}
