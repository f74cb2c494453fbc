// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared test utilities: channel Choi matrices, state vectors and mock solvers.

use std::sync::Arc;

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use parking_lot::Mutex;

use crate::error::SolverError;
use crate::linalg::{dagger, kron};
use crate::solver::{AdmmSolver, ConicProgram, ConicSolution, ConicSolver, SolverSettings};

fn c(re: f64) -> Complex64 {
    Complex64::new(re, 0.0)
}

/// Matrix unit |i⟩⟨j| of size d.
fn unit(d: usize, i: usize, j: usize) -> Array2<Complex64> {
    let mut e = Array2::zeros((d, d));
    e[[i, j]] = c(1.0);
    e
}

/// Choi matrix Σᵢⱼ Φ(|i⟩⟨j|) ⊗ |i⟩⟨j| of a linear map on d × d matrices.
pub fn choi_of(d: usize, channel: impl Fn(&Array2<Complex64>) -> Array2<Complex64>) -> Array2<Complex64> {
    let mut choi = Array2::zeros((d * d, d * d));
    for i in 0..d {
        for j in 0..d {
            let e = unit(d, i, j);
            choi = choi + kron(&channel(&e), &e);
        }
    }
    choi
}

/// Choi matrix of a channel given by Kraus operators.
pub fn choi_from_kraus(kraus: &[Array2<Complex64>]) -> Array2<Complex64> {
    let d = kraus[0].ncols();
    choi_of(d, |x| {
        kraus
            .iter()
            .fold(Array2::zeros((d, d)), |acc, k| acc + k.dot(x).dot(&dagger(k)))
    })
}

/// Choi matrix of the identity channel on a d-level system.
pub fn identity_choi(d: usize) -> Array2<Complex64> {
    choi_of(d, |x| x.clone())
}

/// Depolarizing channel ρ ↦ (1 − p)ρ + p Tr(ρ) I/d.
pub fn depolarizing_choi(d: usize, p: f64) -> Array2<Complex64> {
    choi_of(d, |x| {
        let tr = x.diag().sum();
        let mixed = Array2::from_diag_elem(d, tr / d as f64);
        x.mapv(|v| v * (1.0 - p)) + mixed.mapv(|v| v * p)
    })
}

/// Qubit dephasing channel ρ ↦ (1 − p)ρ + p ZρZ.
pub fn dephasing_choi(p: f64) -> Array2<Complex64> {
    let id = Array2::from_diag(&Array1::from(vec![c(1.0), c(1.0)]));
    let z = Array2::from_diag(&Array1::from(vec![c(1.0), c(-1.0)]));
    choi_from_kraus(&[id.mapv(|v| v * (1.0 - p).sqrt()), z.mapv(|v| v * p.sqrt())])
}

/// Real-valued state vector.
pub fn ket(entries: &[f64]) -> Array1<Complex64> {
    entries.iter().map(|&x| c(x)).collect()
}

/// |0⟩
pub fn ket_zero() -> Array1<Complex64> {
    ket(&[1.0, 0.0])
}

/// |+⟩
pub fn ket_plus() -> Array1<Complex64> {
    let h = std::f64::consts::FRAC_1_SQRT_2;
    ket(&[h, h])
}

/// The four two-qubit Bell states Φ⁺, Φ⁻, Ψ⁺, Ψ⁻.
pub fn bell_states() -> Vec<Array1<Complex64>> {
    let h = std::f64::consts::FRAC_1_SQRT_2;
    vec![
        ket(&[h, 0.0, 0.0, h]),
        ket(&[h, 0.0, 0.0, -h]),
        ket(&[0.0, h, h, 0.0]),
        ket(&[0.0, h, -h, 0.0]),
    ]
}

/// Qubit trine states cos(2πk/3)|0⟩ + sin(2πk/3)|1⟩.
pub fn trine_states() -> Vec<Array1<Complex64>> {
    (0..3)
        .map(|k| {
            let theta = 2.0 * std::f64::consts::PI * k as f64 / 3.0;
            ket(&[theta.cos(), theta.sin()])
        })
        .collect()
}

/// Mock solver that always reports infeasibility.
pub struct FailingSolver {
    pub name: String,
}

impl FailingSolver {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn arc(name: &str) -> Arc<dyn ConicSolver> {
        Arc::new(Self::new(name))
    }
}

impl ConicSolver for FailingSolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn solve(
        &self,
        _program: &ConicProgram,
        _settings: &SolverSettings,
    ) -> Result<ConicSolution, SolverError> {
        Err(SolverError::Infeasible(format!("{} refuses every program", self.name)))
    }
}

/// Solver that delegates to [`AdmmSolver`] and records what it was asked.
pub struct RecordingSolver {
    pub name: String,
    inner: AdmmSolver,
    /// (constraints, variables) of every program seen
    pub calls: Mutex<Vec<(usize, usize)>>,
    /// Settings of the most recent call
    pub last_settings: Mutex<Option<SolverSettings>>,
}

impl RecordingSolver {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            inner: AdmmSolver::new(),
            calls: Mutex::new(Vec::new()),
            last_settings: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl ConicSolver for RecordingSolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn solve(
        &self,
        program: &ConicProgram,
        settings: &SolverSettings,
    ) -> Result<ConicSolution, SolverError> {
        self.calls
            .lock()
            .push((program.num_constraints(), program.num_variables()));
        *self.last_settings.lock() = Some(settings.clone());
        self.inner.solve(program, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{is_hermitian, trace};
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_choi_is_maximally_entangled() {
        let j = identity_choi(2);
        // |Ω⟩⟨Ω| with Ω = |00⟩ + |11⟩
        assert_eq!(j[[0, 0]], c(1.0));
        assert_eq!(j[[0, 3]], c(1.0));
        assert_eq!(j[[3, 3]], c(1.0));
        assert_eq!(j[[1, 1]], c(0.0));
        assert_relative_eq!(trace(&j).re, 2.0);
    }

    #[test]
    fn test_channel_chois_are_trace_preserving() {
        // Partial trace over the output factor equals the identity on the input
        for j in [depolarizing_choi(2, 0.3), dephasing_choi(0.2)] {
            assert!(is_hermitian(&j, 1e-12));
            for a in 0..2 {
                for b in 0..2 {
                    let s: Complex64 = (0..2).map(|o| j[[o * 2 + a, o * 2 + b]]).sum();
                    let expected = if a == b { 1.0 } else { 0.0 };
                    assert_relative_eq!(s.re, expected, epsilon = 1e-12);
                    assert_relative_eq!(s.im, 0.0, epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_zero_noise_matches_identity() {
        let id = identity_choi(2);
        assert_eq!(depolarizing_choi(2, 0.0), id);
        let deph = dephasing_choi(0.0);
        for (x, y) in deph.iter().zip(id.iter()) {
            assert_relative_eq!(x.re, y.re, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_bell_states_orthonormal() {
        let states = bell_states();
        for (i, u) in states.iter().enumerate() {
            for (j, v) in states.iter().enumerate() {
                let ip: Complex64 = u.iter().zip(v.iter()).map(|(a, b)| a.conj() * b).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(ip.re, expected, epsilon = 1e-12);
            }
        }
    }
}
