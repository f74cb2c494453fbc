// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Symmetric eigendecomposition and PSD projection.
//!
//! The PSD projection inside the conic solver calls this on every
//! iteration for blocks of size ≤ 2d². The decomposition itself is faer's
//! self-adjoint eigensolver; results are copied back into `ndarray`.

use faer::{Mat, Side};
use ndarray::Array2;
use num_complex::Complex64;

use super::ops::lift_hermitian;
use crate::error::{Error, Result};

/// Eigendecomposition A = V · diag(λ) · Vᵀ of a real symmetric matrix.
#[derive(Debug, Clone)]
pub(crate) struct SymmetricEigen {
    /// Eigenvalues, in no particular order.
    pub(crate) eigenvalues: Vec<f64>,
    /// Orthonormal eigenvectors stored as columns.
    pub(crate) eigenvectors: Array2<f64>,
}

impl SymmetricEigen {
    /// Rebuild V · diag(f(λ)) · Vᵀ.
    pub(crate) fn reconstruct_with(&self, f: impl Fn(f64) -> f64) -> Array2<f64> {
        let n = self.eigenvalues.len();
        let mut out = Array2::zeros((n, n));
        for (k, &lambda) in self.eigenvalues.iter().enumerate() {
            let w = f(lambda);
            if w == 0.0 {
                continue;
            }
            for i in 0..n {
                let vi = self.eigenvectors[[i, k]] * w;
                if vi == 0.0 {
                    continue;
                }
                for j in 0..n {
                    out[[i, j]] += vi * self.eigenvectors[[j, k]];
                }
            }
        }
        out
    }
}

/// Compute the eigendecomposition of a real symmetric matrix.
///
/// Only the symmetric part of `a` matters; small asymmetries from floating
/// point noise are averaged away. Callers pass square matrices.
pub(crate) fn symmetric_eigen(a: &Array2<f64>) -> SymmetricEigen {
    let n = a.nrows();
    debug_assert_eq!(n, a.ncols());
    if n == 0 {
        return SymmetricEigen {
            eigenvalues: Vec::new(),
            eigenvectors: Array2::zeros((0, 0)),
        };
    }

    let m = Mat::<f64>::from_fn(n, n, |i, j| 0.5 * (a[[i, j]] + a[[j, i]]));
    let evd = m.selfadjoint_eigendecomposition(Side::Lower);
    let u = evd.u();
    let s = evd.s().column_vector();

    SymmetricEigen {
        eigenvalues: (0..n).map(|k| s.read(k)).collect(),
        eigenvectors: Array2::from_shape_fn((n, n), |(i, k)| u[(i, k)]),
    }
}

/// Euclidean projection of a symmetric matrix onto the PSD cone:
/// negative eigenvalues are set to zero.
pub fn project_psd(a: &Array2<f64>) -> Result<Array2<f64>> {
    if a.nrows() != a.ncols() {
        return Err(Error::NotSquare {
            rows: a.nrows(),
            cols: a.ncols(),
        });
    }
    Ok(symmetric_eigen(a).reconstruct_with(|lambda| lambda.max(0.0)))
}

/// Eigenvalues of a Hermitian matrix, sorted ascending.
///
/// Computed from the real lifting, whose spectrum is the Hermitian spectrum
/// with every eigenvalue doubled.
pub fn hermitian_eigenvalues(h: &Array2<Complex64>) -> Vec<f64> {
    let lifted = lift_hermitian(h);
    let n = lifted.nrows();
    if n == 0 {
        return Vec::new();
    }
    let m = Mat::<f64>::from_fn(n, n, |i, j| 0.5 * (lifted[[i, j]] + lifted[[j, i]]));
    let mut lifted = m.selfadjoint_eigenvalues(Side::Lower);
    lifted.sort_by(|a, b| a.total_cmp(b));
    lifted.into_iter().step_by(2).collect()
}
