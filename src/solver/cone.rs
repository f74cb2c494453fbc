// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Cones of the real standard form and their projections.
//!
//! PSD blocks are stored in the scaled half-vectorization `svec`, where the
//! upper triangle is listed row by row and off-diagonal entries are
//! multiplied by √2. With this scaling the Euclidean inner product of two
//! `svec` vectors equals the Frobenius inner product of the matrices.

use ndarray::{Array1, Array2, ArrayView1, ArrayViewMut1};

use crate::linalg::eigen::symmetric_eigen;

/// A closed convex cone factor of K = K₁ × … × Kₚ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cone {
    /// Rⁿ (no restriction). Its dual cone is {0}.
    Free(usize),
    /// The non-negative orthant R₊ⁿ. Self-dual.
    Nonnegative(usize),
    /// Real symmetric n × n PSD matrices, stored as `svec`. Self-dual.
    Psd(usize),
}

impl Cone {
    /// Number of scalar coordinates occupied by this cone.
    pub fn dim(&self) -> usize {
        match *self {
            Cone::Free(n) | Cone::Nonnegative(n) => n,
            Cone::Psd(n) => n * (n + 1) / 2,
        }
    }
}

/// Total number of coordinates of a cone product.
pub fn total_dim(cones: &[Cone]) -> usize {
    cones.iter().map(Cone::dim).sum()
}

/// Scaled half-vectorization of a symmetric matrix.
pub fn svec(m: &Array2<f64>) -> Array1<f64> {
    let n = m.nrows();
    let mut out = Vec::with_capacity(n * (n + 1) / 2);
    for i in 0..n {
        out.push(m[[i, i]]);
        for j in (i + 1)..n {
            out.push(std::f64::consts::SQRT_2 * 0.5 * (m[[i, j]] + m[[j, i]]));
        }
    }
    Array1::from(out)
}

/// Inverse of [`svec`].
pub fn smat(v: ArrayView1<'_, f64>, n: usize) -> Array2<f64> {
    let mut out = Array2::zeros((n, n));
    let mut k = 0;
    for i in 0..n {
        out[[i, i]] = v[k];
        k += 1;
        for j in (i + 1)..n {
            let x = v[k] / std::f64::consts::SQRT_2;
            out[[i, j]] = x;
            out[[j, i]] = x;
            k += 1;
        }
    }
    out
}

/// Position of entry (i, j), i ≤ j, inside `svec` of an n × n matrix, and
/// the scale factor applied to it.
pub fn svec_index(n: usize, i: usize, j: usize) -> (usize, f64) {
    let (i, j) = if i <= j { (i, j) } else { (j, i) };
    // Rows 0..i contribute n + (n-1) + … + (n-i+1) entries.
    let start = i * n - i * i.saturating_sub(1) / 2;
    let offset = start + (j - i);
    let scale = if i == j { 1.0 } else { std::f64::consts::SQRT_2 };
    (offset, scale)
}

/// Moreau split of a point v over one cone: returns (Π_{K*}(v), Π_K(−v)),
/// so that v = Π_{K*}(v) − Π_K(−v).
pub fn moreau_split(
    cone: Cone,
    v: ArrayView1<'_, f64>,
    mut dual_part: ArrayViewMut1<'_, f64>,
    mut primal_part: ArrayViewMut1<'_, f64>,
) {
    match cone {
        Cone::Free(_) => {
            dual_part.fill(0.0);
            primal_part.assign(&v.mapv(|x| -x));
        }
        Cone::Nonnegative(_) => {
            for (k, &x) in v.iter().enumerate() {
                dual_part[k] = x.max(0.0);
                primal_part[k] = (-x).max(0.0);
            }
        }
        Cone::Psd(n) => {
            let eig = symmetric_eigen(&smat(v, n));
            dual_part.assign(&svec(&eig.reconstruct_with(|l| l.max(0.0))));
            primal_part.assign(&svec(&eig.reconstruct_with(|l| (-l).max(0.0))));
        }
    }
}
