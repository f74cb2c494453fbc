// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Sparse constraint matrices.
//!
//! The equality constraints of a lowered SDP touch only a handful of
//! coordinates each, so `A` is kept in faer's compressed-column format and
//! the normal matrix `AAᵀ` is factored with faer's sparse Cholesky.

use std::collections::BTreeMap;

use faer::prelude::SpSolver;
use faer::sparse::linalg::solvers::Cholesky;
use faer::sparse::{SparseColMat, SparseColMatRef};
use faer::{Mat, Side};
use ndarray::{Array1, Array2};

use crate::error::SolverError;

/// Compressed-column real matrix used for `A`.
pub type SparseMatrix = SparseColMat<usize, f64>;

/// Build a matrix from `(row, col, value)` triplets. Duplicates are summed.
pub fn from_triplets(
    nrows: usize,
    ncols: usize,
    triplets: &[(usize, usize, f64)],
) -> Result<SparseMatrix, SolverError> {
    SparseColMat::try_new_from_triplets(nrows, ncols, triplets).map_err(|e| {
        SolverError::Numerical(format!("invalid {nrows}x{ncols} sparse matrix: {e:?}"))
    })
}

/// Build a matrix from the non-zero entries of a dense one.
pub fn from_dense(a: &Array2<f64>) -> Result<SparseMatrix, SolverError> {
    let triplets: Vec<_> = a
        .indexed_iter()
        .filter(|(_, v)| **v != 0.0)
        .map(|((i, j), &v)| (i, j, v))
        .collect();
    from_triplets(a.nrows(), a.ncols(), &triplets)
}

/// Expand to a dense matrix.
pub fn to_dense(a: SparseColMatRef<'_, usize, f64>) -> Array2<f64> {
    let mut out = Array2::zeros((a.nrows(), a.ncols()));
    for j in 0..a.ncols() {
        for (i, &v) in a.row_indices_of_col(j).zip(a.values_of_col(j)) {
            out[[i, j]] += v;
        }
    }
    out
}

/// `A x`
pub fn mul(a: SparseColMatRef<'_, usize, f64>, x: &Array1<f64>) -> Array1<f64> {
    let mut out = Array1::zeros(a.nrows());
    for j in 0..a.ncols() {
        let xj = x[j];
        if xj == 0.0 {
            continue;
        }
        for (i, &v) in a.row_indices_of_col(j).zip(a.values_of_col(j)) {
            out[i] += v * xj;
        }
    }
    out
}

/// `Aᵀ y`
pub fn mul_transpose(a: SparseColMatRef<'_, usize, f64>, y: &Array1<f64>) -> Array1<f64> {
    Array1::from_shape_fn(a.ncols(), |j| {
        a.row_indices_of_col(j)
            .zip(a.values_of_col(j))
            .map(|(i, &v)| v * y[i])
            .sum()
    })
}

/// Squared Euclidean norm of every row.
pub fn row_norms_squared(a: SparseColMatRef<'_, usize, f64>) -> Vec<f64> {
    let mut out = vec![0.0; a.nrows()];
    for j in 0..a.ncols() {
        for (i, &v) in a.row_indices_of_col(j).zip(a.values_of_col(j)) {
            out[i] += v * v;
        }
    }
    out
}

/// The normal matrix `AAᵀ`, accumulated column by column as a sum of outer
/// products.
pub fn gram(a: SparseColMatRef<'_, usize, f64>) -> Result<SparseMatrix, SolverError> {
    let mut entries: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for j in 0..a.ncols() {
        let rows: Vec<usize> = a.row_indices_of_col(j).collect();
        let vals = a.values_of_col(j);
        for (p, &r) in rows.iter().enumerate() {
            for (q, &t) in rows.iter().enumerate() {
                *entries.entry((r, t)).or_insert(0.0) += vals[p] * vals[q];
            }
        }
    }
    let triplets: Vec<_> = entries.into_iter().map(|((i, j), v)| (i, j, v)).collect();
    from_triplets(a.nrows(), a.nrows(), &triplets)
}

/// Sparse LLᵀ factorization of a symmetric positive definite matrix.
pub struct SparseCholesky {
    dim: usize,
    llt: Option<Cholesky<usize, f64>>,
}

impl SparseCholesky {
    /// Factor `m`. Fails when a pivot is not positive.
    pub fn factor(m: SparseColMatRef<'_, usize, f64>) -> Result<Self, SolverError> {
        let dim = m.nrows();
        if dim == 0 {
            return Ok(Self { dim, llt: None });
        }
        let llt = m
            .sp_cholesky(Side::Lower)
            .map_err(|e| SolverError::RankDeficient(format!("Cholesky failed: {e:?}")))?;
        Ok(Self {
            dim,
            llt: Some(llt),
        })
    }

    /// Solve `L Lᵀ z = rhs`.
    pub fn solve(&self, rhs: &Array1<f64>) -> Array1<f64> {
        let Some(llt) = &self.llt else {
            return Array1::zeros(self.dim);
        };
        let mut z = Mat::<f64>::from_fn(self.dim, 1, |i, _| rhs[i]);
        llt.solve_in_place(z.as_mut());
        Array1::from_shape_fn(self.dim, |i| z[(i, 0)])
    }
}
