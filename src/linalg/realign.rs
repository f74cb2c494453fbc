// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Index reshuffles of bipartite operators.
//!
//! An operator X on H_A ⊗ H_B is addressed as X[(i, j), (k, l)] where
//! (i, j) is the row index split into subsystem A and B parts and (k, l)
//! the column index split the same way (row-major, A is the slow index).
//!
//! Ref: Lupo, Aniello & Scardicchio (2008), "Bipartite quantum systems: on
//! the realignment criterion and beyond", J. Phys. A 41, 415301.

use ndarray::Array2;
use num_complex::Complex64;

use super::ops::perfect_sqrt;
use crate::error::{Error, Result};

/// Subsystem dimensions of a bipartite operator.
///
/// `rows = (a₁, b₁)` splits the row space, `cols = (a₂, b₂)` the column
/// space. For square operators on H_A ⊗ H_B both pairs are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BipartiteDims {
    pub rows: (usize, usize),
    pub cols: (usize, usize),
}

impl BipartiteDims {
    /// Equal row and column partition d_A × d_B.
    pub fn square(dim_a: usize, dim_b: usize) -> Self {
        Self {
            rows: (dim_a, dim_b),
            cols: (dim_a, dim_b),
        }
    }

    /// Default partition: both subsystems of equal dimension, separately for
    /// rows and columns (requires perfect-square row and column counts).
    pub fn infer(shape: (usize, usize)) -> Result<Self> {
        let (rows, cols) = shape;
        let r = perfect_sqrt(rows).ok_or_else(|| {
            Error::InvalidDimension(format!("row count {rows} is not a perfect square"))
        })?;
        let c = perfect_sqrt(cols).ok_or_else(|| {
            Error::InvalidDimension(format!("column count {cols} is not a perfect square"))
        })?;
        Ok(Self {
            rows: (r, r),
            cols: (c, c),
        })
    }

    /// Square operator whose first subsystem has dimension `dim_a`; the
    /// second subsystem takes the remaining factor.
    pub fn from_first(dim_a: usize, side: usize) -> Result<Self> {
        if dim_a == 0 || side % dim_a != 0 {
            return Err(Error::InvalidDimension(format!(
                "subsystem dimension {dim_a} does not divide {side}"
            )));
        }
        Ok(Self::square(dim_a, side / dim_a))
    }

    fn check(&self, shape: (usize, usize)) -> Result<()> {
        let expected = (self.rows.0 * self.rows.1, self.cols.0 * self.cols.1);
        if expected != shape {
            return Err(Error::mismatch(
                "bipartite dimensions",
                format!("{expected:?}"),
                format!("{shape:?}"),
            ));
        }
        Ok(())
    }
}

/// Realignment R(X): |ij⟩⟨kl| ↦ |ik⟩⟨jl|, extended linearly.
///
/// Each block X_{(i,·),(k,·)} becomes row (i, k) of the result, so the
/// output has shape (a₁·a₂) × (b₁·b₂). With `dims = None` both subsystems
/// are taken to have equal dimension.
///
/// # Example
///
/// ```text
/// [[ 1,  2,  3,  4],        [[ 1,  2,  5,  6],
///  [ 5,  6,  7,  8],   ↦     [ 3,  4,  7,  8],
///  [ 9, 10, 11, 12],         [ 9, 10, 13, 14],
///  [13, 14, 15, 16]]         [11, 12, 15, 16]]
/// ```
pub fn realignment(x: &Array2<Complex64>, dims: Option<BipartiteDims>) -> Result<Array2<Complex64>> {
    let dims = match dims {
        Some(d) => d,
        None => BipartiteDims::infer(x.dim())?,
    };
    dims.check(x.dim())?;

    let (a1, b1) = dims.rows;
    let (a2, b2) = dims.cols;
    let mut out = Array2::zeros((a1 * a2, b1 * b2));
    for i in 0..a1 {
        for j in 0..b1 {
            for k in 0..a2 {
                for l in 0..b2 {
                    out[[i * a2 + k, j * b2 + l]] = x[[i * b1 + j, k * b2 + l]];
                }
            }
        }
    }
    Ok(out)
}

/// Partial transpose of a square bipartite operator on subsystem `sys`
/// (0 for A, 1 for B).
pub fn partial_transpose(
    x: &Array2<Complex64>,
    sys: usize,
    dims: Option<BipartiteDims>,
) -> Result<Array2<Complex64>> {
    let (rows, cols) = x.dim();
    if rows != cols {
        return Err(Error::NotSquare { rows, cols });
    }
    let dims = match dims {
        Some(d) => d,
        None => BipartiteDims::infer(x.dim())?,
    };
    dims.check(x.dim())?;
    if dims.rows != dims.cols {
        return Err(Error::InvalidDimension(
            "partial transpose needs equal row and column partitions".into(),
        ));
    }
    if sys > 1 {
        return Err(Error::InvalidInput(format!(
            "subsystem index {sys} out of range for a bipartite operator"
        )));
    }

    let (da, db) = dims.rows;
    let mut out = Array2::zeros((rows, cols));
    for i in 0..da {
        for j in 0..db {
            for k in 0..da {
                for l in 0..db {
                    let value = x[[i * db + j, k * db + l]];
                    if sys == 0 {
                        out[[k * db + j, i * db + l]] = value;
                    } else {
                        out[[i * db + l, k * db + j]] = value;
                    }
                }
            }
        }
    }
    Ok(out)
}
