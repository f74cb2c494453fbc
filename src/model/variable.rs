// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Matrix decision variables and their real parameterization.
//!
//! A Hermitian n × n variable is stored as n² real parameters, listed row by
//! row over the upper triangle: the real diagonal entry X_ii, followed for
//! every j > i by Re X_ij and Im X_ij. `X = X†` therefore holds for every
//! parameter vector. A complex r × c variable uses 2rc parameters, the real
//! and imaginary part of each entry in row-major order.

use ndarray::Array2;
use num_complex::Complex64;

/// Structure imposed on a matrix variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// Square, X = X†
    Hermitian,
    /// Unconstrained complex entries
    Complex,
}

/// Identity of a variable inside expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VarRef {
    pub(crate) problem: u64,
    pub(crate) index: usize,
    pub(crate) shape: (usize, usize),
    pub(crate) kind: VariableKind,
}

impl VarRef {
    pub(crate) fn num_params(&self) -> usize {
        let (rows, cols) = self.shape;
        match self.kind {
            VariableKind::Hermitian => rows * rows,
            VariableKind::Complex => 2 * rows * cols,
        }
    }

    /// Non-zero entries of the matrix obtained by setting parameter `k` to 1
    /// and all others to 0.
    pub(crate) fn basis_entries(&self, k: usize) -> Vec<((usize, usize), Complex64)> {
        let one = Complex64::new(1.0, 0.0);
        let i_unit = Complex64::new(0.0, 1.0);
        match self.kind {
            VariableKind::Hermitian => {
                let (i, j, part) = hermitian_slot(self.shape.0, k);
                match part {
                    Part::Diagonal => vec![((i, i), one)],
                    Part::Real => vec![((i, j), one), ((j, i), one)],
                    Part::Imag => vec![((i, j), i_unit), ((j, i), -i_unit)],
                }
            }
            VariableKind::Complex => {
                let cols = self.shape.1;
                let entry = k / 2;
                let pos = (entry / cols, entry % cols);
                if k % 2 == 0 {
                    vec![(pos, one)]
                } else {
                    vec![(pos, i_unit)]
                }
            }
        }
    }

    /// Matrix value of a parameter vector.
    pub(crate) fn assemble(&self, params: &[f64]) -> Array2<Complex64> {
        let mut out = Array2::zeros(self.shape);
        for (k, &p) in params.iter().enumerate() {
            if p == 0.0 {
                continue;
            }
            for ((r, c), v) in self.basis_entries(k) {
                out[[r, c]] += v * p;
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Diagonal,
    Real,
    Imag,
}

/// Locate parameter `k` of an n × n Hermitian variable.
fn hermitian_slot(n: usize, mut k: usize) -> (usize, usize, Part) {
    for i in 0..n {
        // Row i holds its diagonal entry plus two parameters per j > i.
        let row_len = 1 + 2 * (n - i - 1);
        if k < row_len {
            if k == 0 {
                return (i, i, Part::Diagonal);
            }
            let j = i + 1 + (k - 1) / 2;
            let part = if (k - 1) % 2 == 0 { Part::Real } else { Part::Imag };
            return (i, j, part);
        }
        k -= row_len;
    }
    // Callers only pass k < n².
    (n, n, Part::Diagonal)
}

/// Handle to a matrix variable of a [`Problem`](super::Problem).
///
/// Handles are cheap to clone and only valid with the problem that created
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub(crate) id: VarRef,
    name: String,
}

impl Variable {
    pub(crate) fn new(id: VarRef, name: String) -> Self {
        Self { id, name }
    }

    /// Name given at declaration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Matrix shape (rows, cols).
    pub fn shape(&self) -> (usize, usize) {
        self.id.shape
    }

    /// Structure of the variable.
    pub fn kind(&self) -> VariableKind {
        self.id.kind
    }

    /// Number of real parameters.
    pub fn num_params(&self) -> usize {
        self.id.num_params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(kind: VariableKind, shape: (usize, usize)) -> VarRef {
        VarRef {
            problem: 0,
            index: 0,
            shape,
            kind,
        }
    }

    #[test]
    fn test_param_counts() {
        assert_eq!(var(VariableKind::Hermitian, (3, 3)).num_params(), 9);
        assert_eq!(var(VariableKind::Complex, (2, 3)).num_params(), 12);
    }

    #[test]
    fn test_hermitian_slots_cover_upper_triangle() {
        let n = 3;
        let slots: Vec<_> = (0..n * n).map(|k| hermitian_slot(n, k)).collect();
        assert_eq!(slots[0], (0, 0, Part::Diagonal));
        assert_eq!(slots[1], (0, 1, Part::Real));
        assert_eq!(slots[2], (0, 1, Part::Imag));
        assert_eq!(slots[3], (0, 2, Part::Real));
        assert_eq!(slots[4], (0, 2, Part::Imag));
        assert_eq!(slots[5], (1, 1, Part::Diagonal));
        assert_eq!(slots[6], (1, 2, Part::Real));
        assert_eq!(slots[7], (1, 2, Part::Imag));
        assert_eq!(slots[8], (2, 2, Part::Diagonal));
    }

    #[test]
    fn test_assemble_hermitian_is_hermitian() {
        let v = var(VariableKind::Hermitian, (2, 2));
        let x = v.assemble(&[1.0, 0.5, -0.25, 3.0]);
        assert_eq!(x[[0, 0]], Complex64::new(1.0, 0.0));
        assert_eq!(x[[0, 1]], Complex64::new(0.5, -0.25));
        assert_eq!(x[[1, 0]], Complex64::new(0.5, 0.25));
        assert_eq!(x[[1, 1]], Complex64::new(3.0, 0.0));
    }

    #[test]
    fn test_assemble_complex() {
        let v = var(VariableKind::Complex, (1, 2));
        let x = v.assemble(&[1.0, 2.0, -3.0, 4.0]);
        assert_eq!(x[[0, 0]], Complex64::new(1.0, 2.0));
        assert_eq!(x[[0, 1]], Complex64::new(-3.0, 4.0));
    }
}
