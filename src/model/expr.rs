// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Affine matrix expressions and real scalar expressions.

use ndarray::Array2;
use num_complex::Complex64;

use super::variable::{VarRef, Variable, VariableKind};
use crate::error::ModelError;
use crate::linalg::{identity, is_hermitian};

/// Tolerance for treating a constant matrix as Hermitian.
const HERMITIAN_TOL: f64 = 1e-12;

/// Linear map applied to a variable inside a term.
#[derive(Debug, Clone)]
pub(crate) enum LinearMap {
    /// X
    Identity,
    /// A ⊗ X
    KronLeft(Array2<Complex64>),
    /// X ⊗ A
    KronRight(Array2<Complex64>),
}

impl LinearMap {
    fn output_shape(&self, input: (usize, usize)) -> (usize, usize) {
        match self {
            LinearMap::Identity => input,
            LinearMap::KronLeft(a) | LinearMap::KronRight(a) => {
                (a.nrows() * input.0, a.ncols() * input.1)
            }
        }
    }

    fn preserves_hermitian(&self) -> bool {
        match self {
            LinearMap::Identity => true,
            LinearMap::KronLeft(a) | LinearMap::KronRight(a) => is_hermitian(a, HERMITIAN_TOL),
        }
    }

    /// Image of a single matrix unit `value · E_rc` of an input of shape
    /// `input`, as a list of output entries.
    pub(crate) fn apply_unit(
        &self,
        input: (usize, usize),
        (r, c): (usize, usize),
        value: Complex64,
        out: &mut Vec<((usize, usize), Complex64)>,
    ) {
        match self {
            LinearMap::Identity => out.push(((r, c), value)),
            LinearMap::KronLeft(a) => {
                for ((ai, aj), &av) in a.indexed_iter() {
                    if av != Complex64::new(0.0, 0.0) {
                        out.push(((ai * input.0 + r, aj * input.1 + c), av * value));
                    }
                }
            }
            LinearMap::KronRight(a) => {
                let (ar, ac) = a.dim();
                for ((ai, aj), &av) in a.indexed_iter() {
                    if av != Complex64::new(0.0, 0.0) {
                        out.push(((r * ar + ai, c * ac + aj), value * av));
                    }
                }
            }
        }
    }
}

/// One `coefficient · map(X)` summand.
#[derive(Debug, Clone)]
pub(crate) struct Term {
    pub(crate) var: VarRef,
    pub(crate) coefficient: Complex64,
    pub(crate) map: LinearMap,
    hermitian: bool,
}

impl Term {
    fn new(var: VarRef, coefficient: Complex64, map: LinearMap) -> Self {
        let hermitian = var.kind == VariableKind::Hermitian
            && coefficient.im == 0.0
            && map.preserves_hermitian();
        Self {
            var,
            coefficient,
            map,
            hermitian,
        }
    }

    fn scaled(&self, factor: Complex64) -> Self {
        Self::new(self.var, self.coefficient * factor, self.map.clone())
    }
}

/// Affine matrix expression `C + Σₖ coefficientₖ · mapₖ(Xₖ)`.
///
/// # Example
///
/// ```
/// use qubit_os_metrics::linalg::identity;
/// use qubit_os_metrics::model::{AffineExpr, Problem};
///
/// let mut problem = Problem::new();
/// let rho = problem.hermitian("rho", 2);
/// let w = problem.hermitian("w", 4);
///
/// // I ⊗ ρ − W
/// let gap = AffineExpr::kron_left(&identity(2), &rho)
///     .minus(&AffineExpr::from(&w))
///     .unwrap();
/// assert_eq!(gap.shape(), (4, 4));
/// assert!(gap.is_hermitian());
/// ```
#[derive(Debug, Clone)]
pub struct AffineExpr {
    shape: (usize, usize),
    pub(crate) constant: Array2<Complex64>,
    pub(crate) terms: Vec<Term>,
    constant_hermitian: bool,
}

impl AffineExpr {
    /// A constant matrix.
    pub fn constant(value: Array2<Complex64>) -> Self {
        let constant_hermitian = is_hermitian(&value, HERMITIAN_TOL);
        Self {
            shape: value.dim(),
            constant: value,
            terms: Vec::new(),
            constant_hermitian,
        }
    }

    /// The zero matrix of a given shape.
    pub fn zeros(shape: (usize, usize)) -> Self {
        Self::constant(Array2::zeros(shape))
    }

    fn from_term(term: Term) -> Self {
        let shape = term.map.output_shape(term.var.shape);
        Self {
            shape,
            constant: Array2::zeros(shape),
            terms: vec![term],
            constant_hermitian: shape.0 == shape.1,
        }
    }

    /// `A ⊗ X`
    pub fn kron_left(a: &Array2<Complex64>, x: &Variable) -> Self {
        Self::from_term(Term::new(
            x.id,
            Complex64::new(1.0, 0.0),
            LinearMap::KronLeft(a.clone()),
        ))
    }

    /// `X ⊗ A`
    pub fn kron_right(x: &Variable, a: &Array2<Complex64>) -> Self {
        Self::from_term(Term::new(
            x.id,
            Complex64::new(1.0, 0.0),
            LinearMap::KronRight(a.clone()),
        ))
    }

    /// Matrix shape (rows, cols).
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// True if the expression is Hermitian for every value of its variables.
    pub fn is_hermitian(&self) -> bool {
        self.shape.0 == self.shape.1
            && self.constant_hermitian
            && self.terms.iter().all(|t| t.hermitian)
    }

    /// True if no variable occurs in the expression.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// `self + other`
    pub fn plus(&self, other: &AffineExpr) -> Result<AffineExpr, ModelError> {
        self.combine(other, Complex64::new(1.0, 0.0), "addition")
    }

    /// `self − other`
    pub fn minus(&self, other: &AffineExpr) -> Result<AffineExpr, ModelError> {
        self.combine(other, Complex64::new(-1.0, 0.0), "subtraction")
    }

    fn combine(
        &self,
        other: &AffineExpr,
        sign: Complex64,
        op: &'static str,
    ) -> Result<AffineExpr, ModelError> {
        if self.shape != other.shape {
            return Err(ModelError::ShapeMismatch {
                op,
                left: self.shape,
                right: other.shape,
            });
        }
        let mut terms = self.terms.clone();
        terms.extend(other.terms.iter().map(|t| t.scaled(sign)));
        Ok(AffineExpr {
            shape: self.shape,
            constant: &self.constant + &other.constant.mapv(|z| z * sign),
            terms,
            constant_hermitian: self.constant_hermitian && other.constant_hermitian,
        })
    }

    /// Multiply by a real factor.
    pub fn scale(&self, factor: f64) -> AffineExpr {
        self.scale_complex(Complex64::new(factor, 0.0))
    }

    /// Multiply by a complex factor. The result is Hermitian only if the
    /// factor is real.
    pub fn scale_complex(&self, factor: Complex64) -> AffineExpr {
        let constant = self.constant.mapv(|z| z * factor);
        let constant_hermitian = is_hermitian(&constant, HERMITIAN_TOL);
        AffineExpr {
            shape: self.shape,
            constant,
            terms: self.terms.iter().map(|t| t.scaled(factor)).collect(),
            constant_hermitian,
        }
    }

    /// Variables referenced by the expression.
    pub(crate) fn variables(&self) -> impl Iterator<Item = &VarRef> {
        self.terms.iter().map(|t| &t.var)
    }
}

impl From<&Variable> for AffineExpr {
    fn from(x: &Variable) -> Self {
        Self::from_term(Term::new(x.id, Complex64::new(1.0, 0.0), LinearMap::Identity))
    }
}

impl From<Array2<Complex64>> for AffineExpr {
    fn from(value: Array2<Complex64>) -> Self {
        Self::constant(value)
    }
}

/// Real scalar expression `Σₖ Re Tr(Cₖ† Eₖ) + c`.
#[derive(Debug, Clone, Default)]
pub struct ScalarExpr {
    pub(crate) terms: Vec<(Array2<Complex64>, AffineExpr)>,
    pub(crate) constant: f64,
}

impl ScalarExpr {
    /// A constant.
    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// Trace inner product `Re Tr(C† E)`.
    pub fn inner(c: &Array2<Complex64>, e: &AffineExpr) -> Result<Self, ModelError> {
        if c.dim() != e.shape() {
            return Err(ModelError::ShapeMismatch {
                op: "inner product",
                left: c.dim(),
                right: e.shape(),
            });
        }
        Ok(Self {
            terms: vec![(c.clone(), e.clone())],
            constant: 0.0,
        })
    }

    /// `self + other`
    pub fn plus(mut self, other: ScalarExpr) -> Self {
        self.terms.extend(other.terms);
        self.constant += other.constant;
        self
    }

    /// `self − other`
    pub fn minus(self, other: ScalarExpr) -> Self {
        self.plus(other.scale(-1.0))
    }

    /// Multiply by a real factor.
    pub fn scale(mut self, factor: f64) -> Self {
        for (c, _) in &mut self.terms {
            c.mapv_inplace(|z| z * factor);
        }
        self.constant *= factor;
        self
    }

    /// Add a constant.
    pub fn offset(mut self, value: f64) -> Self {
        self.constant += value;
        self
    }

    pub(crate) fn variables(&self) -> impl Iterator<Item = &VarRef> {
        self.terms.iter().flat_map(|(_, e)| e.variables())
    }
}

/// `Re Tr(E)` of a square expression.
pub fn trace(e: &AffineExpr) -> Result<ScalarExpr, ModelError> {
    let (rows, cols) = e.shape();
    if rows != cols {
        return Err(ModelError::ShapeMismatch {
            op: "trace",
            left: (rows, cols),
            right: (cols, rows),
        });
    }
    ScalarExpr::inner(&identity(rows), e)
}
