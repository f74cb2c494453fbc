// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Constraints over affine and scalar expressions.

use ndarray::Array2;
use num_complex::Complex64;

use super::expr::{AffineExpr, ScalarExpr};
use super::variable::VarRef;
use crate::error::ModelError;

/// Handle returned by [`Problem::add_constraint`](super::Problem::add_constraint).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintId(pub(crate) usize);

impl ConstraintId {
    /// Position of the constraint in its problem.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Relation of a scalar constraint `expr ∘ 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Equal,
    LessEq,
    GreaterEq,
}

#[derive(Debug, Clone)]
pub(crate) enum ConstraintKind {
    /// E ⪰ 0
    Psd(AffineExpr),
    /// E = 0
    Zero(AffineExpr),
    /// s ∘ 0
    Scalar(ScalarExpr, Relation),
}

/// A constraint ready to be added to a problem.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub(crate) kind: ConstraintKind,
    pub(crate) label: Option<String>,
}

impl Constraint {
    fn new(kind: ConstraintKind) -> Self {
        Self { kind, label: None }
    }

    /// Attach a label used in error messages and logs.
    pub fn named(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label, if one was attached.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// True for PSD (Löwner) constraints, whose duals are matrices.
    pub fn is_psd(&self) -> bool {
        matches!(self.kind, ConstraintKind::Psd(_))
    }

    pub(crate) fn variables(&self) -> Box<dyn Iterator<Item = &VarRef> + '_> {
        match &self.kind {
            ConstraintKind::Psd(e) | ConstraintKind::Zero(e) => Box::new(e.variables()),
            ConstraintKind::Scalar(s, _) => Box::new(s.variables()),
        }
    }
}

impl AffineExpr {
    /// `self ⪰ 0`. The expression must be Hermitian.
    pub fn psd(&self) -> Result<Constraint, ModelError> {
        if !self.is_hermitian() {
            return Err(ModelError::NotHermitian);
        }
        Ok(Constraint::new(ConstraintKind::Psd(self.clone())))
    }

    /// Löwner order `self ⪯ other`, i.e. `other − self ⪰ 0`.
    pub fn leq(&self, other: &AffineExpr) -> Result<Constraint, ModelError> {
        other.minus(self)?.psd()
    }

    /// Löwner order `self ⪰ other`, i.e. `self − other ⪰ 0`.
    pub fn geq(&self, other: &AffineExpr) -> Result<Constraint, ModelError> {
        self.minus(other)?.psd()
    }

    /// Entrywise equality `self = other`.
    pub fn equals(&self, other: &AffineExpr) -> Result<Constraint, ModelError> {
        Ok(Constraint::new(ConstraintKind::Zero(self.minus(other)?)))
    }

    /// `self ⪯ C` for a constant matrix `C`.
    pub fn leq_const(&self, c: Array2<Complex64>) -> Result<Constraint, ModelError> {
        self.leq(&AffineExpr::constant(c))
    }

    /// Entrywise equality with a constant matrix.
    pub fn equals_const(&self, c: Array2<Complex64>) -> Result<Constraint, ModelError> {
        self.equals(&AffineExpr::constant(c))
    }
}

impl ScalarExpr {
    /// `self = value`
    pub fn equals(&self, value: f64) -> Constraint {
        self.relation(value, Relation::Equal)
    }

    /// `self ≤ value`
    pub fn leq(&self, value: f64) -> Constraint {
        self.relation(value, Relation::LessEq)
    }

    /// `self ≥ value`
    pub fn geq(&self, value: f64) -> Constraint {
        self.relation(value, Relation::GreaterEq)
    }

    fn relation(&self, value: f64, relation: Relation) -> Constraint {
        let shifted = self.clone().offset(-value);
        Constraint::new(ConstraintKind::Scalar(shifted, relation))
    }
}
