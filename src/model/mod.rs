// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Modeling layer for semidefinite programs over complex matrices.
//!
//! Problems are written directly in terms of Hermitian and complex matrix
//! variables. On [`Problem::solve`] the model is lowered to a real conic
//! program (see the `canon` submodule), handed to a [`ConicSolver`](crate::solver::ConicSolver),
//! and the solver's answer is mapped back to complex matrices and duals.
//!
//! - [`variable`]: variable handles and their real parameterization
//! - [`expr`]: affine matrix expressions and real scalar expressions
//! - [`constraint`]: PSD, Löwner, equality and scalar constraints
//! - [`problem`]: problem assembly, solve and solution access

pub(crate) mod canon;
pub mod constraint;
pub mod expr;
pub mod problem;
pub mod variable;

pub use constraint::{Constraint, ConstraintId, Relation};
pub use expr::{trace, AffineExpr, ScalarExpr};
pub use problem::{Dual, Problem, Sense, SolveStats, Solution};
pub use variable::{Variable, VariableKind};
