// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Conic solvers.
//!
//! This module provides the [`ConicSolver`] trait, the real standard form
//! [`ConicProgram`] it consumes, and:
//!
//! - [`AdmmSolver`]: built-in first-order solver for free, non-negative and
//!   PSD cones
//! - [`SolverRegistry`]: name-based lookup used by the metric engines
//! - [`sparse`]: compressed-column constraint matrices and the sparse
//!   Cholesky factorization of `AAᵀ`

pub mod admm;
pub mod cone;
pub mod registry;
pub mod sparse;
pub mod r#trait;

pub use admm::AdmmSolver;
pub use cone::Cone;
pub use r#trait::{ConicProgram, ConicSolution, ConicSolver, SolverSettings};
pub use registry::SolverRegistry;
pub use sparse::SparseMatrix;
