// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dense complex linear algebra used by the modeling layer and the engines.
//!
//! Everything here operates on small dense `ndarray` matrices. Eigenvalue
//! problems are handed to `faer`.
//!
//! - [`ops`]: Kronecker product, adjoint, trace, Hermitization, real lifting
//! - [`eigen`]: Symmetric eigendecomposition and PSD projection
//! - [`realign`]: Partial transpose and realignment of bipartite operators

pub mod eigen;
pub mod ops;
pub mod realign;

pub use eigen::{hermitian_eigenvalues, project_psd};
pub use ops::{
    dagger, hermitize, identity, inner_product, is_hermitian, kron, lift_hermitian, outer,
    perfect_sqrt, trace, unlift_hermitian,
};
pub use realign::{partial_transpose, realignment, BipartiteDims};
