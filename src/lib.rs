// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS Metrics
//!
//! Distinguishability metrics for quantum channels and states, computed by
//! semidefinite programming over complex Hermitian matrices.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             MetricEngine                 │
//! ├──────────────────┬──────────────────────┤
//! │   Diamond norm   │   State exclusion    │
//! ├──────────────────┴──────────────────────┤
//! │   Modeling layer (complex → real SDP)    │
//! ├─────────────────────────────────────────┤
//! │   Solver registry → ConicSolver (ADMM)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`metrics`]: Diamond norm and state exclusion
//! - [`model`]: Hermitian matrix variables, constraints and problems
//! - [`solver`]: Conic solver trait, registry and built-in ADMM solver
//! - [`linalg`]: Dense complex linear algebra, partial transpose, realignment
//! - [`config`]: Configuration management
//! - [`logging`]: Tracing subscriber setup
//! - [`validation`]: Input validation utilities
//! - [`error`]: Error types

pub mod config;
pub mod error;
pub mod linalg;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod solver;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};
pub use linalg::{partial_transpose, realignment};
pub use metrics::{
    diamond_norm, display_value, state_exclusion, DiamondNormReport, ExclusionMode,
    ExclusionOperators, ExclusionResult, MetricEngine,
};

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
