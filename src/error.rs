// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the metrics crate.

use thiserror::Error;

/// Result type alias for metric operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Two shapes that must agree do not.
    #[error("Dimension mismatch in {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: String,
        expected: String,
        actual: String,
    },

    /// A matrix that must be square is not.
    #[error("Matrix must be square, got {rows} × {cols}")]
    NotSquare { rows: usize, cols: usize },

    /// A dimension has an impossible value (e.g. not a perfect square).
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    /// Any other malformed input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Input rejected by configured resource limits.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Misuse of the modeling layer.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// The conic solver failed.
    #[error("Solver failure: {0}")]
    Solver(#[from] SolverError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Shorthand for [`Error::DimensionMismatch`].
    pub fn mismatch(
        what: impl Into<String>,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Error::DimensionMismatch {
            what: what.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// True for errors caused by malformed caller input (shape, dimension,
    /// value or limit problems), as opposed to solver or environment errors.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::DimensionMismatch { .. }
                | Error::NotSquare { .. }
                | Error::InvalidDimension(_)
                | Error::InvalidInput(_)
                | Error::Validation(_)
        )
    }

    /// True if the error originated in the conic solver.
    pub fn is_solver_failure(&self) -> bool {
        matches!(self, Error::Solver(_))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Resource limit exceeded
    #[error("Resource limit exceeded for {resource}: limit={limit}, requested={requested}")]
    ResourceLimit {
        resource: String,
        limit: u64,
        requested: u64,
    },
}

/// Errors raised while building an optimization problem.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A variable handle does not belong to the problem it was used with.
    #[error("Variable '{0}' does not belong to this problem")]
    ForeignVariable(String),

    /// Two operands of an expression have different shapes.
    #[error("Shape mismatch in {op}: {left:?} vs {right:?}")]
    ShapeMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    /// A PSD constraint was placed on an expression that is not Hermitian.
    #[error("PSD constraint requires a Hermitian expression")]
    NotHermitian,

    /// `solve` was called before an objective was set.
    #[error("No objective set")]
    MissingObjective,

    /// A constraint reduces to `0 = c` with `c ≠ 0`.
    #[error("Constraint '{0}' is trivially infeasible")]
    InconsistentConstraint(String),

    /// A constraint id does not belong to the problem.
    #[error("Unknown constraint id {0}")]
    UnknownConstraint(usize),
}

/// Errors reported by a conic solver backend.
#[derive(Debug, Clone, Error)]
pub enum SolverError {
    /// No solver registered under this name
    #[error("Solver not found: {0}")]
    NotFound(String),

    /// The program has no feasible point.
    #[error("Problem is infeasible: {0}")]
    Infeasible(String),

    /// The equality constraints are linearly dependent.
    #[error("Equality constraints are rank deficient: {0}")]
    RankDeficient(String),

    /// The iteration limit was reached before convergence.
    #[error(
        "No convergence after {iterations} iterations \
         (primal residual {primal_residual:.3e}, dual residual {dual_residual:.3e}, gap {gap:.3e})"
    )]
    MaxIterations {
        iterations: usize,
        primal_residual: f64,
        dual_residual: f64,
        gap: f64,
    },

    /// The time limit passed in the settings expired.
    #[error("Time limit of {limit_ms} ms exceeded after {iterations} iterations")]
    TimeLimit { limit_ms: u128, iterations: usize },

    /// Numerical breakdown (NaN, malformed program).
    #[error("Numerical failure: {0}")]
    Numerical(String),
}
