// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Conic solver trait and the real standard form it consumes.

use std::time::Duration;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::cone::{total_dim, Cone};
use super::sparse::SparseMatrix;
use crate::error::SolverError;

/// A conic program in real standard form:
///
/// ```text
/// minimize    cᵀx + offset
/// subject to  A x = b
///             x ∈ K = K₁ × … × Kₚ
/// ```
///
/// The coordinates of `x` are laid out cone by cone in the order of `cones`.
#[derive(Debug, Clone)]
pub struct ConicProgram {
    /// Objective coefficients
    pub c: Array1<f64>,
    /// Constant added to the objective value
    pub offset: f64,
    /// Equality constraint matrix (m × n), compressed by column
    pub a: SparseMatrix,
    /// Equality right-hand side
    pub b: Array1<f64>,
    /// Cone product partitioning x
    pub cones: Vec<Cone>,
}

impl ConicProgram {
    /// Number of scalar decision variables.
    pub fn num_variables(&self) -> usize {
        self.c.len()
    }

    /// Number of equality constraints.
    pub fn num_constraints(&self) -> usize {
        self.b.len()
    }

    /// Check that all sizes agree.
    pub fn check_shapes(&self) -> Result<(), SolverError> {
        let n = self.c.len();
        let m = self.b.len();
        if (self.a.nrows(), self.a.ncols()) != (m, n) {
            return Err(SolverError::Numerical(format!(
                "constraint matrix is ({}, {}), expected ({m}, {n})",
                self.a.nrows(),
                self.a.ncols()
            )));
        }
        let cone_dim = total_dim(&self.cones);
        if cone_dim != n {
            return Err(SolverError::Numerical(format!(
                "cones cover {cone_dim} coordinates, program has {n}"
            )));
        }
        Ok(())
    }
}

/// Primal-dual solution of a [`ConicProgram`].
#[derive(Debug, Clone)]
pub struct ConicSolution {
    /// Primal point
    pub x: Array1<f64>,
    /// Equality multipliers
    pub y: Array1<f64>,
    /// Dual cone slack, `s = c − Aᵀy ∈ K*`
    pub s: Array1<f64>,
    /// cᵀx + offset
    pub primal_objective: f64,
    /// bᵀy + offset
    pub dual_objective: f64,
    /// Iterations used
    pub iterations: usize,
    /// Relative primal residual ‖Ax − b‖ / (1 + ‖b‖)
    pub primal_residual: f64,
    /// Relative dual residual ‖Aᵀy + s − c‖ / (1 + ‖c‖)
    pub dual_residual: f64,
    /// Relative duality gap
    pub gap: f64,
    /// Wall-clock solve time
    pub solve_time: Duration,
}

/// Tunables passed to every solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Iteration limit
    pub max_iterations: usize,
    /// Stopping tolerance on relative residuals and gap
    pub tolerance: f64,
    /// Starting penalty parameter of the augmented Lagrangian
    pub initial_penalty: f64,
    /// Rebalance the penalty from the residual ratio
    pub adaptive_penalty: bool,
    /// Optional wall-clock deadline
    #[serde(with = "optional_secs")]
    pub time_limit: Option<Duration>,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iterations: 50_000,
            tolerance: 1e-7,
            initial_penalty: 1.0,
            adaptive_penalty: true,
            time_limit: None,
        }
    }
}

/// (De)serialize `Option<Duration>` as fractional seconds.
mod optional_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&d.as_secs_f64()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let secs = Option::<f64>::deserialize(d)?;
        match secs {
            Some(v) if v.is_finite() && v > 0.0 => Ok(Some(Duration::from_secs_f64(v))),
            Some(v) => Err(serde::de::Error::custom(format!(
                "time limit must be positive, got {v}"
            ))),
            None => Ok(None),
        }
    }
}

/// The trait that all conic solvers must implement.
///
/// Solvers are stateless: one value may serve any number of solves, from
/// any thread.
pub trait ConicSolver: Send + Sync {
    /// Get the solver name used for registry lookup.
    fn name(&self) -> &str;

    /// Solve a program to the tolerance in `settings`.
    ///
    /// Returns an error rather than a low-accuracy point when the solver
    /// stops before convergence.
    fn solve(
        &self,
        program: &ConicProgram,
        settings: &SolverSettings,
    ) -> Result<ConicSolution, SolverError>;
}
