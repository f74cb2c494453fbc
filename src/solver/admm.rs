// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Alternating-direction augmented Lagrangian method for conic programs.
//!
//! Implements the dual ADMM of:
//!   Wen, Goldfarb & Yin (2010), "Alternating direction augmented Lagrangian
//!   methods for semidefinite programming", Math. Prog. Comp. 2, 203–230.
//!
//! Applied to the dual `max bᵀy s.t. c − Aᵀy = s, s ∈ K*`, one iteration is
//!
//! ```text
//! y ← (AAᵀ)⁻¹ (μ(b − Ax) + A(c − s))
//! V ← c − Aᵀy − μx
//! s ← Π_{K*}(V)
//! x ← Π_K(−V) / μ
//! ```
//!
//! where the two projections come from a single Moreau decomposition of `V`.
//! `AAᵀ` is formed sparsely and factored once per solve.

use std::time::{Duration, Instant};

use ndarray::{s, Array1};
use tracing::{debug, info, trace, warn};

use super::cone::moreau_split;
use super::r#trait::{ConicProgram, ConicSolution, ConicSolver, SolverSettings};
use super::sparse::{self, SparseCholesky, SparseMatrix};
use crate::error::SolverError;

/// Iterations between penalty updates.
const PENALTY_UPDATE_INTERVAL: usize = 50;

/// Residual ratio that triggers a penalty update.
const RESIDUAL_BALANCE: f64 = 10.0;

/// Multiplicative penalty step.
const PENALTY_STEP: f64 = 2.0;

const MIN_PENALTY: f64 = 1e-6;
const MAX_PENALTY: f64 = 1e6;

/// Relative row norm below which a constraint row counts as zero.
const RANK_TOLERANCE: f64 = 1e-10;

/// Largest relative error allowed when the factored `AAᵀ` reproduces a
/// known solution. Larger errors mean `AAᵀ` is numerically singular.
const FACTOR_CHECK_TOLERANCE: f64 = 1e-6;

/// Iterations between progress log lines.
const LOG_INTERVAL: usize = 1000;

/// Built-in first-order conic solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdmmSolver;

impl AdmmSolver {
    /// Registry name of this solver.
    pub const NAME: &'static str = "admm";

    /// Create a new solver.
    pub fn new() -> Self {
        Self
    }
}

impl ConicSolver for AdmmSolver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn solve(
        &self,
        program: &ConicProgram,
        settings: &SolverSettings,
    ) -> Result<ConicSolution, SolverError> {
        program.check_shapes()?;
        check_settings(settings)?;

        let start = Instant::now();
        let a = program.a.as_ref();
        let (m, n) = (a.nrows(), a.ncols());
        let b = &program.b;
        let c = &program.c;

        debug!(
            constraints = m,
            variables = n,
            cones = program.cones.len(),
            "Starting ADMM solve"
        );

        check_deadline(start, settings.time_limit, 0)?;
        let chol = factor_normal_matrix(&program.a, start, settings.time_limit)?;
        check_deadline(start, settings.time_limit, 0)?;
        debug!(
            setup_ms = start.elapsed().as_millis() as u64,
            "Factored normal matrix"
        );
        let b_scale = 1.0 + norm(b);
        let c_scale = 1.0 + norm(c);

        let mut x = Array1::<f64>::zeros(n);
        let mut slack = Array1::<f64>::zeros(n);
        let mut mu = settings.initial_penalty;

        let mut primal_residual = f64::INFINITY;
        let mut dual_residual = f64::INFINITY;
        let mut gap = f64::INFINITY;

        for iteration in 1..=settings.max_iterations {
            let rhs = (b - &sparse::mul(a, &x)) * mu + sparse::mul(a, &(c - &slack));
            let y = chol.solve(&rhs);
            let aty = sparse::mul_transpose(a, &y);
            let v = c - &aty - &(&x * mu);

            let mut offset = 0;
            for cone in &program.cones {
                let end = offset + cone.dim();
                moreau_split(
                    *cone,
                    v.slice(s![offset..end]),
                    slack.slice_mut(s![offset..end]),
                    x.slice_mut(s![offset..end]),
                );
                offset = end;
            }
            x.mapv_inplace(|xi| xi / mu);

            let primal_objective = c.dot(&x);
            let dual_objective = b.dot(&y);
            primal_residual = norm(&(sparse::mul(a, &x) - b)) / b_scale;
            dual_residual = norm(&(&aty + &slack - c)) / c_scale;
            gap = (primal_objective - dual_objective).abs()
                / (1.0 + primal_objective.abs() + dual_objective.abs());

            if !(primal_residual.is_finite() && dual_residual.is_finite() && gap.is_finite()) {
                return Err(SolverError::Numerical(format!(
                    "non-finite iterate at iteration {iteration}"
                )));
            }

            if primal_residual <= settings.tolerance
                && dual_residual <= settings.tolerance
                && gap <= settings.tolerance
            {
                let solve_time = start.elapsed();
                info!(
                    iterations = iteration,
                    objective = primal_objective + program.offset,
                    solve_time_ms = solve_time.as_millis() as u64,
                    "ADMM converged"
                );
                return Ok(ConicSolution {
                    x,
                    y,
                    s: slack,
                    primal_objective: primal_objective + program.offset,
                    dual_objective: dual_objective + program.offset,
                    iterations: iteration,
                    primal_residual,
                    dual_residual,
                    gap,
                    solve_time,
                });
            }

            if iteration % LOG_INTERVAL == 0 {
                trace!(
                    iteration,
                    primal_residual,
                    dual_residual,
                    gap,
                    penalty = mu,
                    "ADMM progress"
                );
            }

            if settings.adaptive_penalty && iteration % PENALTY_UPDATE_INTERVAL == 0 {
                // A larger μ weights primal feasibility of x, a smaller one
                // the dual feasibility of (y, s).
                if primal_residual > RESIDUAL_BALANCE * dual_residual {
                    mu = (mu * PENALTY_STEP).min(MAX_PENALTY);
                } else if dual_residual > RESIDUAL_BALANCE * primal_residual {
                    mu = (mu / PENALTY_STEP).max(MIN_PENALTY);
                }
            }

            check_deadline(start, settings.time_limit, iteration)?;
        }

        warn!(
            iterations = settings.max_iterations,
            primal_residual, dual_residual, gap, "ADMM stopped at iteration limit"
        );
        Err(SolverError::MaxIterations {
            iterations: settings.max_iterations,
            primal_residual,
            dual_residual,
            gap,
        })
    }
}

fn check_settings(settings: &SolverSettings) -> Result<(), SolverError> {
    if settings.max_iterations == 0 {
        return Err(SolverError::Numerical("max_iterations must be positive".into()));
    }
    if !(settings.tolerance.is_finite() && settings.tolerance > 0.0) {
        return Err(SolverError::Numerical(format!(
            "tolerance must be positive, got {}",
            settings.tolerance
        )));
    }
    if !(settings.initial_penalty.is_finite() && settings.initial_penalty > 0.0) {
        return Err(SolverError::Numerical(format!(
            "initial penalty must be positive, got {}",
            settings.initial_penalty
        )));
    }
    Ok(())
}

fn norm(v: &Array1<f64>) -> f64 {
    v.dot(v).sqrt()
}

fn check_deadline(
    start: Instant,
    limit: Option<Duration>,
    iterations: usize,
) -> Result<(), SolverError> {
    match limit {
        Some(limit) if start.elapsed() >= limit => {
            warn!(
                iterations,
                limit_ms = limit.as_millis() as u64,
                "ADMM stopped at time limit"
            );
            Err(SolverError::TimeLimit {
                limit_ms: limit.as_millis(),
                iterations,
            })
        }
        _ => Ok(()),
    }
}

/// Factor `AAᵀ`, rejecting constraint sets that are linearly dependent.
fn factor_normal_matrix(
    a: &SparseMatrix,
    start: Instant,
    limit: Option<Duration>,
) -> Result<SparseCholesky, SolverError> {
    let a = a.as_ref();
    let row_norms = sparse::row_norms_squared(a);
    let largest = row_norms.iter().fold(0.0_f64, |acc, &r| acc.max(r));
    let threshold = RANK_TOLERANCE * largest.max(1.0);
    if let Some(row) = row_norms.iter().position(|&r| r <= threshold) {
        return Err(SolverError::RankDeficient(format!("row {row} is zero")));
    }

    let gram = sparse::gram(a)?;
    check_deadline(start, limit, 0)?;
    let chol = SparseCholesky::factor(gram.as_ref())?;

    // Dependent rows can survive the factorization with a tiny pivot. Solving
    // for a known vector exposes the amplified rounding error.
    let ones = Array1::<f64>::ones(a.nrows());
    let recovered = chol.solve(&sparse::mul(gram.as_ref(), &ones));
    let error = norm(&(recovered - &ones)) / norm(&ones).max(1.0);
    if !(error <= FACTOR_CHECK_TOLERANCE) {
        return Err(SolverError::RankDeficient(format!(
            "AAᵀ is numerically singular (relative error {error:.3e})"
        )));
    }
    Ok(chol)
}
