// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Diamond norm distance between two channels.
//!
//! With `Δ = J₁ − J₂` (Hermitized), the distance is twice the optimal value of
//!
//! ```text
//! maximize    Re Tr(Δ† W)
//! subject to  W ⪯ I_d ⊗ ρ,  W ⪰ 0,  ρ ⪰ 0,  Tr ρ = 1
//! ```
//!
//! where ρ is d × d and W is d² × d² (Watrous 2012). Choi matrices put the
//! channel input in the second tensor factor, so ρ sits there too.
//!
//! # References
//!
//! - Watrous (2012), "Simpler semidefinite programs for completely bounded
//!   norms", Chicago J. Theor. Comput. Sci. 2013, 8. arXiv:1207.5726

use ndarray::Array2;
use num_complex::Complex64;
use tracing::{debug, info};

use super::engine::MetricEngine;
use super::types::DiamondNormReport;
use crate::error::Result;
use crate::linalg::{hermitize, identity};
use crate::model::{trace, AffineExpr, Problem, ScalarExpr};
use crate::validation::{check_dimension_limit, validate_choi_pair};

impl MetricEngine {
    /// Diamond norm distance `‖Φ₁ − Φ₂‖◇` from two d² × d² Choi matrices.
    ///
    /// The solver value is returned as is; tiny negative values are possible.
    pub fn diamond_norm(
        &self,
        choi_1: &Array2<Complex64>,
        choi_2: &Array2<Complex64>,
    ) -> Result<f64> {
        Ok(self.diamond_norm_report(choi_1, choi_2)?.value)
    }

    /// Like [`diamond_norm`](Self::diamond_norm), also returning the optimal
    /// ρ, W and solver diagnostics.
    pub fn diamond_norm_report(
        &self,
        choi_1: &Array2<Complex64>,
        choi_2: &Array2<Complex64>,
    ) -> Result<DiamondNormReport> {
        let dim = validate_choi_pair(choi_1, choi_2)?;
        check_dimension_limit(dim, self.limits())?;
        let solver = self.solver()?;

        let delta = hermitize(&(choi_1 - choi_2));

        let mut problem = Problem::new();
        let rho = problem.hermitian("rho", dim);
        let w = problem.hermitian("w", dim * dim);
        let rho_expr = AffineExpr::from(&rho);
        let w_expr = AffineExpr::from(&w);

        problem.add_constraint(rho_expr.psd()?.named("rho_psd"))?;
        problem.add_constraint(trace(&rho_expr)?.equals(1.0).named("rho_unit_trace"))?;
        problem.add_constraint(w_expr.psd()?.named("w_psd"))?;
        problem.add_constraint(
            w_expr
                .leq(&AffineExpr::kron_left(&identity(dim), &rho))?
                .named("w_bounded"),
        )?;
        problem.maximize(ScalarExpr::inner(&delta, &w_expr)?)?;

        debug!(dim, solver = solver.name(), "Computing diamond norm");
        let solution = problem.solve(solver.as_ref(), self.settings())?;
        let value = 2.0 * solution.optimal_value;

        info!(
            dim,
            value,
            iterations = solution.stats.iterations,
            solve_time_ms = solution.stats.solve_time.as_millis() as u64,
            "Diamond norm computed"
        );

        Ok(DiamondNormReport {
            value,
            rho: solution.value(&rho)?.clone(),
            w: solution.value(&w)?.clone(),
            stats: solution.stats,
        })
    }
}
