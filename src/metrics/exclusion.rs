// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Quantum state exclusion.
//!
//! Given an ensemble `{(pᵢ, |vᵢ⟩)}`, find the measurement that minimizes the
//! probability of outcome `i` when the state was `|vᵢ⟩`:
//!
//! ```text
//! primal:  minimize  Σ pᵢ ⟨vᵢ|Mᵢ|vᵢ⟩   subject to  Σ Mᵢ = I,  Mᵢ ⪰ 0
//! dual:    maximize  Tr Y              subject to  Y ⪯ pᵢ |vᵢ⟩⟨vᵢ|  for all i
//! ```
//!
//! Both programs have the same optimal value.
//!
//! # References
//!
//! - Bandyopadhyay et al. (2014), "Conclusive exclusion of quantum states",
//!   Phys. Rev. A 89, 022336. arXiv:1306.4683

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use tracing::{debug, info};

use super::engine::MetricEngine;
use super::types::{ExclusionMode, ExclusionOperators, ExclusionResult};
use crate::error::{ModelError, Result};
use crate::linalg::{identity, outer};
use crate::model::{trace, AffineExpr, ConstraintId, Problem, ScalarExpr, Solution};
use crate::solver::ConicSolver;
use crate::validation::{
    check_dimension_limit, check_ensemble_limit, resolve_probabilities, validate_ensemble,
};

impl MetricEngine {
    /// Optimal exclusion error probability for an ensemble of pure states.
    ///
    /// `probs` defaults to uniform over the number of states.
    pub fn state_exclusion(
        &self,
        vectors: &[Array1<Complex64>],
        probs: Option<&[f64]>,
        mode: ExclusionMode,
    ) -> Result<ExclusionResult> {
        let dim = validate_ensemble(vectors)?;
        check_ensemble_limit(vectors.len(), self.limits())?;
        check_dimension_limit(dim, self.limits())?;
        let probs = resolve_probabilities(probs, vectors.len())?;
        let solver = self.solver()?;

        // pᵢ |vᵢ⟩⟨vᵢ|
        let weighted: Vec<Array2<Complex64>> = vectors
            .iter()
            .zip(&probs)
            .map(|(v, &p)| outer(v).mapv(|z| z * p))
            .collect();

        debug!(
            states = vectors.len(),
            dim,
            mode = %mode,
            solver = solver.name(),
            "Computing state exclusion"
        );

        let result = match mode {
            ExclusionMode::Primal => self.solve_primal(&weighted, dim, solver.as_ref())?,
            ExclusionMode::Dual => self.solve_dual(&weighted, dim, solver.as_ref())?,
        };

        info!(
            states = vectors.len(),
            mode = %mode,
            value = result.value,
            iterations = result.stats.iterations,
            "State exclusion computed"
        );
        Ok(result)
    }

    fn solve_primal(
        &self,
        weighted: &[Array2<Complex64>],
        dim: usize,
        solver: &dyn ConicSolver,
    ) -> Result<ExclusionResult> {
        let mut problem = Problem::new();
        let measurements: Vec<_> = (0..weighted.len())
            .map(|i| problem.hermitian(format!("m{i}"), dim))
            .collect();

        let mut total = AffineExpr::zeros((dim, dim));
        let mut objective = ScalarExpr::default();
        for (i, (m, c)) in measurements.iter().zip(weighted).enumerate() {
            let expr = AffineExpr::from(m);
            problem.add_constraint(expr.psd()?.named(format!("m{i}_psd")))?;
            objective = objective.plus(ScalarExpr::inner(c, &expr)?);
            total = total.plus(&expr)?;
        }
        problem.add_constraint(total.equals_const(identity(dim))?.named("completeness"))?;
        problem.minimize(objective)?;

        let solution = problem.solve(solver, self.settings())?;
        let operators = measurements
            .iter()
            .map(|m| solution.value(m).cloned())
            .collect::<Result<Vec<_>>>()?;

        Ok(ExclusionResult {
            value: solution.optimal_value,
            operators: ExclusionOperators::Measurements(operators),
            stats: solution.stats,
        })
    }

    fn solve_dual(
        &self,
        weighted: &[Array2<Complex64>],
        dim: usize,
        solver: &dyn ConicSolver,
    ) -> Result<ExclusionResult> {
        let mut problem = Problem::new();
        let y = problem.hermitian("y", dim);
        let y_expr = AffineExpr::from(&y);

        let mut bounds = Vec::with_capacity(weighted.len());
        for (i, c) in weighted.iter().enumerate() {
            let bound = y_expr.leq_const(c.clone())?.named(format!("bound_{i}"));
            bounds.push(problem.add_constraint(bound)?);
        }
        problem.maximize(trace(&y_expr)?)?;

        let solution = problem.solve(solver, self.settings())?;
        let operators = bounds
            .into_iter()
            .map(|id| psd_dual(&solution, id))
            .collect::<Result<Vec<_>>>()?;

        Ok(ExclusionResult {
            value: solution.optimal_value,
            operators: ExclusionOperators::ConstraintDuals(operators),
            stats: solution.stats,
        })
    }
}

fn psd_dual(solution: &Solution, id: ConstraintId) -> Result<Array2<Complex64>> {
    solution
        .dual(id)?
        .as_matrix()
        .cloned()
        .ok_or_else(|| ModelError::UnknownConstraint(id.index()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResourceLimits;
    use crate::error::{Error, ValidationError};
    use crate::linalg::hermitian_eigenvalues;
    use crate::solver::SolverRegistry;
    use crate::test_utils::{bell_states, ket, ket_plus, ket_zero, trine_states, RecordingSolver};
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn sum(ops: &[Array2<Complex64>]) -> Array2<Complex64> {
        ops.iter().fold(Array2::zeros(ops[0].dim()), |acc, m| acc + m)
    }

    fn assert_measurement(ops: &[Array2<Complex64>], tol: f64) {
        for m in ops {
            assert!(hermitian_eigenvalues(m)[0] > -tol);
        }
        let total = sum(ops);
        let id = identity(total.nrows());
        for (a, b) in total.iter().zip(id.iter()) {
            assert_relative_eq!(a.re, b.re, epsilon = tol);
            assert_relative_eq!(a.im, b.im, epsilon = tol);
        }
    }

    #[test]
    fn test_zero_and_plus() {
        // (1 − 1/√2)/2
        let expected = 0.5 * (1.0 - std::f64::consts::FRAC_1_SQRT_2);
        let engine = MetricEngine::new();
        let states = [ket_zero(), ket_plus()];
        for mode in [ExclusionMode::Primal, ExclusionMode::Dual] {
            let result = engine
                .state_exclusion(&states, Some(&[0.5, 0.5]), mode)
                .unwrap();
            assert_relative_eq!(result.value, expected, epsilon = 1e-4);
            assert_eq!(result.operators.mode(), mode);
            assert_eq!(result.operators().len(), 2);
        }
    }

    #[test]
    fn test_orthogonal_bell_states_are_perfectly_excluded() {
        let engine = MetricEngine::new();
        let bell = bell_states();
        let result = engine
            .state_exclusion(&bell[..2], Some(&[0.5, 0.5]), ExclusionMode::Dual)
            .unwrap();
        assert!(result.value.abs() < 1e-5, "value = {}", result.value);
    }

    #[test]
    fn test_trine_states_are_perfectly_excluded() {
        let engine = MetricEngine::new();
        let result = engine
            .state_exclusion(&trine_states(), None, ExclusionMode::Primal)
            .unwrap();
        assert!(result.value.abs() < 1e-5, "value = {}", result.value);
        assert_measurement(result.operators(), 1e-4);
    }

    #[test]
    fn test_primal_and_dual_agree() {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let states = vec![
            ket_zero(),
            ket_plus(),
            Array1::from(vec![Complex64::new(h, 0.0), Complex64::new(0.0, h)]),
        ];
        let probs = [0.5, 0.3, 0.2];
        let engine = MetricEngine::new();
        let primal = engine
            .state_exclusion(&states, Some(&probs), ExclusionMode::Primal)
            .unwrap();
        let dual = engine
            .state_exclusion(&states, Some(&probs), ExclusionMode::Dual)
            .unwrap();
        assert_relative_eq!(primal.value, dual.value, epsilon = 1e-4);
        assert!(primal.value >= -1e-6);
        assert_measurement(primal.operators(), 1e-4);
    }

    #[test]
    fn test_dual_operators_form_a_measurement() {
        let engine = MetricEngine::new();
        let result = engine
            .state_exclusion(&[ket_zero(), ket_plus()], None, ExclusionMode::Dual)
            .unwrap();
        assert!(matches!(result.operators, ExclusionOperators::ConstraintDuals(_)));
        assert_measurement(result.operators(), 1e-4);
    }

    #[test]
    fn test_default_probabilities_follow_state_count() {
        // Three qubit states: uniform over 3, not over the dimension
        let states = [ket_zero(), ket(&[0.0, 1.0]), ket_plus()];
        let engine = MetricEngine::new();
        let implicit = engine
            .state_exclusion(&states, None, ExclusionMode::default())
            .unwrap();
        let third = 1.0 / 3.0;
        let explicit = engine
            .state_exclusion(&states, Some(&[third, third, third]), ExclusionMode::Dual)
            .unwrap();
        assert_relative_eq!(implicit.value, explicit.value, epsilon = 1e-6);
        // |0⟩ and |1⟩ alone are already perfectly excludable
        assert!(implicit.value.abs() < 1e-5);
    }

    #[test]
    fn test_input_errors() {
        let engine = MetricEngine::new();

        let err = engine
            .state_exclusion(&[], None, ExclusionMode::Dual)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = engine
            .state_exclusion(&[ket_zero(), bell_states()[0].clone()], None, ExclusionMode::Dual)
            .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));

        let err = engine
            .state_exclusion(&[ket_zero(), ket_plus()], Some(&[1.0]), ExclusionMode::Primal)
            .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));

        let err = engine
            .state_exclusion(&[ket_zero(), ket_plus()], Some(&[0.7, 0.7]), ExclusionMode::Dual)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_ensemble_limit() {
        let engine = MetricEngine::new().with_limits(ResourceLimits {
            max_ensemble_size: 2,
            ..ResourceLimits::default()
        });
        let err = engine
            .state_exclusion(&trine_states(), None, ExclusionMode::Dual)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::ResourceLimit { .. })));
    }

    #[test]
    fn test_named_solver_is_used() {
        let recorder = Arc::new(RecordingSolver::new("recorder"));
        let registry = Arc::new(SolverRegistry::with_builtin());
        registry.register(recorder.clone());
        let engine = MetricEngine::new()
            .with_registry(registry)
            .with_solver("recorder");

        let result = engine
            .state_exclusion(&[ket_zero(), ket_plus()], None, ExclusionMode::Dual)
            .unwrap();
        assert_relative_eq!(result.value, 0.146_446_6, epsilon = 1e-4);
        assert_eq!(recorder.call_count(), 1);
    }
}
