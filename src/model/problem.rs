// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Optimization problems over complex matrix variables.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use ndarray::Array2;
use num_complex::Complex64;
use tracing::debug;

use super::canon::{canonicalize, Layout};
use super::constraint::{Constraint, ConstraintId};
use super::expr::ScalarExpr;
use super::variable::{VarRef, Variable, VariableKind};
use crate::error::{ModelError, Result};
use crate::solver::{ConicSolver, SolverSettings};

static NEXT_PROBLEM_ID: AtomicU64 = AtomicU64::new(1);

/// Objective direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

/// Dual value of one constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum Dual {
    /// Scalar constraints
    Scalar(f64),
    /// PSD and matrix equality constraints
    Matrix(Array2<Complex64>),
}

impl Dual {
    /// The matrix value, if this is a matrix dual.
    pub fn as_matrix(&self) -> Option<&Array2<Complex64>> {
        match self {
            Dual::Matrix(m) => Some(m),
            Dual::Scalar(_) => None,
        }
    }

    /// The scalar value, if this is a scalar dual.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Dual::Scalar(v) => Some(*v),
            Dual::Matrix(_) => None,
        }
    }
}

/// Solver diagnostics attached to a [`Solution`].
#[derive(Debug, Clone)]
pub struct SolveStats {
    /// Name of the solver that produced the solution
    pub solver: String,
    pub iterations: usize,
    pub primal_residual: f64,
    pub dual_residual: f64,
    pub gap: f64,
    pub solve_time: Duration,
    /// Size of the real program (constraints, variables)
    pub program_size: (usize, usize),
}

/// Optimal point of a [`Problem`].
#[derive(Debug, Clone)]
pub struct Solution {
    /// Optimal objective value, in the problem's own sense
    pub optimal_value: f64,
    problem: u64,
    values: Vec<Array2<Complex64>>,
    duals: Vec<Dual>,
    /// Solver diagnostics
    pub stats: SolveStats,
}

impl Solution {
    /// Optimal value of a variable.
    pub fn value(&self, var: &Variable) -> Result<&Array2<Complex64>> {
        if var.id.problem != self.problem {
            return Err(ModelError::ForeignVariable(var.name().to_string()).into());
        }
        self.values
            .get(var.id.index)
            .ok_or_else(|| ModelError::ForeignVariable(var.name().to_string()).into())
    }

    /// Dual value of a constraint.
    pub fn dual(&self, id: ConstraintId) -> Result<&Dual> {
        self.duals
            .get(id.0)
            .ok_or_else(|| ModelError::UnknownConstraint(id.0).into())
    }
}

/// A convex program over Hermitian and complex matrix variables.
///
/// # Example
///
/// ```
/// use qubit_os_metrics::linalg::outer;
/// use qubit_os_metrics::model::{trace, AffineExpr, Problem, ScalarExpr};
/// use qubit_os_metrics::solver::{AdmmSolver, SolverSettings};
/// use ndarray::array;
/// use num_complex::Complex64;
///
/// // Largest eigenvalue of |0⟩⟨0| via max ⟨H, X⟩ s.t. Tr X = 1, X ⪰ 0
/// let h = outer(&array![Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)]);
/// let mut problem = Problem::new();
/// let x = problem.hermitian("x", 2);
/// let ex = AffineExpr::from(&x);
/// problem.add_constraint(ex.psd()?)?;
/// problem.add_constraint(trace(&ex)?.equals(1.0))?;
/// problem.maximize(ScalarExpr::inner(&h, &ex)?)?;
///
/// let solution = problem.solve(&AdmmSolver::new(), &SolverSettings::default())?;
/// assert!((solution.optimal_value - 1.0).abs() < 1e-5);
/// # Ok::<(), qubit_os_metrics::Error>(())
/// ```
#[derive(Debug)]
pub struct Problem {
    id: u64,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: Option<(ScalarExpr, Sense)>,
}

impl Problem {
    /// Create an empty problem.
    pub fn new() -> Self {
        Self {
            id: NEXT_PROBLEM_ID.fetch_add(1, Ordering::Relaxed),
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    fn declare(&mut self, name: String, shape: (usize, usize), kind: VariableKind) -> Variable {
        let id = VarRef {
            problem: self.id,
            index: self.variables.len(),
            shape,
            kind,
        };
        let var = Variable::new(id, name);
        self.variables.push(var.clone());
        var
    }

    /// Declare a `size × size` Hermitian matrix variable.
    pub fn hermitian(&mut self, name: impl Into<String>, size: usize) -> Variable {
        self.declare(name.into(), (size, size), VariableKind::Hermitian)
    }

    /// Declare an unconstrained `rows × cols` complex matrix variable.
    pub fn complex(&mut self, name: impl Into<String>, rows: usize, cols: usize) -> Variable {
        self.declare(name.into(), (rows, cols), VariableKind::Complex)
    }

    /// Number of declared variables.
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Number of constraints added so far.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    fn check_owned<'a>(&self, vars: impl Iterator<Item = &'a VarRef>) -> Result<()> {
        for v in vars {
            if v.problem != self.id || v.index >= self.variables.len() {
                let name = self
                    .variables
                    .get(v.index)
                    .filter(|_| v.problem == self.id)
                    .map_or_else(|| format!("#{}", v.index), |var| var.name().to_string());
                return Err(ModelError::ForeignVariable(name).into());
            }
        }
        Ok(())
    }

    /// Add a constraint and return its handle.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<ConstraintId> {
        self.check_owned(constraint.variables())?;
        self.constraints.push(constraint);
        Ok(ConstraintId(self.constraints.len() - 1))
    }

    /// Set the objective to maximize `expr`.
    pub fn maximize(&mut self, expr: ScalarExpr) -> Result<()> {
        self.set_objective(expr, Sense::Maximize)
    }

    /// Set the objective to minimize `expr`.
    pub fn minimize(&mut self, expr: ScalarExpr) -> Result<()> {
        self.set_objective(expr, Sense::Minimize)
    }

    fn set_objective(&mut self, expr: ScalarExpr, sense: Sense) -> Result<()> {
        self.check_owned(expr.variables())?;
        self.objective = Some((expr, sense));
        Ok(())
    }

    /// Lower the problem to real standard form, solve it and map the result
    /// back to matrix values and duals.
    pub fn solve(&self, solver: &dyn ConicSolver, settings: &SolverSettings) -> Result<Solution> {
        let (objective, sense) = self.objective.as_ref().ok_or(ModelError::MissingObjective)?;

        let refs: Vec<VarRef> = self.variables.iter().map(|v| v.id).collect();
        let layout = Layout::new(&refs);
        let canon = canonicalize(&layout, &self.constraints, objective, *sense)?;
        let program_size = (
            canon.program.num_constraints(),
            canon.program.num_variables(),
        );

        debug!(
            solver = solver.name(),
            variables = self.variables.len(),
            constraints = self.constraints.len(),
            rows = program_size.0,
            columns = program_size.1,
            "Solving problem"
        );

        let raw = solver.solve(&canon.program, settings)?;

        let params = canon.params(&raw);
        let values = (0..self.variables.len())
            .map(|i| layout.vars[i].assemble(layout.params(i, &params)))
            .collect();

        Ok(Solution {
            optimal_value: canon.objective_value(&raw),
            problem: self.id,
            values,
            duals: canon.duals(&raw),
            stats: SolveStats {
                solver: solver.name().to_string(),
                iterations: raw.iterations,
                primal_residual: raw.primal_residual,
                dual_residual: raw.dual_residual,
                gap: raw.gap,
                solve_time: raw.solve_time,
                program_size,
            },
        })
    }
}

impl Default for Problem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, SolverError};
    use crate::linalg::{hermitian_eigenvalues, identity, kron, outer};
    use crate::model::{trace, AffineExpr};
    use crate::solver::AdmmSolver;
    use crate::test_utils::FailingSolver;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn solve(problem: &Problem) -> Solution {
        problem
            .solve(&AdmmSolver::new(), &SolverSettings::default())
            .unwrap()
    }

    #[test]
    fn test_max_eigenvalue_of_complex_hermitian() {
        // σ_y has eigenvalues ±1; max ⟨σ_y, ρ⟩ over density matrices is 1
        let sigma_y = array![[c(0.0, 0.0), c(0.0, -1.0)], [c(0.0, 1.0), c(0.0, 0.0)]];
        let mut problem = Problem::new();
        let rho = problem.hermitian("rho", 2);
        let ex = AffineExpr::from(&rho);
        let psd = problem.add_constraint(ex.psd().unwrap()).unwrap();
        let unit = problem
            .add_constraint(trace(&ex).unwrap().equals(1.0))
            .unwrap();
        problem
            .maximize(ScalarExpr::inner(&sigma_y, &ex).unwrap())
            .unwrap();

        let solution = solve(&problem);
        assert_relative_eq!(solution.optimal_value, 1.0, epsilon = 1e-5);

        // Optimal ρ is the +1 eigenprojector (I + σ_y)/2
        let value = solution.value(&rho).unwrap();
        assert_relative_eq!(value[[0, 1]].im, -0.5, epsilon = 1e-4);
        assert_relative_eq!(value[[0, 0]].re, 0.5, epsilon = 1e-4);

        // Trace multiplier equals the optimal value, PSD dual is λ I − σ_y ⪰ 0
        let mult = solution.dual(unit).unwrap().as_scalar().unwrap();
        assert_relative_eq!(mult, 1.0, epsilon = 1e-4);
        let lambda = solution.dual(psd).unwrap().as_matrix().unwrap();
        let vals = hermitian_eigenvalues(lambda);
        assert!(vals[0] > -1e-6);
        assert_relative_eq!(vals[1], 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_loewner_constraint_with_kron() {
        // max Tr W s.t. W ⪯ I ⊗ ρ, Tr ρ = 1, ρ ⪰ 0 has value d = 2
        let mut problem = Problem::new();
        let rho = problem.hermitian("rho", 2);
        let w = problem.hermitian("w", 4);
        let er = AffineExpr::from(&rho);
        let ew = AffineExpr::from(&w);
        problem.add_constraint(er.psd().unwrap()).unwrap();
        problem
            .add_constraint(trace(&er).unwrap().equals(1.0))
            .unwrap();
        problem
            .add_constraint(ew.leq(&AffineExpr::kron_left(&identity(2), &rho)).unwrap())
            .unwrap();
        problem.maximize(trace(&ew).unwrap()).unwrap();

        let solution = solve(&problem);
        assert_relative_eq!(solution.optimal_value, 2.0, epsilon = 1e-4);

        let w_val = solution.value(&w).unwrap();
        let rho_val = solution.value(&rho).unwrap();
        let gap = kron(&identity(2), rho_val) - w_val;
        assert!(hermitian_eigenvalues(&gap)[0] > -1e-4);
    }

    #[test]
    fn test_matrix_equality_and_minimize() {
        // min Σ ⟨Pᵢ, Mᵢ⟩ s.t. M₀ + M₁ = I, Mᵢ ⪰ 0 with orthogonal projectors
        let p0 = outer(&array![c(1.0, 0.0), c(0.0, 0.0)]);
        let p1 = outer(&array![c(0.0, 0.0), c(1.0, 0.0)]);
        let mut problem = Problem::new();
        let m0 = problem.hermitian("m0", 2);
        let m1 = problem.hermitian("m1", 2);
        let e0 = AffineExpr::from(&m0);
        let e1 = AffineExpr::from(&m1);
        problem.add_constraint(e0.psd().unwrap()).unwrap();
        problem.add_constraint(e1.psd().unwrap()).unwrap();
        let sum = problem
            .add_constraint(e0.plus(&e1).unwrap().equals_const(identity(2)).unwrap())
            .unwrap();
        let obj = ScalarExpr::inner(&p0, &e0)
            .unwrap()
            .plus(ScalarExpr::inner(&p1, &e1).unwrap());
        problem.minimize(obj).unwrap();

        let solution = solve(&problem);
        assert_relative_eq!(solution.optimal_value, 0.0, epsilon = 1e-5);
        let m0_val = solution.value(&m0).unwrap();
        assert_relative_eq!(m0_val[[1, 1]].re, 1.0, epsilon = 1e-4);
        assert!(solution.dual(sum).unwrap().as_matrix().is_some());
    }

    #[test]
    fn test_scalar_inequality() {
        // max Re x₀₀ s.t. Tr X ≤ 3, X ⪰ 0 (1 × 1)
        let mut problem = Problem::new();
        let x = problem.hermitian("x", 1);
        let ex = AffineExpr::from(&x);
        problem.add_constraint(ex.psd().unwrap()).unwrap();
        let cap = problem
            .add_constraint(trace(&ex).unwrap().leq(3.0))
            .unwrap();
        problem.maximize(trace(&ex).unwrap()).unwrap();

        let solution = solve(&problem);
        assert_relative_eq!(solution.optimal_value, 3.0, epsilon = 1e-5);
        let mult = solution.dual(cap).unwrap().as_scalar().unwrap();
        assert_relative_eq!(mult, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_complex_variable_equality() {
        // Z = [[1 + 2i]] pinned by an entrywise equality; minimize Re Z₀₀
        let mut problem = Problem::new();
        let z = problem.complex("z", 1, 1);
        let ez = AffineExpr::from(&z);
        problem
            .add_constraint(ez.equals_const(array![[c(1.0, 2.0)]]).unwrap())
            .unwrap();
        problem
            .minimize(ScalarExpr::inner(&array![[c(1.0, 0.0)]], &ez).unwrap())
            .unwrap();

        let solution = solve(&problem);
        assert_relative_eq!(solution.optimal_value, 1.0, epsilon = 1e-5);
        let value = solution.value(&z).unwrap();
        assert_relative_eq!(value[[0, 0]].im, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_foreign_variable_rejected() {
        let mut first = Problem::new();
        let mut second = Problem::new();
        let x = first.hermitian("x", 2);
        let _ = second.hermitian("y", 2);

        let err = second
            .add_constraint(AffineExpr::from(&x).psd().unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::Model(ModelError::ForeignVariable(_))));
        assert!(second
            .maximize(trace(&AffineExpr::from(&x)).unwrap())
            .is_err());
    }

    #[test]
    fn test_missing_objective() {
        let mut problem = Problem::new();
        let _ = problem.hermitian("x", 2);
        let err = problem
            .solve(&AdmmSolver::new(), &SolverSettings::default())
            .unwrap_err();
        assert!(matches!(err, Error::Model(ModelError::MissingObjective)));
    }

    #[test]
    fn test_solver_errors_propagate() {
        let mut problem = Problem::new();
        let x = problem.hermitian("x", 1);
        problem.minimize(trace(&AffineExpr::from(&x)).unwrap()).unwrap();
        let err = problem
            .solve(&FailingSolver::new("broken"), &SolverSettings::default())
            .unwrap_err();
        assert!(matches!(err, Error::Solver(SolverError::Infeasible(_))));
    }

    #[test]
    fn test_unknown_constraint_and_foreign_value() {
        let mut problem = Problem::new();
        let x = problem.hermitian("x", 1);
        let ex = AffineExpr::from(&x);
        problem.add_constraint(trace(&ex).unwrap().equals(2.0)).unwrap();
        problem.minimize(trace(&ex).unwrap()).unwrap();
        let solution = solve(&problem);
        assert_relative_eq!(solution.optimal_value, 2.0, epsilon = 1e-6);

        assert!(solution.dual(ConstraintId(5)).is_err());
        let mut other = Problem::new();
        let y = other.hermitian("y", 1);
        assert!(solution.value(&y).is_err());
    }
}
