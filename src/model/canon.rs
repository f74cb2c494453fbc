// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Lowering of complex matrix models to a real [`ConicProgram`].
//!
//! The decision vector is `x = [p ; t]`: the real parameters `p` of all
//! variables (free cone) followed by one slack block per inequality.
//!
//! - `E ⪰ 0` with E Hermitian d × d becomes `svec(lift(E(p))) − t = 0`,
//!   `t ∈ PSD(2d)`, where `lift(A + iB) = [[A, −B], [B, A]]`.
//! - `E = 0` becomes one row per independent real coordinate of E: the
//!   real diagonal and Re/Im of the upper triangle if E is Hermitian, Re/Im
//!   of every entry otherwise.
//! - `s ≤ 0` and `s ≥ 0` get a non-negative slack, `s = 0` a plain row.
//!
//! A maximization is solved as the minimization of the negated objective.

use std::collections::BTreeMap;

use ndarray::{s, Array1, Array2};
use num_complex::Complex64;

use super::constraint::{Constraint, ConstraintKind, Relation};
use super::expr::{AffineExpr, ScalarExpr};
use super::problem::{Dual, Sense};
use super::variable::VarRef;
use crate::error::{ModelError, Result};
use crate::linalg::{inner_product, unlift_hermitian};
use crate::solver::cone::{smat, svec_index};
use crate::solver::sparse;
use crate::solver::{Cone, ConicProgram, ConicSolution};

/// Rows whose coefficients are all below this are considered empty.
const ZERO_ROW_TOL: f64 = 1e-14;

/// Right-hand side magnitude above which an empty row is infeasible.
const INCONSISTENCY_TOL: f64 = 1e-9;

/// Parameter offsets of the problem's variables.
pub(crate) struct Layout {
    pub(crate) vars: Vec<VarRef>,
    offsets: Vec<usize>,
    pub(crate) num_params: usize,
}

impl Layout {
    pub(crate) fn new(vars: &[VarRef]) -> Self {
        let mut offsets = Vec::with_capacity(vars.len());
        let mut total = 0;
        for v in vars {
            offsets.push(total);
            total += v.num_params();
        }
        Self {
            vars: vars.to_vec(),
            offsets,
            num_params: total,
        }
    }

    /// Parameter slice of variable `index` inside `x`.
    pub(crate) fn params<'a>(&self, index: usize, x: &'a [f64]) -> &'a [f64] {
        let start = self.offsets[index];
        &x[start..start + self.vars[index].num_params()]
    }
}

/// Non-zero entries of one coefficient matrix.
type Entries = Vec<((usize, usize), Complex64)>;

/// An affine matrix expression as `E₀ + Σₚ pₚ Gₚ` over global parameters.
/// Each `Gₚ` is stored as its non-zero entries.
struct Linearized {
    constant: Array2<Complex64>,
    columns: BTreeMap<usize, Entries>,
}

fn linearize(expr: &AffineExpr, layout: &Layout) -> Linearized {
    let mut columns: BTreeMap<usize, BTreeMap<(usize, usize), Complex64>> = BTreeMap::new();
    let mut entries = Vec::new();
    for term in &expr.terms {
        let base = layout.offsets[term.var.index];
        for k in 0..term.var.num_params() {
            entries.clear();
            for (pos, value) in term.var.basis_entries(k) {
                term.map
                    .apply_unit(term.var.shape, pos, value * term.coefficient, &mut entries);
            }
            if entries.is_empty() {
                continue;
            }
            let g = columns.entry(base + k).or_default();
            for &(pos, v) in &entries {
                *g.entry(pos).or_insert(Complex64::new(0.0, 0.0)) += v;
            }
        }
    }
    Linearized {
        constant: expr.constant.clone(),
        columns: columns
            .into_iter()
            .map(|(p, g)| {
                let nonzero: Entries = g
                    .into_iter()
                    .filter(|(_, v)| *v != Complex64::new(0.0, 0.0))
                    .collect();
                (p, nonzero)
            })
            .collect(),
    }
}

/// A real scalar expression as `c₀ + Σₚ aₚ pₚ`.
fn linearize_scalar(expr: &ScalarExpr, layout: &Layout) -> (BTreeMap<usize, f64>, f64) {
    let mut coeffs: BTreeMap<usize, f64> = BTreeMap::new();
    let mut constant = expr.constant;
    for (c, e) in &expr.terms {
        let lin = linearize(e, layout);
        constant += inner_product(c, &lin.constant);
        for (p, g) in &lin.columns {
            let value: f64 = g.iter().map(|&((r, k), v)| (c[[r, k]].conj() * v).re).sum();
            *coeffs.entry(*p).or_insert(0.0) += value;
        }
    }
    (coeffs, constant)
}

/// One equality row `Σ aₚ pₚ + σ t = b`.
struct Row {
    coeffs: Vec<(usize, f64)>,
    slack: Option<(usize, f64)>,
    rhs: f64,
}

impl Row {
    fn is_empty(&self) -> bool {
        self.slack.is_none() && self.coeffs.iter().all(|(_, a)| a.abs() < ZERO_ROW_TOL)
    }
}

/// Where the dual of a constraint lives in the solver output.
enum DualLocation {
    Psd {
        size: usize,
        slack: usize,
    },
    Zero {
        shape: (usize, usize),
        hermitian: bool,
        rows: Vec<Option<usize>>,
    },
    ScalarEqual(Option<usize>),
    ScalarInequality(Option<usize>),
}

/// A lowered problem together with the bookkeeping needed to map the
/// solver's answer back.
pub(crate) struct Canonical {
    pub(crate) program: ConicProgram,
    duals: Vec<DualLocation>,
    sense: Sense,
    num_params: usize,
}

#[derive(Default)]
struct Builder {
    rows: Vec<Row>,
    cones: Vec<Cone>,
    slack_dim: usize,
}

impl Builder {
    fn push_slack(&mut self, cone: Cone) -> usize {
        let start = self.slack_dim;
        self.slack_dim += cone.dim();
        self.cones.push(cone);
        start
    }

    /// Append `row` unless it is empty; an empty row must have a zero
    /// right-hand side.
    fn push_row(&mut self, row: Row, label: &str) -> Result<Option<usize>> {
        if row.is_empty() {
            if row.rhs.abs() > INCONSISTENCY_TOL {
                return Err(ModelError::InconsistentConstraint(label.to_string()).into());
            }
            return Ok(None);
        }
        self.rows.push(row);
        Ok(Some(self.rows.len() - 1))
    }
}

/// Positions and values of entry (r, c) of a d × d matrix inside its
/// 2d × 2d real lifting.
fn lifted_positions(d: usize, (r, c): (usize, usize), v: Complex64) -> [(usize, usize, f64); 4] {
    [
        (r, c, v.re),
        (r, c + d, -v.im),
        (r + d, c, v.im),
        (r + d, c + d, v.re),
    ]
}

/// Equality row coefficients keyed by entry (i, j) and whether the row
/// constrains its imaginary part.
type EntryRows = BTreeMap<(usize, usize, bool), BTreeMap<usize, f64>>;

/// Take the row for one part of entry (i, j).
fn entry_row(
    rows: &mut EntryRows,
    constant: &Array2<Complex64>,
    i: usize,
    j: usize,
    imag: bool,
) -> Row {
    let coeffs = rows.remove(&(i, j, imag)).unwrap_or_default();
    let k = constant[[i, j]];
    Row {
        coeffs: coeffs.into_iter().collect(),
        slack: None,
        rhs: -(if imag { k.im } else { k.re }),
    }
}

/// Entry (a, b) of lift(M) for a 2d × 2d lifting of the d × d matrix M.
fn lift_entry(m: &Array2<Complex64>, a: usize, b: usize) -> f64 {
    let d = m.nrows();
    match (a < d, b < d) {
        (true, true) => m[[a, b]].re,
        (true, false) => -m[[a, b - d]].im,
        (false, true) => m[[a - d, b]].im,
        (false, false) => m[[a - d, b - d]].re,
    }
}

pub(crate) fn canonicalize(
    layout: &Layout,
    constraints: &[Constraint],
    objective: &ScalarExpr,
    sense: Sense,
) -> Result<Canonical> {
    let mut builder = Builder::default();
    let mut duals = Vec::with_capacity(constraints.len());

    for (index, constraint) in constraints.iter().enumerate() {
        let label = constraint
            .label
            .clone()
            .unwrap_or_else(|| format!("#{index}"));
        let location = match &constraint.kind {
            ConstraintKind::Psd(expr) => {
                let d = expr.shape().0;
                let lin = linearize(expr, layout);
                let n = 2 * d;
                let slack = builder.push_slack(Cone::Psd(n));
                let mut coeffs: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); n * (n + 1) / 2];
                for (&p, entries) in &lin.columns {
                    for &(pos, v) in entries {
                        for (a, b, x) in lifted_positions(d, pos, v) {
                            if a <= b {
                                let (k, scale) = svec_index(n, a, b);
                                *coeffs[k].entry(p).or_insert(0.0) += scale * x;
                            }
                        }
                    }
                }
                for a in 0..n {
                    for b in a..n {
                        let (k, scale) = svec_index(n, a, b);
                        let row = Row {
                            coeffs: std::mem::take(&mut coeffs[k]).into_iter().collect(),
                            slack: Some((slack + k, -1.0)),
                            rhs: -scale * lift_entry(&lin.constant, a, b),
                        };
                        builder.push_row(row, &label)?;
                    }
                }
                DualLocation::Psd { size: d, slack }
            }
            ConstraintKind::Zero(expr) => {
                let (rows, cols) = expr.shape();
                let hermitian = expr.is_hermitian();
                let lin = linearize(expr, layout);
                let mut entry_rows = EntryRows::new();
                for (&p, entries) in &lin.columns {
                    for &((i, j), v) in entries {
                        if hermitian && i > j {
                            continue;
                        }
                        let re = entry_rows.entry((i, j, false)).or_default();
                        *re.entry(p).or_insert(0.0) += v.re;
                        if !(hermitian && i == j) {
                            let im = entry_rows.entry((i, j, true)).or_default();
                            *im.entry(p).or_insert(0.0) += v.im;
                        }
                    }
                }
                let constant = &lin.constant;
                let mut locations = Vec::new();
                if hermitian {
                    for i in 0..rows {
                        for j in i..cols {
                            let re = entry_row(&mut entry_rows, constant, i, j, false);
                            locations.push(builder.push_row(re, &label)?);
                            if j > i {
                                let im = entry_row(&mut entry_rows, constant, i, j, true);
                                locations.push(builder.push_row(im, &label)?);
                            }
                        }
                    }
                } else {
                    for i in 0..rows {
                        for j in 0..cols {
                            let re = entry_row(&mut entry_rows, constant, i, j, false);
                            locations.push(builder.push_row(re, &label)?);
                            let im = entry_row(&mut entry_rows, constant, i, j, true);
                            locations.push(builder.push_row(im, &label)?);
                        }
                    }
                }
                DualLocation::Zero {
                    shape: (rows, cols),
                    hermitian,
                    rows: locations,
                }
            }
            ConstraintKind::Scalar(expr, relation) => {
                let (coeffs, constant) = linearize_scalar(expr, layout);
                let mut row = Row {
                    coeffs: coeffs.into_iter().collect(),
                    slack: None,
                    rhs: -constant,
                };
                match relation {
                    Relation::Equal => DualLocation::ScalarEqual(builder.push_row(row, &label)?),
                    Relation::LessEq | Relation::GreaterEq => {
                        if row.is_empty() {
                            let violated = match relation {
                                Relation::LessEq => constant > INCONSISTENCY_TOL,
                                _ => constant < -INCONSISTENCY_TOL,
                            };
                            if violated {
                                return Err(ModelError::InconsistentConstraint(label).into());
                            }
                            DualLocation::ScalarInequality(None)
                        } else {
                            let slack = builder.push_slack(Cone::Nonnegative(1));
                            let sign = if *relation == Relation::LessEq { 1.0 } else { -1.0 };
                            row.slack = Some((slack, sign));
                            builder.push_row(row, &label)?;
                            DualLocation::ScalarInequality(Some(slack))
                        }
                    }
                }
            }
        };
        duals.push(location);
    }

    let num_params = layout.num_params;
    let n = num_params + builder.slack_dim;
    let m = builder.rows.len();

    let mut triplets = Vec::new();
    let mut b = Array1::<f64>::zeros(m);
    for (r, row) in builder.rows.iter().enumerate() {
        triplets.extend(
            row.coeffs
                .iter()
                .filter(|(_, v)| *v != 0.0)
                .map(|&(p, v)| (r, p, v)),
        );
        if let Some((t, v)) = row.slack {
            triplets.push((r, num_params + t, v));
        }
        b[r] = row.rhs;
    }
    let a = sparse::from_triplets(m, n, &triplets)?;

    let sign = match sense {
        Sense::Minimize => 1.0,
        Sense::Maximize => -1.0,
    };
    let (obj, constant) = linearize_scalar(objective, layout);
    let mut c = Array1::<f64>::zeros(n);
    for (p, v) in obj {
        c[p] = sign * v;
    }

    let mut cones = Vec::with_capacity(builder.cones.len() + 1);
    if num_params > 0 {
        cones.push(Cone::Free(num_params));
    }
    cones.extend(builder.cones);

    Ok(Canonical {
        program: ConicProgram {
            c,
            offset: sign * constant,
            a,
            b,
            cones,
        },
        duals,
        sense,
        num_params,
    })
}

impl Canonical {
    /// Objective value in the user's sense.
    pub(crate) fn objective_value(&self, solution: &ConicSolution) -> f64 {
        match self.sense {
            Sense::Minimize => solution.primal_objective,
            Sense::Maximize => -solution.primal_objective,
        }
    }

    /// Parameter part of the primal point.
    pub(crate) fn params(&self, solution: &ConicSolution) -> Vec<f64> {
        solution.x.slice(s![..self.num_params]).to_vec()
    }

    /// Dual values in constraint order.
    ///
    /// PSD duals are PSD matrices Λ with `⟨Z, lift(E)⟩ = Re Tr(Λ E)`;
    /// inequality duals are non-negative. Equality duals λ satisfy
    /// `∇objective = Σ λ ∇constraint` in the user's sense.
    pub(crate) fn duals(&self, solution: &ConicSolution) -> Vec<Dual> {
        let sign = match self.sense {
            Sense::Minimize => 1.0,
            Sense::Maximize => -1.0,
        };
        let slack_base = self.num_params;
        let y = |row: &Option<usize>| row.map_or(0.0, |r| sign * solution.y[r]);

        self.duals
            .iter()
            .map(|location| match location {
                DualLocation::Psd { size, slack } => {
                    let n = 2 * size;
                    let start = slack_base + slack;
                    let len = n * (n + 1) / 2;
                    let z = smat(solution.s.slice(s![start..start + len]), n);
                    Dual::Matrix(unlift_hermitian(&z))
                }
                DualLocation::Zero {
                    shape,
                    hermitian,
                    rows,
                } => {
                    let mut lambda = Array2::<Complex64>::zeros(*shape);
                    let mut it = rows.iter();
                    if *hermitian {
                        for i in 0..shape.0 {
                            for j in i..shape.1 {
                                let re = it.next().map_or(0.0, y);
                                if j == i {
                                    lambda[[i, i]] = Complex64::new(re, 0.0);
                                } else {
                                    let im = it.next().map_or(0.0, y);
                                    let v = Complex64::new(re / 2.0, im / 2.0);
                                    lambda[[i, j]] = v;
                                    lambda[[j, i]] = v.conj();
                                }
                            }
                        }
                    } else {
                        for i in 0..shape.0 {
                            for j in 0..shape.1 {
                                let re = it.next().map_or(0.0, y);
                                let im = it.next().map_or(0.0, y);
                                lambda[[i, j]] = Complex64::new(re, im);
                            }
                        }
                    }
                    Dual::Matrix(lambda)
                }
                DualLocation::ScalarEqual(row) => Dual::Scalar(y(row)),
                DualLocation::ScalarInequality(slack) => Dual::Scalar(
                    slack.map_or(0.0, |t| solution.s[slack_base + t]),
                ),
            })
            .collect()
    }
}
