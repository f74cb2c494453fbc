// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Distinguishability metrics computed by semidefinite programming.
//!
//! Every computation follows the same pipeline: validate the inputs, build a
//! fresh [`Problem`](crate::model::Problem), solve it with the engine's
//! solver and read the result off the solution.
//!
//! - [`MetricEngine::diamond_norm`]: diamond norm distance between channels
//! - [`MetricEngine::state_exclusion`]: optimal state exclusion, primal or dual
//!
//! The free functions [`diamond_norm`] and [`state_exclusion`] use a default
//! engine (built-in solver, default settings and limits).

pub mod diamond;
pub mod engine;
pub mod exclusion;
pub mod types;

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::error::Result;

pub use engine::MetricEngine;
pub use types::{
    display_value, DiamondNormReport, ExclusionMode, ExclusionOperators, ExclusionResult,
    DISPLAY_ZERO_TOLERANCE,
};

/// Diamond norm distance between the channels with Choi matrices `choi_1`
/// and `choi_2`, using a default [`MetricEngine`].
///
/// To pick another registered solver, build an engine with
/// [`MetricEngine::with_solver`] and call [`MetricEngine::diamond_norm`].
///
/// # Example
///
/// ```
/// use ndarray::Array2;
/// use num_complex::Complex64;
/// use qubit_os_metrics::metrics::diamond_norm;
///
/// // Identity channel on a qubit: |Ω⟩⟨Ω| with Ω = |00⟩ + |11⟩
/// let mut j = Array2::<Complex64>::zeros((4, 4));
/// for (r, c) in [(0, 0), (0, 3), (3, 0), (3, 3)] {
///     j[[r, c]] = Complex64::new(1.0, 0.0);
/// }
/// let distance = diamond_norm(&j, &j)?;
/// assert!(distance.abs() < 1e-5);
/// # Ok::<(), qubit_os_metrics::Error>(())
/// ```
pub fn diamond_norm(choi_1: &Array2<Complex64>, choi_2: &Array2<Complex64>) -> Result<f64> {
    MetricEngine::default().diamond_norm(choi_1, choi_2)
}

/// State exclusion for the ensemble `vectors` with probabilities `probs`
/// (uniform if `None`), using a default [`MetricEngine`].
///
/// This always uses the built-in solver. To pick another registered solver,
/// build an engine with [`MetricEngine::with_solver`] and call
/// [`MetricEngine::state_exclusion`].
pub fn state_exclusion(
    vectors: &[Array1<Complex64>],
    probs: Option<&[f64]>,
    mode: ExclusionMode,
) -> Result<ExclusionResult> {
    MetricEngine::default().state_exclusion(vectors, probs, mode)
}
