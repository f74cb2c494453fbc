// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Input validation for the metric engines.
//!
//! Every check here runs before any optimization problem is built.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::config::ResourceLimits;
use crate::error::{Error, Result, ValidationError};
use crate::linalg::perfect_sqrt;

/// Allowed deviation of a probability vector's sum from 1.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Validate a pair of Choi matrices and return the channel dimension d
/// (both matrices are d² × d²).
pub fn validate_choi_pair(choi_1: &Array2<Complex64>, choi_2: &Array2<Complex64>) -> Result<usize> {
    for choi in [choi_1, choi_2] {
        let (rows, cols) = choi.dim();
        if rows != cols {
            return Err(Error::NotSquare { rows, cols });
        }
    }
    if choi_1.dim() != choi_2.dim() {
        return Err(Error::mismatch(
            "Choi matrices",
            format!("{:?}", choi_1.dim()),
            format!("{:?}", choi_2.dim()),
        ));
    }

    let side = choi_1.nrows();
    let dim = match perfect_sqrt(side) {
        Some(d) if d > 0 => d,
        _ => {
            return Err(Error::InvalidDimension(format!(
                "Choi matrix side {side} is not the square of a positive integer"
            )))
        }
    };

    for (name, choi) in [("choi_1", choi_1), ("choi_2", choi_2)] {
        if let Some(((i, j), _)) = choi
            .indexed_iter()
            .find(|(_, z)| !(z.re.is_finite() && z.im.is_finite()))
        {
            return Err(Error::InvalidInput(format!(
                "{name} has a non-finite entry at ({i}, {j})"
            )));
        }
    }

    Ok(dim)
}

/// Validate an ensemble of state vectors and return their common dimension.
///
/// Vectors are used as given; they are not normalized.
pub fn validate_ensemble(vectors: &[Array1<Complex64>]) -> Result<usize> {
    let first = vectors
        .first()
        .ok_or_else(|| Error::InvalidInput("ensemble must contain at least one state".into()))?;
    let dim = first.len();
    if dim == 0 {
        return Err(Error::InvalidDimension("state vectors must be non-empty".into()));
    }

    for (k, v) in vectors.iter().enumerate() {
        if v.len() != dim {
            return Err(Error::mismatch(
                format!("state vector {k}"),
                dim,
                v.len(),
            ));
        }
        if v.iter().any(|z| !(z.re.is_finite() && z.im.is_finite())) {
            return Err(Error::InvalidInput(format!(
                "state vector {k} has a non-finite entry"
            )));
        }
    }
    Ok(dim)
}

/// Return the probabilities to use for an ensemble of `count` states.
///
/// `None` means uniform over the number of states. Given probabilities must
/// have one entry per state, be finite and non-negative, and sum to 1.
pub fn resolve_probabilities(probs: Option<&[f64]>, count: usize) -> Result<Vec<f64>> {
    let Some(probs) = probs else {
        return Ok(vec![1.0 / count as f64; count]);
    };

    if probs.len() != count {
        return Err(Error::mismatch("probabilities", count, probs.len()));
    }
    if let Some((k, p)) = probs
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p < 0.0)
    {
        return Err(Error::InvalidInput(format!(
            "probability {k} must be a finite non-negative number, got {p}"
        )));
    }
    let sum: f64 = probs.iter().sum();
    if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
        return Err(Error::InvalidInput(format!(
            "probabilities must sum to 1, got {sum}"
        )));
    }
    Ok(probs.to_vec())
}

/// Reject Hilbert space dimensions above the configured limit.
pub fn check_dimension_limit(dim: usize, limits: &ResourceLimits) -> Result<()> {
    if dim > limits.max_dimension as usize {
        return Err(ValidationError::ResourceLimit {
            resource: "dimension".into(),
            limit: limits.max_dimension as u64,
            requested: dim as u64,
        }
        .into());
    }
    Ok(())
}

/// Reject ensembles above the configured size limit.
pub fn check_ensemble_limit(count: usize, limits: &ResourceLimits) -> Result<()> {
    if count > limits.max_ensemble_size as usize {
        return Err(ValidationError::ResourceLimit {
            resource: "ensemble_size".into(),
            limit: limits.max_ensemble_size as u64,
            requested: count as u64,
        }
        .into());
    }
    Ok(())
}
