// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Metric result types.

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::SolveStats;

/// Values below this magnitude are shown as zero by [`display_value`].
pub const DISPLAY_ZERO_TOLERANCE: f64 = 1e-6;

/// Map solver noise around zero to exactly zero for display.
///
/// Metric functions return the raw solver value; this is only for
/// presenting it.
pub fn display_value(value: f64) -> f64 {
    if value.abs() < DISPLAY_ZERO_TOLERANCE {
        0.0
    } else {
        value
    }
}

/// Which of the two state exclusion programs to solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExclusionMode {
    /// Minimize over measurements {Mᵢ}
    Primal,
    /// Maximize Tr Y over the dual certificate Y
    #[default]
    Dual,
}

impl fmt::Display for ExclusionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionMode::Primal => write!(f, "primal"),
            ExclusionMode::Dual => write!(f, "dual"),
        }
    }
}

impl FromStr for ExclusionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "primal" => Ok(ExclusionMode::Primal),
            "dual" => Ok(ExclusionMode::Dual),
            other => Err(Error::InvalidInput(format!(
                "unknown exclusion mode '{other}' (expected primal or dual)"
            ))),
        }
    }
}

/// Operators returned with a state exclusion value.
#[derive(Debug, Clone, PartialEq)]
pub enum ExclusionOperators {
    /// Optimal measurement operators of the primal program.
    Measurements(Vec<Array2<Complex64>>),
    /// Dual values of the constraints `Y ⪯ pᵢ|vᵢ⟩⟨vᵢ|`. By complementary
    /// slackness these act as the optimal measurement.
    ConstraintDuals(Vec<Array2<Complex64>>),
}

impl ExclusionOperators {
    /// The operators, one per ensemble member, whichever program produced them.
    pub fn matrices(&self) -> &[Array2<Complex64>] {
        match self {
            ExclusionOperators::Measurements(m) | ExclusionOperators::ConstraintDuals(m) => m,
        }
    }

    /// The program that produced the operators.
    pub fn mode(&self) -> ExclusionMode {
        match self {
            ExclusionOperators::Measurements(_) => ExclusionMode::Primal,
            ExclusionOperators::ConstraintDuals(_) => ExclusionMode::Dual,
        }
    }
}

/// Result of a state exclusion computation.
#[derive(Debug, Clone)]
pub struct ExclusionResult {
    /// Optimal error probability, unclamped
    pub value: f64,
    /// Achieving operators
    pub operators: ExclusionOperators,
    /// Solver diagnostics
    pub stats: SolveStats,
}

impl ExclusionResult {
    /// Shorthand for `self.operators.matrices()`.
    pub fn operators(&self) -> &[Array2<Complex64>] {
        self.operators.matrices()
    }
}

/// Diamond norm distance together with the optimal point of its program.
#[derive(Debug, Clone)]
pub struct DiamondNormReport {
    /// Diamond norm distance, unclamped
    pub value: f64,
    /// Optimal input state ρ (d × d)
    pub rho: Array2<Complex64>,
    /// Optimal W (d² × d²) with W ⪯ I ⊗ ρ
    pub w: Array2<Complex64>,
    /// Solver diagnostics
    pub stats: SolveStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(5e-7), 0.0);
        assert_eq!(display_value(-5e-7), 0.0);
        assert_eq!(display_value(0.25), 0.25);
        assert_eq!(display_value(-0.01), -0.01);
    }

    #[test]
    fn test_exclusion_mode_parse() {
        assert_eq!(ExclusionMode::default(), ExclusionMode::Dual);
        assert_eq!("primal".parse::<ExclusionMode>().unwrap(), ExclusionMode::Primal);
        assert_eq!("DUAL".parse::<ExclusionMode>().unwrap(), ExclusionMode::Dual);
        let err = "sideways".parse::<ExclusionMode>().unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(ExclusionMode::Primal.to_string(), "primal");
    }

    #[test]
    fn test_exclusion_mode_serde() {
        let mode: ExclusionMode = serde_yaml::from_str("primal").unwrap();
        assert_eq!(mode, ExclusionMode::Primal);
    }

    #[test]
    fn test_operators_kind() {
        let ops = ExclusionOperators::ConstraintDuals(vec![Array2::zeros((2, 2))]);
        assert_eq!(ops.mode(), ExclusionMode::Dual);
        assert_eq!(ops.matrices().len(), 1);
        let ops = ExclusionOperators::Measurements(vec![]);
        assert_eq!(ops.mode(), ExclusionMode::Primal);
    }
}
