// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management for the metric engines.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. metrics.yaml file
//! 3. Environment variables (QUBITOS_*)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::solver::{AdmmSolver, SolverSettings};

/// Default configuration file locations, tried in order.
const DEFAULT_PATHS: [&str; 3] = ["metrics.yaml", "metrics.yml", "/etc/qubitos/metrics.yaml"];

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Solver selection and tunables
    #[serde(default)]
    pub solver: SolverConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Resource limits
    #[serde(default)]
    pub limits: ResourceLimits,
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        // Load from file if specified
        if let Some(path) = config_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                config = serde_yaml::from_str(&content)?;
            }
        } else {
            // Try default locations
            for path in DEFAULT_PATHS {
                let path = Path::new(path);
                if path.exists() {
                    let content = std::fs::read_to_string(path)?;
                    config = serde_yaml::from_str(&content)?;
                    break;
                }
            }
        }

        // Override with environment variables
        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("QUBITOS_METRICS_SOLVER") {
            self.solver.name = val;
        }
        if let Ok(val) = env::var("QUBITOS_METRICS_MAX_ITERATIONS") {
            if let Ok(n) = val.parse() {
                self.solver.settings.max_iterations = n;
            }
        }
        if let Ok(val) = env::var("QUBITOS_METRICS_TOLERANCE") {
            if let Ok(tol) = val.parse() {
                self.solver.settings.tolerance = tol;
            }
        }
        if let Ok(val) = env::var("QUBITOS_METRICS_TIME_LIMIT_SEC") {
            match val.parse::<f64>() {
                Ok(secs) if secs.is_finite() && secs > 0.0 => {
                    self.solver.settings.time_limit = Some(Duration::from_secs_f64(secs));
                }
                _ => tracing::warn!(value = %val, "Ignoring invalid QUBITOS_METRICS_TIME_LIMIT_SEC"),
            }
        }
        if let Ok(val) = env::var("QUBITOS_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("QUBITOS_LOG_FORMAT") {
            self.logging.format = val;
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.solver.name.trim().is_empty() {
            return Err(Error::Config("solver name cannot be empty".into()));
        }
        let settings = &self.solver.settings;
        if settings.max_iterations == 0 {
            return Err(Error::Config("max_iterations must be positive".into()));
        }
        if !(settings.tolerance.is_finite() && settings.tolerance > 0.0) {
            return Err(Error::Config(format!(
                "tolerance must be positive, got {}",
                settings.tolerance
            )));
        }
        if !(settings.initial_penalty.is_finite() && settings.initial_penalty > 0.0) {
            return Err(Error::Config(format!(
                "initial_penalty must be positive, got {}",
                settings.initial_penalty
            )));
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(Error::Config(format!(
                "unknown log format '{}' (expected json or pretty)",
                self.logging.format
            )));
        }
        if self.limits.max_dimension == 0 || self.limits.max_ensemble_size == 0 {
            return Err(Error::Config("resource limits must be positive".into()));
        }
        Ok(())
    }
}

/// Solver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Registry name of the solver used by the engines
    #[serde(default = "default_solver_name")]
    pub name: String,

    /// Tunables passed to every solve
    #[serde(default)]
    pub settings: SolverSettings,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            name: default_solver_name(),
            settings: SolverSettings::default(),
        }
    }
}

fn default_solver_name() -> String {
    AdmmSolver::NAME.into()
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "json".into()
}

/// Resource limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Maximum Hilbert space dimension d (Choi matrices are d² × d²)
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,

    /// Maximum number of states in an exclusion ensemble
    #[serde(default = "default_max_ensemble_size")]
    pub max_ensemble_size: u32,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
            max_ensemble_size: default_max_ensemble_size(),
        }
    }
}

fn default_max_dimension() -> u32 {
    4
}

fn default_max_ensemble_size() -> u32 {
    64
}
