// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configurable entry point shared by the metric computations.

use std::sync::Arc;

use crate::config::{Config, ResourceLimits};
use crate::error::Result;
use crate::solver::{ConicSolver, SolverRegistry, SolverSettings};

/// Solver selection, settings and limits used by every metric call.
///
/// Each call builds and solves its own problem; the engine holds no state
/// between calls and can be shared freely.
///
/// # Example
///
/// ```
/// use qubit_os_metrics::metrics::MetricEngine;
/// use qubit_os_metrics::solver::SolverSettings;
///
/// let engine = MetricEngine::new().with_settings(SolverSettings {
///     tolerance: 1e-6,
///     ..SolverSettings::default()
/// });
/// assert_eq!(engine.settings().tolerance, 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct MetricEngine {
    registry: Arc<SolverRegistry>,
    solver: Option<String>,
    settings: SolverSettings,
    limits: ResourceLimits,
}

impl MetricEngine {
    /// Engine using the built-in solver with default settings and limits.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(SolverRegistry::with_builtin()),
            solver: None,
            settings: SolverSettings::default(),
            limits: ResourceLimits::default(),
        }
    }

    /// Engine configured from a validated [`Config`].
    ///
    /// Fails if the configured solver is not registered.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let engine = Self::new()
            .with_solver(config.solver.name.clone())
            .with_settings(config.solver.settings.clone())
            .with_limits(config.limits.clone());
        engine.solver()?;
        Ok(engine)
    }

    /// Use a different solver registry.
    pub fn with_registry(mut self, registry: Arc<SolverRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Select a solver by registry name instead of the registry default.
    pub fn with_solver(mut self, name: impl Into<String>) -> Self {
        self.solver = Some(name.into());
        self
    }

    pub fn with_settings(mut self, settings: SolverSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn registry(&self) -> &Arc<SolverRegistry> {
        &self.registry
    }

    /// Explicitly selected solver name, if any.
    pub fn solver_name(&self) -> Option<&str> {
        self.solver.as_deref()
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Look up the solver this engine will use.
    pub fn solver(&self) -> Result<Arc<dyn ConicSolver>> {
        self.registry.get_or_default(self.solver.as_deref())
    }
}

impl Default for MetricEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, SolverError};
    use crate::test_utils::FailingSolver;

    #[test]
    fn test_default_engine_uses_builtin() {
        let engine = MetricEngine::default();
        assert!(engine.solver_name().is_none());
        assert_eq!(engine.solver().unwrap().name(), "admm");
        assert_eq!(engine.limits(), &ResourceLimits::default());
    }

    #[test]
    fn test_with_solver_selects_by_name() {
        let registry = Arc::new(SolverRegistry::with_builtin());
        registry.register(FailingSolver::arc("broken"));
        let engine = MetricEngine::new()
            .with_registry(registry)
            .with_solver("broken");
        assert_eq!(engine.solver_name(), Some("broken"));
        assert_eq!(engine.solver().unwrap().name(), "broken");
    }

    #[test]
    fn test_unknown_solver() {
        let engine = MetricEngine::new().with_solver("mosek");
        let err = engine.solver().err().unwrap();
        assert!(matches!(err, Error::Solver(SolverError::NotFound(_))));
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.solver.settings.max_iterations = 777;
        config.limits.max_dimension = 3;
        let engine = MetricEngine::from_config(&config).unwrap();
        assert_eq!(engine.solver_name(), Some("admm"));
        assert_eq!(engine.settings().max_iterations, 777);
        assert_eq!(engine.limits().max_dimension, 3);
    }

    #[test]
    fn test_from_config_rejects_unknown_solver() {
        let mut config = Config::default();
        config.solver.name = "scs".into();
        assert!(MetricEngine::from_config(&config).is_err());

        let mut config = Config::default();
        config.solver.settings.tolerance = 0.0;
        assert!(matches!(
            MetricEngine::from_config(&config),
            Err(Error::Config(_))
        ));
    }
}
