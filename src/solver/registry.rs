// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Solver registry for selecting conic solvers by name.
//!
//! The registry is a lookup table, not a session: solvers are stateless and
//! handed out as shared `Arc`s.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::admm::AdmmSolver;
use super::ConicSolver;
use crate::error::{Error, Result, SolverError};

/// Thread-safe name → solver table.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use qubit_os_metrics::solver::{AdmmSolver, ConicSolver, SolverRegistry};
///
/// let registry = SolverRegistry::empty();
/// registry.register(Arc::new(AdmmSolver::new()));
///
/// let solver = registry.get("admm").unwrap();
/// assert_eq!(solver.name(), "admm");
/// ```
pub struct SolverRegistry {
    /// Registered solvers
    solvers: RwLock<HashMap<String, Arc<dyn ConicSolver>>>,

    /// Default solver name
    default_solver: RwLock<Option<String>>,
}

impl SolverRegistry {
    /// Create a registry with no solvers.
    pub fn empty() -> Self {
        Self {
            solvers: RwLock::new(HashMap::new()),
            default_solver: RwLock::new(None),
        }
    }

    /// Create a registry holding the built-in [`AdmmSolver`] as default.
    pub fn with_builtin() -> Self {
        let registry = Self::empty();
        registry.register(Arc::new(AdmmSolver::new()));
        registry
    }

    /// Register a solver.
    ///
    /// If a solver with the same name already exists, it will be replaced.
    pub fn register(&self, solver: Arc<dyn ConicSolver>) {
        let name = solver.name().to_string();
        info!(solver = %name, "Registering solver");

        let mut solvers = self.solvers.write();
        solvers.insert(name.clone(), solver);

        // If this is the first solver, make it the default
        let mut default = self.default_solver.write();
        if default.is_none() {
            debug!(solver = %name, "Setting as default solver");
            *default = Some(name);
        }
    }

    /// Set the default solver.
    pub fn set_default(&self, name: &str) -> Result<()> {
        let solvers = self.solvers.read();
        if !solvers.contains_key(name) {
            return Err(Error::Solver(SolverError::NotFound(name.to_string())));
        }

        let mut default = self.default_solver.write();
        *default = Some(name.to_string());
        info!(solver = %name, "Set as default solver");
        Ok(())
    }

    /// Get a solver by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn ConicSolver>> {
        let solvers = self.solvers.read();
        solvers
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Solver(SolverError::NotFound(name.to_string())))
    }

    /// Get the default solver.
    pub fn get_default(&self) -> Result<Arc<dyn ConicSolver>> {
        let default = self.default_solver_name();
        match default {
            Some(name) => self.get(&name),
            None => Err(Error::Solver(SolverError::NotFound(
                "no default solver configured".to_string(),
            ))),
        }
    }

    /// Get a solver by name, or the default if name is None.
    pub fn get_or_default(&self, name: Option<&str>) -> Result<Arc<dyn ConicSolver>> {
        match name {
            Some(n) => self.get(n),
            None => self.get_default(),
        }
    }

    /// List all registered solver names, sorted.
    pub fn list(&self) -> Vec<String> {
        let solvers = self.solvers.read();
        let mut names: Vec<String> = solvers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a solver is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.solvers.read().contains_key(name)
    }

    /// Number of registered solvers.
    pub fn len(&self) -> usize {
        self.solvers.read().len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unregister a solver.
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn ConicSolver>> {
        let mut solvers = self.solvers.write();
        let removed = solvers.remove(name);

        if removed.is_some() {
            info!(solver = %name, "Unregistered solver");

            let mut default = self.default_solver.write();
            if default.as_deref() == Some(name) {
                warn!(solver = %name, "Unregistered default solver");
                *default = None;
            }
        }

        removed
    }

    /// Get the default solver name.
    pub fn default_solver_name(&self) -> Option<String> {
        self.default_solver.read().clone()
    }
}

impl Default for SolverRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl std::fmt::Debug for SolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverRegistry")
            .field("solvers", &self.list())
            .field("default_solver", &self.default_solver_name())
            .finish()
    }
}
