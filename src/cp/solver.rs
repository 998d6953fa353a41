//! CP solver interface.

use std::time::Duration;

use super::model::CpModel;
use super::variables::{BoolVarId, IntVarId, Literal};

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible (but not necessarily optimal) solution found.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// Model is invalid or malformed.
    ModelInvalid,
    /// Solver exceeded its time limit. An incumbent may still be attached.
    Timeout,
    /// No proof either way for reasons other than the time limit.
    Unknown,
}

/// Solution from a CP solver.
///
/// Values are indexed by variable handle. They are populated for
/// `Optimal`/`Feasible`, and for `Timeout`/`Unknown` when the solver
/// found an incumbent before stopping.
#[derive(Debug, Clone)]
pub struct CpSolution {
    pub status: SolverStatus,
    /// Objective value of the attached assignment, if any.
    pub objective_value: Option<i64>,
    pub int_values: Vec<i64>,
    pub bool_values: Vec<bool>,
    /// Solve time in milliseconds.
    pub solve_time_ms: i64,
}

impl CpSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            objective_value: None,
            int_values: Vec::new(),
            bool_values: Vec::new(),
            solve_time_ms: 0,
        }
    }

    /// Whether a feasible solution was found and proven or accepted.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolverStatus::Optimal | SolverStatus::Feasible)
    }

    /// Whether variable values are attached (possibly as a non-final incumbent).
    pub fn has_assignment(&self) -> bool {
        !self.int_values.is_empty() || !self.bool_values.is_empty()
    }

    #[inline]
    pub fn value(&self, var: IntVarId) -> Option<i64> {
        self.int_values.get(var.index()).copied()
    }

    #[inline]
    pub fn bool_value(&self, var: BoolVarId) -> Option<bool> {
        self.bool_values.get(var.index()).copied()
    }

    #[inline]
    pub fn literal_value(&self, lit: Literal) -> Option<bool> {
        self.bool_value(lit.var).map(|v| lit.eval(v))
    }
}

/// Solver configuration.
///
/// # Examples
///
/// ```
/// use u_fjsp::cp::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_time_limit_ms(5_000)
///     .with_stop_after_first(true);
/// assert_eq!(config.time_limit(), Some(std::time::Duration::from_secs(5)));
/// ```
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Wall-clock budget in milliseconds. `None` means unbounded.
    pub time_limit_ms: Option<u64>,
    /// Stop after finding the first feasible solution.
    pub stop_after_first: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: Some(60_000),
            stop_after_first: false,
        }
    }
}

impl SolverConfig {
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn without_time_limit(mut self) -> Self {
        self.time_limit_ms = None;
        self
    }

    pub fn with_stop_after_first(mut self, stop: bool) -> Self {
        self.stop_after_first = stop;
        self
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}

/// Trait for CP solver implementations.
///
/// This is the whole contract the scheduling layers rely on: hand over a
/// model and a budget, get back a status and, when available, values for
/// every variable. Production deployments wrap an external solver (e.g.
/// OR-Tools CP-SAT); [`super::BacktrackingSolver`] covers small models and
/// tests.
pub trait CpSolver {
    /// Solves the model and returns a solution.
    ///
    /// Must return within the configured time limit (plus bookkeeping) and
    /// report `Timeout` instead of blocking.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}
