//! Constraint Programming (CP) modeling layer.
//!
//! A solver-agnostic model of integer, boolean and interval variables with
//! the small set of constraints the scheduling formulation needs.
//!
//! # Key Components
//!
//! - **Variables**: [`IntVar`], [`BoolVar`], [`IntervalVar`], referenced by
//!   [`IntVarId`], [`BoolVarId`], [`IntervalId`] handles
//! - **Constraints**: [`Constraint`]: enforced linear ranges, exactly-one,
//!   no-overlap over optional intervals, max-equality
//! - **Model**: [`CpModel`]: arenas of variables, constraints, objective
//! - **Solver**: [`CpSolver`] trait, plus [`BacktrackingSolver`] for small models
//!
//! # Design
//!
//! The model is only a description. Anything that accepts it through
//! [`CpSolver`] can solve it: an adapter around an external engine (OR-Tools,
//! CPLEX) in production, or the bundled exhaustive search in tests.
//!
//! # References
//!
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

mod backtrack;
mod model;
mod solver;
mod variables;

pub use backtrack::BacktrackingSolver;
pub use model::{Constraint, CpModel, ModelError, Objective};
pub use solver::{CpSolution, CpSolver, SolverConfig, SolverStatus};
pub use variables::{BoolVar, BoolVarId, IntVar, IntVarId, IntervalId, IntervalVar, Literal};
