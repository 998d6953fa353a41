//! Exact scheduling through the CP layer.
//!
//! [`FjspCpBuilder`] turns an [`Instance`](crate::model::Instance) into a
//! [`CpModel`](crate::cp::CpModel); [`ExactSolveDriver`] submits it to any
//! [`CpSolver`](crate::cp::CpSolver) and decodes the assignment into a
//! [`Schedule`](crate::model::Schedule).
//!
//! Outcomes other than a final schedule are reported as [`SolveError`]:
//! an infeasible horizon, a solver stop without proof (with the best
//! schedule found so far, if any), or a rejected model.

mod builder;
mod driver;
mod err;

pub use builder::{DowntimeGuard, FjspCpBuilder, FjspModel, OperationVars, ResourceChoice};
pub use driver::{decode_solution, ExactSolution, ExactSolveDriver};
pub use err::SolveError;
