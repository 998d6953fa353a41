//! Flexible job-shop scheduling (FJSP) with equipment and machine downtime.
//!
//! Jobs are ordered sequences of operations. Each operation may run on any
//! of several machines, may need one of several pieces of equipment, and
//! cannot overlap a downtime window of the machine it runs on. The goal is
//! the shortest makespan.
//!
//! Two paths share one domain model:
//!
//! - **Exact**: [`exact::FjspCpBuilder`] writes the problem as a CP model
//!   (optional intervals, enforced linear constraints, no-overlap) and
//!   [`exact::ExactSolveDriver`] solves it through any [`cp::CpSolver`].
//! - **Heuristic**: [`decoder::PriorityDecoder`] turns a priority vector
//!   into a schedule greedily; [`decoder::MakespanEvaluator`] exposes it as
//!   an objective for random-key metaheuristics.
//!
//! # Modules
//!
//! - [`model`]: instances, flattening, schedules and their verification
//! - [`cp`]: solver-agnostic CP modeling layer and a reference solver
//! - [`exact`]: the CP formulation and its driver
//! - [`decoder`]: the priority decoder and its evaluation adapter
//!
//! # Example
//!
//! ```
//! use u_fjsp::cp::BacktrackingSolver;
//! use u_fjsp::decoder::{MakespanEvaluator, PriorityObjective};
//! use u_fjsp::exact::ExactSolveDriver;
//! use u_fjsp::model::{InstanceBuilder, OperationSpec};
//!
//! let instance = InstanceBuilder::new()
//!     .add_job("job_1", vec![OperationSpec::new(&[1], &[1], 1), OperationSpec::new(&[1], &[2], 1)])
//!     .add_job("job_2", vec![OperationSpec::new(&[2], &[1], 1), OperationSpec::new(&[2], &[2], 1)])
//!     .with_horizon(3)
//!     .build()
//!     .unwrap();
//!
//! let exact = ExactSolveDriver::new(BacktrackingSolver::new()).solve(&instance).unwrap();
//! assert_eq!(exact.makespan, 2);
//! assert!(exact.schedule.is_feasible(&instance));
//!
//! let evaluator = MakespanEvaluator::new(&instance);
//! assert_eq!(evaluator.evaluate(&[0.0, 0.1, 0.2, 0.3]).unwrap(), 2.0);
//! ```

pub mod cp;
pub mod decoder;
pub mod exact;
pub mod model;
