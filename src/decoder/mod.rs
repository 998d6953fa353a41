//! Priority-driven heuristic path.
//!
//! [`PriorityDecoder`] simulates a greedy dispatcher over the flattened
//! operations; [`MakespanEvaluator`] wraps it as a [`PriorityObjective`]
//! for an external metaheuristic (random keys, swarm positions, ...).
//!
//! The decoder routes machines and respects job availability only.
//! Equipment and downtime are left to [`Schedule::verify`](crate::model::Schedule::verify).
//!
//! # References
//!
//! Bean (1994), "Genetics and Random Keys for Sequencing and Optimization"

mod engine;
mod err;
mod evaluator;

pub use engine::PriorityDecoder;
pub use err::MalformedInput;
pub use evaluator::{MakespanEvaluator, PriorityObjective};
