//! Scheduling domain model.
//!
//! - [`Instance`]: jobs, machine downtimes, horizon (built via [`InstanceBuilder`])
//! - [`Job`] / [`Operation`]: ordered work with alternative machines and equipment
//! - [`FlatOperations`]: stable flat view indexed by priority vectors
//! - [`Schedule`]: the output of both solving strategies, with [`Schedule::verify`]
//!
//! # Time Model
//! Times are plain integers in the instance's own unit. Downtime windows are
//! half-open `[start, end)`.

mod err;
mod flatten;
mod instance;
mod schedule;
mod types;

pub use err::MalformedInstance;
pub use flatten::{FlatOperation, FlatOperations};
pub use instance::{Instance, InstanceBuilder, OperationSpec, RawInstance};
pub use schedule::{GanttRecord, Schedule, ScheduledOperation, Violation, ViolationKind};
pub use types::{DowntimeWindow, EquipmentId, Job, JobId, MachineId, Operation};
