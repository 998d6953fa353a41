//! CP formulation of the flexible job shop.
//!
//! Per operation:
//! - `start`, `end` in `[0, horizon]` with `end = start + duration`
//! - one presence literal and one optional interval per candidate machine,
//!   and per candidate equipment
//! - exactly one machine, and exactly one equipment when any is required
//! - one side literal per (candidate machine, downtime window): when the
//!   machine is chosen, the operation ends before the window or starts
//!   after it
//!
//! Globally: no-overlap per machine and per equipment, job precedence,
//! `makespan = max(end)`, minimize `makespan`.
//!
//! # Reference
//! Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling"

use std::collections::BTreeMap;

use crate::cp::{BoolVarId, CpModel, IntVarId, IntervalId};
use crate::model::{DowntimeWindow, EquipmentId, Instance, JobId, MachineId};

/// A resource an operation may use, with its presence literal and interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceChoice<R> {
    pub resource: R,
    pub presence: BoolVarId,
    pub interval: IntervalId,
}

/// Side literal of one (operation, machine, downtime window) triple.
///
/// `before = true` means the operation ends at or before `window.start`;
/// `false` means it starts at or after `window.end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DowntimeGuard {
    pub machine: MachineId,
    pub window: DowntimeWindow,
    pub before: BoolVarId,
}

/// Variables of one operation.
#[derive(Debug, Clone)]
pub struct OperationVars {
    /// Position in the flattened operation sequence.
    pub op_index: usize,
    pub job: JobId,
    pub sequence: usize,
    pub duration: i64,
    pub start: IntVarId,
    pub end: IntVarId,
    pub machines: Vec<ResourceChoice<MachineId>>,
    pub equipment: Vec<ResourceChoice<EquipmentId>>,
    pub downtime_guards: Vec<DowntimeGuard>,
}

/// A built model together with the handles needed to decode it.
#[derive(Debug, Clone)]
pub struct FjspModel {
    pub model: CpModel,
    pub operations: Vec<OperationVars>,
    pub makespan: IntVarId,
    pub horizon: i64,
}

/// Builds the CP model of an [`Instance`].
///
/// # Example
/// ```
/// use u_fjsp::exact::FjspCpBuilder;
/// use u_fjsp::model::{InstanceBuilder, OperationSpec};
///
/// let instance = InstanceBuilder::new()
///     .add_job("job_1", vec![OperationSpec::new(&[1], &[], 1)])
///     .add_job("job_2", vec![OperationSpec::new(&[1], &[], 1)])
///     .with_horizon(2)
///     .build()
///     .unwrap();
///
/// let built = FjspCpBuilder::new(&instance).build();
/// assert_eq!(built.operations.len(), 2);
/// assert_eq!(built.model.interval_count(), 2);
/// ```
pub struct FjspCpBuilder<'a> {
    instance: &'a Instance,
    horizon: i64,
}

impl<'a> FjspCpBuilder<'a> {
    pub fn new(instance: &'a Instance) -> Self {
        Self {
            instance,
            horizon: instance.horizon(),
        }
    }

    /// Overrides the instance horizon (e.g. to retry after `Infeasible`).
    pub fn with_horizon(mut self, horizon: i64) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn build(&self) -> FjspModel {
        let horizon = self.horizon;
        let mut model = CpModel::new("fjsp", horizon);
        let mut operations: Vec<OperationVars> = Vec::with_capacity(self.instance.operation_count());

        let mut machine_intervals: BTreeMap<MachineId, Vec<IntervalId>> = BTreeMap::new();
        let mut equipment_intervals: BTreeMap<EquipmentId, Vec<IntervalId>> = BTreeMap::new();

        for job in self.instance.jobs() {
            let mut prev_end: Option<IntVarId> = None;

            for op in job.operations() {
                let tag = format!("{}#{}", job.name(), op.sequence());
                let duration = op.duration();

                let start = model.new_int_var(format!("start[{tag}]"), 0, horizon);
                let end = model.new_int_var(format!("end[{tag}]"), 0, horizon);
                model.add_linear(vec![(1, end), (-1, start)], duration, duration);

                let mut machines = Vec::with_capacity(op.machines().len());
                let mut downtime_guards = Vec::new();
                for &m in op.machines() {
                    let presence = model.new_bool_var(format!("on[{tag},{m}]"));
                    let interval = model.new_optional_interval(
                        format!("iv[{tag},{m}]"),
                        start,
                        end,
                        duration,
                        presence,
                    );
                    machine_intervals.entry(m).or_default().push(interval);
                    machines.push(ResourceChoice {
                        resource: m,
                        presence,
                        interval,
                    });

                    for &window in self.instance.downtimes(m) {
                        let before = model.new_bool_var(format!(
                            "before[{tag},{m},{}..{}]",
                            window.start, window.end
                        ));
                        model.add_linear_if(
                            vec![(1, end)],
                            i64::MIN,
                            window.start,
                            vec![presence.lit(), before.lit()],
                        );
                        model.add_linear_if(
                            vec![(1, start)],
                            window.end,
                            i64::MAX,
                            vec![presence.lit(), !before],
                        );
                        downtime_guards.push(DowntimeGuard {
                            machine: m,
                            window,
                            before,
                        });
                    }
                }
                model.add_exactly_one(machines.iter().map(|c| c.presence.lit()).collect());

                let mut equipment = Vec::with_capacity(op.equipment().len());
                for &e in op.equipment() {
                    let presence = model.new_bool_var(format!("use[{tag},{e}]"));
                    let interval = model.new_optional_interval(
                        format!("iv[{tag},{e}]"),
                        start,
                        end,
                        duration,
                        presence,
                    );
                    equipment_intervals.entry(e).or_default().push(interval);
                    equipment.push(ResourceChoice {
                        resource: e,
                        presence,
                        interval,
                    });
                }
                if !equipment.is_empty() {
                    model.add_exactly_one(equipment.iter().map(|c| c.presence.lit()).collect());
                }

                if let Some(prev) = prev_end {
                    model.add_precedence(prev, start, 0);
                }
                prev_end = Some(end);

                operations.push(OperationVars {
                    op_index: operations.len(),
                    job: job.id(),
                    sequence: op.sequence(),
                    duration,
                    start,
                    end,
                    machines,
                    equipment,
                    downtime_guards,
                });
            }
        }

        for intervals in machine_intervals.into_values().chain(equipment_intervals.into_values()) {
            if intervals.len() > 1 {
                model.add_no_overlap(intervals);
            }
        }

        let makespan = model.new_int_var("makespan", 0, horizon);
        if operations.is_empty() {
            model.add_linear(vec![(1, makespan)], 0, 0);
        } else {
            model.add_max_equality(makespan, operations.iter().map(|o| o.end).collect());
        }
        model.minimize(makespan);

        tracing::debug!(
            operations = operations.len(),
            horizon,
            ints = model.int_var_count(),
            bools = model.bool_var_count(),
            intervals = model.interval_count(),
            constraints = model.constraint_count(),
            "built fjsp model"
        );

        FjspModel {
            model,
            operations,
            makespan,
            horizon,
        }
    }
}
