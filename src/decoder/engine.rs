//! Greedy priority decoder.
//!
//! Operations are visited in ascending priority. Each one goes to the
//! candidate machine that frees up first and starts as soon as both that
//! machine and its job are available. Equipment and downtime are not
//! modeled; check the result with [`Schedule::verify`] before using it as
//! a final answer.

use std::cmp::Ordering;

use crate::model::{FlatOperations, Instance, MachineId, Schedule, ScheduledOperation};

use super::err::MalformedInput;

/// Deterministic simulator turning a priority vector into a schedule.
///
/// # Examples
///
/// ```
/// use u_fjsp::decoder::PriorityDecoder;
/// use u_fjsp::model::{InstanceBuilder, OperationSpec};
///
/// let instance = InstanceBuilder::new()
///     .add_job("a", vec![OperationSpec::new(&[1], &[], 2)])
///     .add_job("b", vec![OperationSpec::new(&[1], &[], 3)])
///     .build()
///     .unwrap();
///
/// let decoder = PriorityDecoder::from_instance(&instance);
/// assert_eq!(decoder.makespan(&[0.9, 0.1]).unwrap(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct PriorityDecoder {
    ops: FlatOperations,
}

impl PriorityDecoder {
    pub fn new(ops: FlatOperations) -> Self {
        Self { ops }
    }

    pub fn from_instance(instance: &Instance) -> Self {
        Self::new(instance.flatten())
    }

    #[inline]
    pub fn operations(&self) -> &FlatOperations {
        &self.ops
    }

    /// Length every priority vector must have.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.ops.len()
    }

    /// Indices sorted by ascending priority, ties by index.
    pub fn visiting_order(&self, priorities: &[f64]) -> Result<Vec<usize>, MalformedInput> {
        MalformedInput::check(self.ops.len(), priorities.len())?;
        Ok(sorted_indices(priorities))
    }

    /// Makespan of the decoded schedule, without building it.
    pub fn makespan(&self, priorities: &[f64]) -> Result<i64, MalformedInput> {
        MalformedInput::check(self.ops.len(), priorities.len())?;
        let mut makespan = 0;
        self.simulate(priorities, |_, _, _, end| makespan = makespan.max(end));
        Ok(makespan)
    }

    /// Full schedule, entries in visiting order.
    pub fn decode(&self, priorities: &[f64]) -> Result<Schedule, MalformedInput> {
        MalformedInput::check(self.ops.len(), priorities.len())?;
        let mut schedule = Schedule::with_capacity(self.ops.len());
        self.simulate(priorities, |index, machine, start, end| {
            let op = &self.ops.as_slice()[index];
            schedule.push(ScheduledOperation {
                op_index: index,
                job: op.job,
                sequence: op.sequence,
                machine,
                equipment: None,
                start,
                end,
            });
        });
        tracing::trace!(
            operations = schedule.len(),
            makespan = schedule.makespan(),
            "decoded priority vector"
        );
        Ok(schedule)
    }

    /// Places every operation and reports `(index, machine, start, end)`.
    fn simulate<F>(&self, priorities: &[f64], mut place: F)
    where
        F: FnMut(usize, MachineId, i64, i64),
    {
        let ops = self.ops.as_slice();
        let machines = self.ops.machines();
        let mut machine_avail = vec![0i64; machines.len()];
        let mut job_avail = vec![0i64; self.ops.job_count()];

        for index in sorted_indices(priorities) {
            let op = &ops[index];

            // Slots are sorted, and `min_by_key` keeps the first minimum,
            // so ties go to the lowest machine id.
            let Some(&slot) = op.machine_slots.iter().min_by_key(|&&s| machine_avail[s]) else {
                // unreachable for operations flattened from a valid instance
                continue;
            };

            // bounded by the instance's total duration, which fits in i64
            let start = machine_avail[slot].max(job_avail[op.job.0]);
            let end = start + op.duration;
            machine_avail[slot] = end;
            job_avail[op.job.0] = end;

            place(index, machines[slot], start, end);
        }
    }
}

fn sorted_indices(priorities: &[f64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..priorities.len()).collect();
    indices.sort_by(|&a, &b| match priorities[a].total_cmp(&priorities[b]) {
        Ordering::Equal => a.cmp(&b),
        other => other,
    });
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InstanceBuilder, JobId, OperationSpec, ViolationKind};
    use proptest::prelude::*;

    fn scenario_d() -> Instance {
        InstanceBuilder::new()
            .add_job("a", vec![OperationSpec::new(&[1], &[], 2)])
            .add_job("b", vec![OperationSpec::new(&[1], &[], 3)])
            .build()
            .unwrap()
    }

    #[test]
    fn test_visiting_order() {
        let decoder = PriorityDecoder::from_instance(&scenario_d());
        assert_eq!(decoder.visiting_order(&[0.5, 0.1]).unwrap(), vec![1, 0]);
        assert_eq!(decoder.visiting_order(&[0.3, 0.3]).unwrap(), vec![0, 1]);
        assert_eq!(decoder.visiting_order(&[f64::NAN, 0.0]).unwrap(), vec![1, 0]);
        assert_eq!(decoder.visiting_order(&[0.0, -0.0]).unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_fifo_on_single_machine() {
        let instance = InstanceBuilder::new()
            .add_job("a", vec![OperationSpec::new(&[1], &[], 2)])
            .add_job("b", vec![OperationSpec::new(&[1], &[], 1)])
            .add_job("c", vec![OperationSpec::new(&[1], &[], 4)])
            .build()
            .unwrap();
        let decoder = PriorityDecoder::from_instance(&instance);
        let schedule = decoder.decode(&[0.0, 1.0, 2.0]).unwrap();

        let starts: Vec<(usize, i64, i64)> = schedule
            .entries()
            .iter()
            .map(|e| (e.op_index, e.start, e.end))
            .collect();
        assert_eq!(starts, vec![(0, 0, 2), (1, 2, 3), (2, 3, 7)]);
        assert_eq!(schedule.makespan(), 7);
        assert!(schedule.is_feasible(&instance));
    }

    #[test]
    fn test_lowest_machine_on_tie() {
        let instance = InstanceBuilder::new()
            .add_job("a", vec![OperationSpec::new(&[3, 2], &[], 1)])
            .build()
            .unwrap();
        let decoder = PriorityDecoder::from_instance(&instance);
        let schedule = decoder.decode(&[0.0]).unwrap();
        assert_eq!(schedule.entries()[0].machine, MachineId(2));
    }

    #[test]
    fn test_routes_to_free_machine() {
        let instance = InstanceBuilder::new()
            .add_job("a", vec![OperationSpec::new(&[1, 2], &[], 3)])
            .add_job("b", vec![OperationSpec::new(&[1, 2], &[], 3)])
            .build()
            .unwrap();
        let decoder = PriorityDecoder::from_instance(&instance);
        let schedule = decoder.decode(&[0.0, 0.0]).unwrap();
        assert_eq!(schedule.entries()[0].machine, MachineId(1));
        assert_eq!(schedule.entries()[1].machine, MachineId(2));
        assert_eq!(schedule.makespan(), 3);
    }

    #[test]
    fn test_visiting_order_overrides_job_order() {
        let instance = InstanceBuilder::new()
            .add_job(
                "a",
                vec![OperationSpec::new(&[1], &[], 2), OperationSpec::new(&[2], &[], 2)],
            )
            .build()
            .unwrap();
        let decoder = PriorityDecoder::from_instance(&instance);
        // visiting order wins over job order
        let schedule = decoder.decode(&[0.9, 0.1]).unwrap();
        let first = schedule.entry_for(JobId(0), 1).unwrap();
        let second = schedule.entry_for(JobId(0), 2).unwrap();
        assert_eq!((second.start, second.end), (0, 2));
        assert_eq!((first.start, first.end), (2, 4));
        let kinds: Vec<ViolationKind> =
            schedule.verify(&instance).into_iter().map(|v| v.kind).collect();
        assert_eq!(kinds, vec![ViolationKind::Precedence]);
    }

    #[test]
    fn test_length_mismatch() {
        let decoder = PriorityDecoder::from_instance(&scenario_d());
        assert_eq!(
            decoder.makespan(&[0.1]),
            Err(MalformedInput { expected: 2, actual: 1 })
        );
        assert!(decoder.decode(&[0.1, 0.2, 0.3]).is_err());
    }

    #[test]
    fn test_largest_durations_do_not_overflow() {
        let half = i64::MAX / 2;
        let instance = InstanceBuilder::new()
            .add_job("a", vec![OperationSpec::new(&[1], &[], half)])
            .add_job("b", vec![OperationSpec::new(&[1], &[], half)])
            .with_horizon(i64::MAX)
            .build()
            .unwrap();
        let decoder = PriorityDecoder::from_instance(&instance);
        assert_eq!(decoder.makespan(&[0.0, 1.0]).unwrap(), i64::MAX - 1);
        assert_eq!(decoder.makespan(&[1.0, 0.0]).unwrap(), i64::MAX - 1);
    }

    #[test]
    fn test_empty_instance() {
        let instance = InstanceBuilder::new().with_horizon(1).build().unwrap();
        let decoder = PriorityDecoder::from_instance(&instance);
        assert_eq!(decoder.makespan(&[]).unwrap(), 0);
        assert!(decoder.decode(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_ignores_equipment_and_downtime() {
        let instance = InstanceBuilder::new()
            .add_job("a", vec![OperationSpec::new(&[1], &[5], 2)])
            .add_job("b", vec![OperationSpec::new(&[2], &[5], 2)])
            .add_downtime(1, 0, 1)
            .build()
            .unwrap();
        let decoder = PriorityDecoder::from_instance(&instance);
        let schedule = decoder.decode(&[0.0, 1.0]).unwrap();
        assert_eq!(schedule.makespan(), 2);

        let kinds: Vec<ViolationKind> =
            schedule.verify(&instance).into_iter().map(|v| v.kind).collect();
        assert!(kinds.contains(&ViolationKind::MissingEquipment));
        assert!(kinds.contains(&ViolationKind::Downtime));
    }

    proptest! {
        #[test]
        fn prop_scenario_d_makespan(p in proptest::collection::vec(any::<f64>(), 2)) {
            let decoder = PriorityDecoder::from_instance(&scenario_d());
            prop_assert_eq!(decoder.makespan(&p).unwrap(), 5);
        }

        #[test]
        fn prop_decode_is_deterministic(p in proptest::collection::vec(-10.0f64..10.0, 4)) {
            let instance = InstanceBuilder::new()
                .add_job("a", vec![OperationSpec::new(&[1, 2], &[], 2), OperationSpec::new(&[2], &[], 1)])
                .add_job("b", vec![OperationSpec::new(&[1], &[], 3), OperationSpec::new(&[1, 2], &[], 2)])
                .build()
                .unwrap();
            let decoder = PriorityDecoder::from_instance(&instance);
            let first = decoder.decode(&p).unwrap();
            let second = decoder.decode(&p).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(decoder.makespan(&p).unwrap(), first.makespan());
        }
    }
}
