//! Schedule (solution) model and feasibility checks.
//!
//! A schedule assigns every operation a start time, a machine and, when the
//! operation requires it, one piece of equipment. Schedules produced by the
//! exact path are feasible by construction; schedules produced by the
//! priority decoder ignore equipment and downtime, and [`Schedule::verify`]
//! is how a caller finds out.

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::instance::Instance;
use super::types::{EquipmentId, JobId, MachineId};

/// An operation placed on a machine at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduledOperation {
    /// Position in the flattened operation sequence.
    pub op_index: usize,
    pub job: JobId,
    /// 1-based position inside the job.
    pub sequence: usize,
    pub machine: MachineId,
    pub equipment: Option<EquipmentId>,
    pub start: i64,
    pub end: i64,
}

impl ScheduledOperation {
    #[inline]
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    #[inline]
    fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A record for external Gantt rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GanttRecord {
    pub job: String,
    pub machine: MachineId,
    pub start: i64,
    pub end: i64,
    pub duration: i64,
}

/// A complete schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Schedule {
    entries: Vec<ScheduledOperation>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            entries: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, entry: ScheduledOperation) {
        self.entries.push(entry);
    }

    #[inline]
    pub fn entries(&self) -> &[ScheduledOperation] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Latest end time, 0 for an empty schedule.
    pub fn makespan(&self) -> i64 {
        self.entries.iter().map(|e| e.end).max().unwrap_or(0)
    }

    /// Entry of operation `sequence` of `job`.
    pub fn entry_for(&self, job: JobId, sequence: usize) -> Option<&ScheduledOperation> {
        self.entries
            .iter()
            .find(|e| e.job == job && e.sequence == sequence)
    }

    /// Records for Gantt rendering, sorted by start then machine.
    pub fn gantt_records(&self, instance: &Instance) -> Vec<GanttRecord> {
        let mut records: Vec<GanttRecord> = self
            .entries
            .iter()
            .map(|e| GanttRecord {
                job: instance
                    .job(e.job)
                    .map(|j| j.name().to_string())
                    .unwrap_or_else(|| e.job.to_string()),
                machine: e.machine,
                start: e.start,
                end: e.end,
                duration: e.duration(),
            })
            .collect();
        records.sort_by(|a, b| (a.start, a.machine).cmp(&(b.start, b.machine)));
        records
    }

    /// Checks every feasibility rule against `instance`.
    ///
    /// Returns all violations found; an empty list means the schedule is valid.
    pub fn verify(&self, instance: &Instance) -> Vec<Violation> {
        let mut violations = Vec::new();

        let mut by_key: HashMap<(JobId, usize), Vec<&ScheduledOperation>> = HashMap::new();
        for e in &self.entries {
            by_key.entry((e.job, e.sequence)).or_default().push(e);
        }

        for job in instance.jobs() {
            let mut prev: Option<&ScheduledOperation> = None;
            for op in job.operations() {
                let key = (job.id(), op.sequence());
                let entry = match by_key.get(&key).map(Vec::as_slice) {
                    Some([e]) => *e,
                    Some([]) | None => {
                        violations.push(Violation::new(
                            ViolationKind::Unscheduled,
                            format!("{} #{} is not scheduled", job.name(), op.sequence()),
                        ));
                        prev = None;
                        continue;
                    }
                    Some([e, ..]) => {
                        violations.push(Violation::new(
                            ViolationKind::ScheduledTwice,
                            format!("{} #{} is scheduled more than once", job.name(), op.sequence()),
                        ));
                        *e
                    }
                };

                if entry.start < 0 {
                    violations.push(Violation::new(
                        ViolationKind::NegativeStart,
                        format!("{} #{} starts at {}", job.name(), op.sequence(), entry.start),
                    ));
                }
                if entry.duration() != op.duration() {
                    violations.push(Violation::new(
                        ViolationKind::DurationMismatch,
                        format!(
                            "{} #{} runs {} instead of {}",
                            job.name(),
                            op.sequence(),
                            entry.duration(),
                            op.duration()
                        ),
                    ));
                }
                if !op.machines().contains(&entry.machine) {
                    violations.push(Violation::new(
                        ViolationKind::InvalidMachine,
                        format!("{} #{} cannot run on {}", job.name(), op.sequence(), entry.machine),
                    ));
                }
                match entry.equipment {
                    Some(eq) if !op.equipment().contains(&eq) => {
                        violations.push(Violation::new(
                            ViolationKind::InvalidEquipment,
                            format!("{} #{} cannot use {}", job.name(), op.sequence(), eq),
                        ));
                    }
                    None if op.requires_equipment() => {
                        violations.push(Violation::new(
                            ViolationKind::MissingEquipment,
                            format!("{} #{} has no equipment assigned", job.name(), op.sequence()),
                        ));
                    }
                    _ => {}
                }
                if let Some(p) = prev {
                    if entry.start < p.end {
                        violations.push(Violation::new(
                            ViolationKind::Precedence,
                            format!(
                                "{} #{} starts at {} before #{} ends at {}",
                                job.name(),
                                op.sequence(),
                                entry.start,
                                p.sequence,
                                p.end
                            ),
                        ));
                    }
                }
                for w in instance.downtimes(entry.machine) {
                    if w.overlaps(entry.start, entry.end) {
                        violations.push(Violation::new(
                            ViolationKind::Downtime,
                            format!(
                                "{} #{} [{}, {}) hits downtime [{}, {}) of {}",
                                job.name(),
                                op.sequence(),
                                entry.start,
                                entry.end,
                                w.start,
                                w.end,
                                entry.machine
                            ),
                        ));
                    }
                }
                prev = Some(entry);
            }
        }

        for (i, a) in self.entries.iter().enumerate() {
            for b in &self.entries[i + 1..] {
                if !a.overlaps(b) {
                    continue;
                }
                if a.machine == b.machine {
                    violations.push(Violation::new(
                        ViolationKind::MachineOverlap,
                        format!(
                            "{} #{} and {} #{} overlap on {}",
                            a.job, a.sequence, b.job, b.sequence, a.machine
                        ),
                    ));
                }
                if let (Some(ea), Some(eb)) = (a.equipment, b.equipment) {
                    if ea == eb {
                        violations.push(Violation::new(
                            ViolationKind::EquipmentOverlap,
                            format!(
                                "{} #{} and {} #{} overlap on {}",
                                a.job, a.sequence, b.job, b.sequence, ea
                            ),
                        ));
                    }
                }
            }
        }

        violations
    }

    /// Whether [`Self::verify`] finds nothing.
    pub fn is_feasible(&self, instance: &Instance) -> bool {
        self.verify(instance).is_empty()
    }
}

/// A broken feasibility rule.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Classification of [`Violation`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ViolationKind {
    Unscheduled,
    ScheduledTwice,
    NegativeStart,
    DurationMismatch,
    InvalidMachine,
    InvalidEquipment,
    MissingEquipment,
    /// Operation started before its job predecessor finished.
    Precedence,
    MachineOverlap,
    EquipmentOverlap,
    /// Operation intersects a downtime window of its machine.
    Downtime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InstanceBuilder, OperationSpec};

    fn entry(job: usize, seq: usize, m: u32, eq: Option<u32>, start: i64, end: i64) -> ScheduledOperation {
        ScheduledOperation {
            op_index: 0,
            job: JobId(job),
            sequence: seq,
            machine: MachineId(m),
            equipment: eq.map(EquipmentId),
            start,
            end,
        }
    }

    fn instance() -> Instance {
        InstanceBuilder::new()
            .add_job(
                "job_1",
                vec![OperationSpec::new(&[1], &[1], 1), OperationSpec::new(&[1], &[2], 1)],
            )
            .add_job(
                "job_2",
                vec![OperationSpec::new(&[2], &[1], 1), OperationSpec::new(&[2], &[2], 1)],
            )
            .add_downtime(2, 4, 6)
            .build()
            .unwrap()
    }

    fn kinds(v: &[Violation]) -> Vec<ViolationKind> {
        v.iter().map(|x| x.kind).collect()
    }

    #[test]
    fn test_valid_schedule() {
        let mut s = Schedule::new();
        s.push(entry(0, 1, 1, Some(1), 0, 1));
        s.push(entry(0, 2, 1, Some(2), 1, 2));
        s.push(entry(1, 1, 2, Some(2), 0, 1));
        s.push(entry(1, 2, 2, Some(1), 1, 2));

        let inst = instance();
        assert!(s.verify(&inst).is_empty());
        assert!(s.is_feasible(&inst));
        assert_eq!(s.makespan(), 2);
    }

    #[test]
    fn test_equipment_overlap_and_precedence() {
        let mut s = Schedule::new();
        s.push(entry(0, 1, 1, Some(1), 0, 1));
        s.push(entry(0, 2, 1, Some(2), 0, 1)); // starts with its predecessor
        s.push(entry(1, 1, 2, Some(1), 0, 1)); // shares E1 with job_1 #1
        s.push(entry(1, 2, 2, Some(2), 1, 2));

        let v = kinds(&s.verify(&instance()));
        assert!(v.contains(&ViolationKind::Precedence));
        assert!(v.contains(&ViolationKind::EquipmentOverlap));
        assert!(v.contains(&ViolationKind::MachineOverlap));
    }

    #[test]
    fn test_downtime_and_missing_equipment() {
        let mut s = Schedule::new();
        s.push(entry(0, 1, 1, Some(1), 0, 1));
        s.push(entry(0, 2, 1, Some(2), 1, 2));
        s.push(entry(1, 1, 2, None, 3, 4));
        s.push(entry(1, 2, 2, Some(2), 4, 5)); // inside [4, 6)

        let v = kinds(&s.verify(&instance()));
        assert!(v.contains(&ViolationKind::MissingEquipment));
        assert!(v.contains(&ViolationKind::Downtime));
    }

    #[test]
    fn test_unscheduled_and_invalid_machine() {
        let mut s = Schedule::new();
        s.push(entry(0, 1, 2, Some(1), 0, 1));

        let v = kinds(&s.verify(&instance()));
        assert!(v.contains(&ViolationKind::InvalidMachine));
        assert_eq!(v.iter().filter(|k| **k == ViolationKind::Unscheduled).count(), 3);
    }

    #[test]
    fn test_gantt_records() {
        let mut s = Schedule::new();
        s.push(entry(1, 1, 2, Some(1), 1, 2));
        s.push(entry(0, 1, 1, Some(1), 0, 1));

        let records = s.gantt_records(&instance());
        assert_eq!(records[0].job, "job_1");
        assert_eq!(records[0].start, 0);
        assert_eq!(records[1].job, "job_2");
        assert_eq!(records[1].duration, 1);
    }

    #[test]
    fn test_entry_for() {
        let mut s = Schedule::new();
        s.push(entry(0, 2, 1, None, 3, 4));
        s.push(entry(0, 1, 1, None, 0, 1));
        s.push(entry(1, 1, 2, None, 0, 1));

        assert_eq!(s.entry_for(JobId(0), 2).unwrap().start, 3);
        assert_eq!(s.entry_for(JobId(1), 1).unwrap().machine, MachineId(2));
        assert!(s.entry_for(JobId(1), 2).is_none());
    }
}
