//! Core domain types: identifiers, operations, jobs, downtime windows.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a machine.
///
/// Ordered: the decoder breaks ties on the lowest identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct MachineId(pub u32);

/// Identifier of a piece of equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct EquipmentId(pub u32);

/// Position of a job inside its [`super::Instance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct JobId(pub usize);

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

impl fmt::Display for EquipmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "J{}", self.0)
    }
}

impl From<u32> for MachineId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<u32> for EquipmentId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A time range `[start, end)` during which a machine cannot run anything.
///
/// Half-open: an operation may end exactly at `start` or begin exactly at `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DowntimeWindow {
    /// First blocked instant (inclusive).
    pub start: i64,
    /// First free instant after the window (exclusive).
    pub end: i64,
}

impl DowntimeWindow {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Whether `[start, end)` of an operation intersects this window.
    #[inline]
    pub fn overlaps(&self, start: i64, end: i64) -> bool {
        start < self.end && self.start < end
    }

    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.end > self.start
    }
}

/// An indivisible unit of work inside a job.
///
/// # Invariants
/// - `machines` is non-empty and free of duplicates
/// - `equipment` is free of duplicates (empty = no equipment needed)
/// - `duration > 0`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Operation {
    job: JobId,
    sequence: usize,
    machines: Vec<MachineId>,
    equipment: Vec<EquipmentId>,
    duration: i64,
}

impl Operation {
    pub(crate) fn new(
        job: JobId,
        sequence: usize,
        machines: Vec<MachineId>,
        equipment: Vec<EquipmentId>,
        duration: i64,
    ) -> Self {
        Self {
            job,
            sequence,
            machines,
            equipment,
            duration,
        }
    }

    /// Owning job.
    #[inline]
    pub fn job(&self) -> JobId {
        self.job
    }

    /// 1-based position inside the owning job.
    #[inline]
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    /// Candidate machines, in input order.
    #[inline]
    pub fn machines(&self) -> &[MachineId] {
        &self.machines
    }

    /// Candidate equipment, in input order.
    #[inline]
    pub fn equipment(&self) -> &[EquipmentId] {
        &self.equipment
    }

    #[inline]
    pub fn requires_equipment(&self) -> bool {
        !self.equipment.is_empty()
    }

    #[inline]
    pub fn duration(&self) -> i64 {
        self.duration
    }
}

/// A named, ordered sequence of operations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Job {
    id: JobId,
    name: String,
    operations: Vec<Operation>,
}

impl Job {
    pub(crate) fn new(id: JobId, name: String, operations: Vec<Operation>) -> Self {
        Self {
            id,
            name,
            operations,
        }
    }

    #[inline]
    pub fn id(&self) -> JobId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Sum of all operation durations.
    pub fn total_duration(&self) -> i64 {
        self.operations.iter().map(Operation::duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downtime_half_open() {
        let w = DowntimeWindow::new(1, 2);
        assert!(w.is_well_formed());
        assert!(!w.overlaps(0, 1)); // ends exactly at window start
        assert!(!w.overlaps(2, 3)); // starts exactly at window end
        assert!(w.overlaps(0, 2));
        assert!(w.overlaps(1, 2));
        assert!(w.overlaps(0, 5));
    }

    #[test]
    fn test_malformed_window() {
        assert!(!DowntimeWindow::new(3, 3).is_well_formed());
        assert!(!DowntimeWindow::new(4, 2).is_well_formed());
    }

    #[test]
    fn test_id_ordering_and_display() {
        assert!(MachineId(1) < MachineId(2));
        assert_eq!(MachineId(3).to_string(), "M3");
        assert_eq!(EquipmentId(7).to_string(), "E7");
        assert_eq!(JobId(0).to_string(), "J0");
    }

    #[test]
    fn test_job_total_duration() {
        let job = Job::new(
            JobId(0),
            "job_1".into(),
            vec![
                Operation::new(JobId(0), 1, vec![MachineId(1)], vec![], 2),
                Operation::new(JobId(0), 2, vec![MachineId(1)], vec![], 3),
            ],
        );
        assert_eq!(job.total_duration(), 5);
        assert_eq!(job.operations()[1].sequence(), 2);
    }
}
