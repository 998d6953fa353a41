//! Problem instance and its construction.
//!
//! An [`Instance`] is built once from raw per-job operation triples and is
//! read-only afterwards. Both solving strategies take it as their only input.
//!
//! # Horizon
//! When no horizon is given, the default is the latest downtime end plus the
//! sum of all durations. Running every operation back to back after the last
//! downtime window always fits inside that bound.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::err::MalformedInstance;
use super::types::{DowntimeWindow, EquipmentId, Job, JobId, MachineId, Operation};

/// Raw description of one operation: candidates and duration.
///
/// Sequence indices are not part of the input; they are assigned from the
/// position in the job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSpec {
    pub machines: Vec<MachineId>,
    pub equipment: Vec<EquipmentId>,
    pub duration: i64,
}

impl OperationSpec {
    /// Creates an operation from plain numeric identifiers.
    ///
    /// ```
    /// use u_fjsp::model::OperationSpec;
    ///
    /// let op = OperationSpec::new(&[1, 2], &[], 3);
    /// assert_eq!(op.machines.len(), 2);
    /// assert!(op.equipment.is_empty());
    /// ```
    pub fn new(machines: &[u32], equipment: &[u32], duration: i64) -> Self {
        Self {
            machines: machines.iter().copied().map(MachineId).collect(),
            equipment: equipment.iter().copied().map(EquipmentId).collect(),
            duration,
        }
    }
}

impl From<(Vec<u32>, Vec<u32>, i64)> for OperationSpec {
    fn from((machines, equipment, duration): (Vec<u32>, Vec<u32>, i64)) -> Self {
        Self::new(&machines, &equipment, duration)
    }
}

/// Serializable input format.
///
/// Mirrors the JSON layout used by existing instance files:
///
/// ```json
/// {
///   "jobs": { "job_1": [[[1], [1], 1], [[1], [2], 1]] },
///   "machine_downtimes": { "1": [[1, 2]] },
///   "timespan": 3
/// }
/// ```
///
/// Jobs are taken in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawInstance {
    pub jobs: BTreeMap<String, Vec<(Vec<u32>, Vec<u32>, i64)>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub machine_downtimes: BTreeMap<u32, Vec<(i64, i64)>>,
    #[cfg_attr(feature = "serde", serde(default, alias = "horizon"))]
    pub timespan: Option<i64>,
}

impl TryFrom<RawInstance> for Instance {
    type Error = MalformedInstance;

    fn try_from(raw: RawInstance) -> Result<Self, Self::Error> {
        let mut builder = InstanceBuilder::new();
        for (name, ops) in raw.jobs {
            builder = builder.add_job(name, ops.into_iter().map(OperationSpec::from).collect());
        }
        for (machine, windows) in raw.machine_downtimes {
            for (start, end) in windows {
                builder = builder.add_downtime(machine, start, end);
            }
        }
        if let Some(h) = raw.timespan {
            builder = builder.with_horizon(h);
        }
        builder.build()
    }
}

/// Builder for [`Instance`].
///
/// # Examples
///
/// ```
/// use u_fjsp::model::{InstanceBuilder, OperationSpec};
///
/// let instance = InstanceBuilder::new()
///     .add_job("job_1", vec![OperationSpec::new(&[1], &[1], 1), OperationSpec::new(&[1], &[2], 1)])
///     .add_job("job_2", vec![OperationSpec::new(&[2], &[1], 1), OperationSpec::new(&[2], &[2], 1)])
///     .with_horizon(3)
///     .build()
///     .unwrap();
///
/// assert_eq!(instance.operation_count(), 4);
/// assert_eq!(instance.horizon(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InstanceBuilder {
    jobs: Vec<(String, Vec<OperationSpec>)>,
    downtimes: Vec<(MachineId, DowntimeWindow)>,
    horizon: Option<i64>,
}

impl InstanceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a job. Jobs keep insertion order.
    pub fn add_job(mut self, name: impl Into<String>, operations: Vec<OperationSpec>) -> Self {
        self.jobs.push((name.into(), operations));
        self
    }

    /// Adds a downtime window `[start, end)` to a machine.
    pub fn add_downtime(mut self, machine: u32, start: i64, end: i64) -> Self {
        self.downtimes
            .push((MachineId(machine), DowntimeWindow::new(start, end)));
        self
    }

    pub fn with_horizon(mut self, horizon: i64) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Validates the input and builds the instance.
    pub fn build(self) -> Result<Instance, MalformedInstance> {
        let mut seen_names = HashSet::new();
        let mut jobs = Vec::with_capacity(self.jobs.len());

        for (index, (name, ops)) in self.jobs.into_iter().enumerate() {
            if !seen_names.insert(name.clone()) {
                return Err(MalformedInstance::DuplicateJob(name));
            }
            if ops.is_empty() {
                return Err(MalformedInstance::EmptyJob(name));
            }

            let id = JobId(index);
            let mut operations = Vec::with_capacity(ops.len());
            for (i, op) in ops.into_iter().enumerate() {
                let sequence = i + 1;
                validate_operation(&name, sequence, &op)?;
                operations.push(Operation::new(
                    id,
                    sequence,
                    op.machines,
                    op.equipment,
                    op.duration,
                ));
            }
            jobs.push(Job::new(id, name, operations));
        }

        let mut downtimes: BTreeMap<MachineId, Vec<DowntimeWindow>> = BTreeMap::new();
        for (machine, window) in self.downtimes {
            if !window.is_well_formed() {
                return Err(MalformedInstance::MalformedDowntime {
                    machine,
                    start: window.start,
                    end: window.end,
                });
            }
            downtimes.entry(machine).or_default().push(window);
        }
        for windows in downtimes.values_mut() {
            windows.sort_by_key(|w| (w.start, w.end));
        }

        // Every decoded end is bounded by the total, so checking it once
        // keeps all later schedule arithmetic in range.
        let total = jobs
            .iter()
            .flat_map(|j| j.operations())
            .try_fold(0i64, |acc, op| acc.checked_add(op.duration()))
            .ok_or(MalformedInstance::TimeOverflow("sum of durations"))?;

        let horizon = match self.horizon {
            Some(h) if h <= 0 => return Err(MalformedInstance::NonPositiveHorizon(h)),
            Some(h) => h,
            None => {
                let latest_downtime = downtimes
                    .values()
                    .flatten()
                    .map(|w| w.end)
                    .max()
                    .unwrap_or(0)
                    .max(0);
                latest_downtime
                    .checked_add(total)
                    .ok_or(MalformedInstance::TimeOverflow("default horizon"))?
                    .max(1)
            }
        };

        Ok(Instance {
            jobs,
            downtimes,
            horizon,
        })
    }
}

fn validate_operation(job: &str, sequence: usize, op: &OperationSpec) -> Result<(), MalformedInstance> {
    if op.machines.is_empty() {
        return Err(MalformedInstance::EmptyMachineCandidates {
            job: job.to_string(),
            sequence,
        });
    }
    if op.duration <= 0 {
        return Err(MalformedInstance::NonPositiveDuration {
            job: job.to_string(),
            sequence,
            duration: op.duration,
        });
    }
    let mut machines = HashSet::new();
    for &m in &op.machines {
        if !machines.insert(m) {
            return Err(MalformedInstance::DuplicateMachineCandidate {
                job: job.to_string(),
                sequence,
                machine: m,
            });
        }
    }
    let mut equipment = HashSet::new();
    for &e in &op.equipment {
        if !equipment.insert(e) {
            return Err(MalformedInstance::DuplicateEquipmentCandidate {
                job: job.to_string(),
                sequence,
                equipment: e,
            });
        }
    }
    Ok(())
}

/// A complete FJSP instance: jobs, machine downtimes, horizon.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Instance {
    jobs: Vec<Job>,
    downtimes: BTreeMap<MachineId, Vec<DowntimeWindow>>,
    horizon: i64,
}

impl Instance {
    pub fn builder() -> InstanceBuilder {
        InstanceBuilder::new()
    }

    #[inline]
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Looks up a job by id.
    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.get(id.0)
    }

    /// All operations, job by job, in sequence order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.jobs.iter().flat_map(|j| j.operations().iter())
    }

    pub fn operation_count(&self) -> usize {
        self.jobs.iter().map(|j| j.operations().len()).sum()
    }

    /// Downtime windows of a machine, sorted by start. Empty if none.
    pub fn downtimes(&self, machine: MachineId) -> &[DowntimeWindow] {
        self.downtimes
            .get(&machine)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Machines that own at least one downtime window.
    pub fn machines_with_downtime(&self) -> impl Iterator<Item = MachineId> + '_ {
        self.downtimes.keys().copied()
    }

    /// Sorted union of all candidate machines.
    pub fn machines(&self) -> Vec<MachineId> {
        let set: BTreeSet<MachineId> = self
            .operations()
            .flat_map(|op| op.machines().iter().copied())
            .collect();
        set.into_iter().collect()
    }

    /// Sorted union of all candidate equipment.
    pub fn equipment(&self) -> Vec<EquipmentId> {
        let set: BTreeSet<EquipmentId> = self
            .operations()
            .flat_map(|op| op.equipment().iter().copied())
            .collect();
        set.into_iter().collect()
    }

    /// Upper bound on every start and end time.
    #[inline]
    pub fn horizon(&self) -> i64 {
        self.horizon
    }

    /// Sum of all operation durations.
    pub fn total_duration(&self) -> i64 {
        self.jobs.iter().map(Job::total_duration).sum()
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for job in &self.jobs {
            for op in job.operations() {
                let machines: Vec<String> = op.machines().iter().map(|m| m.to_string()).collect();
                let equipment: Vec<String> =
                    op.equipment().iter().map(|e| e.to_string()).collect();
                writeln!(
                    f,
                    "{} #{}: machines [{}], equipment [{}], duration {}",
                    job.name(),
                    op.sequence(),
                    machines.join(", "),
                    equipment.join(", "),
                    op.duration()
                )?;
            }
        }
        for machine in self.machines_with_downtime() {
            let windows: Vec<String> = self
                .downtimes(machine)
                .iter()
                .map(|w| format!("[{}, {})", w.start, w.end))
                .collect();
            writeln!(f, "{machine} down: {}", windows.join(", "))?;
        }
        write!(f, "horizon {}", self.horizon)
    }
}
