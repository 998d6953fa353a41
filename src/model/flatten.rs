//! Flat operation view used as the index space of priority vectors.

use super::instance::Instance;
use super::types::{EquipmentId, JobId, MachineId};

/// One operation, detached from its job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatOperation {
    pub job: JobId,
    /// 1-based position inside the job.
    pub sequence: usize,
    pub machines: Vec<MachineId>,
    pub equipment: Vec<EquipmentId>,
    pub duration: i64,
    /// Candidate machines as indices into [`FlatOperations::machines`],
    /// sorted ascending (so the first minimum is the lowest machine id).
    pub(crate) machine_slots: Vec<usize>,
}

/// All operations of an instance in a stable order: job by job, then by
/// sequence. Position `i` refers to the same operation for the lifetime of
/// this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatOperations {
    ops: Vec<FlatOperation>,
    machines: Vec<MachineId>,
    job_count: usize,
}

impl FlatOperations {
    pub fn new(instance: &Instance) -> Self {
        let machines = instance.machines();

        let ops = instance
            .operations()
            .map(|op| {
                let mut machine_slots: Vec<usize> = op
                    .machines()
                    .iter()
                    .filter_map(|m| machines.binary_search(m).ok())
                    .collect();
                machine_slots.sort_unstable();

                FlatOperation {
                    job: op.job(),
                    sequence: op.sequence(),
                    machines: op.machines().to_vec(),
                    equipment: op.equipment().to_vec(),
                    duration: op.duration(),
                    machine_slots,
                }
            })
            .collect();

        Self {
            ops,
            machines,
            job_count: instance.jobs().len(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&FlatOperation> {
        self.ops.get(index)
    }

    #[inline]
    pub fn as_slice(&self) -> &[FlatOperation] {
        &self.ops
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FlatOperation> {
        self.ops.iter()
    }

    /// Sorted machine universe that `machine_slots` index into.
    #[inline]
    pub fn machines(&self) -> &[MachineId] {
        &self.machines
    }

    #[inline]
    pub fn job_count(&self) -> usize {
        self.job_count
    }
}

impl Instance {
    /// Projects the instance into its flat operation sequence.
    pub fn flatten(&self) -> FlatOperations {
        FlatOperations::new(self)
    }
}

impl<'a> IntoIterator for &'a FlatOperations {
    type Item = &'a FlatOperation;
    type IntoIter = std::slice::Iter<'a, FlatOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InstanceBuilder, OperationSpec};

    #[test]
    fn test_flatten_order() {
        let instance = InstanceBuilder::new()
            .add_job(
                "a",
                vec![OperationSpec::new(&[3, 1], &[], 2), OperationSpec::new(&[2], &[5], 1)],
            )
            .add_job("b", vec![OperationSpec::new(&[1], &[], 4)])
            .build()
            .unwrap();

        let flat = instance.flatten();
        assert_eq!(flat.len(), 3);
        assert_eq!(flat.job_count(), 2);

        let keys: Vec<(JobId, usize)> = flat.iter().map(|o| (o.job, o.sequence)).collect();
        assert_eq!(keys, vec![(JobId(0), 1), (JobId(0), 2), (JobId(1), 1)]);

        let first = flat.get(0).unwrap();
        assert_eq!(first.machines, vec![MachineId(3), MachineId(1)]);
        assert_eq!(first.duration, 2);
        assert_eq!(flat.get(1).unwrap().equipment, vec![EquipmentId(5)]);
    }

    #[test]
    fn test_machine_slots_sorted() {
        let instance = InstanceBuilder::new()
            .add_job("a", vec![OperationSpec::new(&[7, 2, 5], &[], 1)])
            .build()
            .unwrap();
        let flat = instance.flatten();

        assert_eq!(flat.machines(), &[MachineId(2), MachineId(5), MachineId(7)]);
        assert_eq!(flat.get(0).unwrap().machine_slots, vec![0, 1, 2]);
    }

    #[test]
    fn test_flatten_is_stable() {
        let instance = InstanceBuilder::new()
            .add_job("a", vec![OperationSpec::new(&[1], &[], 1)])
            .add_job("b", vec![OperationSpec::new(&[2], &[], 1)])
            .build()
            .unwrap();
        assert_eq!(instance.flatten(), instance.flatten());
    }
}
