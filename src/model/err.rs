//! Construction-time errors for the scheduling domain.

use super::types::{EquipmentId, MachineId};

/// Raised when raw input cannot be turned into an [`super::Instance`].
///
/// Fatal: the caller must fix the data, nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedInstance {
    #[error("job {job:?}, operation {sequence}: no candidate machine")]
    EmptyMachineCandidates { job: String, sequence: usize },

    #[error("job {job:?}, operation {sequence}: duration {duration} is not positive")]
    NonPositiveDuration {
        job: String,
        sequence: usize,
        duration: i64,
    },

    #[error("job {job:?}, operation {sequence}: machine {machine} listed twice")]
    DuplicateMachineCandidate {
        job: String,
        sequence: usize,
        machine: MachineId,
    },

    #[error("job {job:?}, operation {sequence}: equipment {equipment} listed twice")]
    DuplicateEquipmentCandidate {
        job: String,
        sequence: usize,
        equipment: EquipmentId,
    },

    #[error("machine {machine}: downtime window [{start}, {end}) is empty or reversed")]
    MalformedDowntime {
        machine: MachineId,
        start: i64,
        end: i64,
    },

    #[error("job {0:?} is defined more than once")]
    DuplicateJob(String),

    #[error("job {0:?} has no operations")]
    EmptyJob(String),

    #[error("horizon {0} is not positive")]
    NonPositiveHorizon(i64),

    /// Total duration (plus the latest downtime end, for the default
    /// horizon) does not fit in an `i64`.
    #[error("time values overflow: {0}")]
    TimeOverflow(&'static str),
}
