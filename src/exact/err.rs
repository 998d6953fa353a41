//! Failures of the exact solving path.

use crate::cp::SolverStatus;

use super::driver::ExactSolution;

/// Why the exact path produced no final schedule.
///
/// `Infeasible` and `Unknown` are normal outcomes: the caller may retry
/// with a larger horizon or more time, or fall back to the priority decoder.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SolveError {
    /// The constraints admit no schedule within the horizon.
    #[error("no schedule fits within horizon {horizon}")]
    Infeasible { horizon: i64 },

    /// The solver stopped (time or resource limit) without a proof.
    /// `best` holds the best schedule it found, if any.
    #[error("solver stopped without proof ({status:?})")]
    Unknown {
        status: SolverStatus,
        best: Option<Box<ExactSolution>>,
    },

    /// The built model was rejected (e.g. a negative horizon).
    #[error("model rejected: {0}")]
    ModelInvalid(String),

    /// The solver returned values that do not describe a schedule.
    #[error("inconsistent solver assignment: {0}")]
    InconsistentAssignment(String),
}

impl SolveError {
    /// Best schedule attached to an `Unknown` outcome.
    pub fn best(&self) -> Option<&ExactSolution> {
        match self {
            SolveError::Unknown { best, .. } => best.as_deref(),
            _ => None,
        }
    }

    #[inline]
    pub fn is_infeasible(&self) -> bool {
        matches!(self, SolveError::Infeasible { .. })
    }
}
