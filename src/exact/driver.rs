//! Exact solve driver: build, submit, decode.

use crate::cp::{CpSolution, CpSolver, SolverConfig, SolverStatus};
use crate::model::{Instance, Schedule, ScheduledOperation};

use super::builder::{FjspCpBuilder, FjspModel};
use super::err::SolveError;

/// A schedule decoded from a solver assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactSolution {
    pub schedule: Schedule,
    pub makespan: i64,
    /// `Optimal` or `Feasible` for final results; `Timeout`/`Unknown` for
    /// the incumbent carried by [`SolveError::Unknown`].
    pub status: SolverStatus,
}

impl ExactSolution {
    #[inline]
    pub fn is_optimal(&self) -> bool {
        self.status == SolverStatus::Optimal
    }
}

/// Runs the exact formulation through a [`CpSolver`].
///
/// # Examples
///
/// ```
/// use u_fjsp::cp::{BacktrackingSolver, SolverConfig};
/// use u_fjsp::exact::ExactSolveDriver;
/// use u_fjsp::model::{InstanceBuilder, OperationSpec};
///
/// let instance = InstanceBuilder::new()
///     .add_job("job_1", vec![OperationSpec::new(&[1], &[], 1)])
///     .add_job("job_2", vec![OperationSpec::new(&[1], &[], 1)])
///     .with_horizon(2)
///     .build()
///     .unwrap();
///
/// let driver = ExactSolveDriver::new(BacktrackingSolver::new())
///     .with_config(SolverConfig::default().with_time_limit_ms(10_000));
/// let solution = driver.solve(&instance).unwrap();
/// assert_eq!(solution.makespan, 2);
/// ```
pub struct ExactSolveDriver<S> {
    solver: S,
    config: SolverConfig,
}

impl<S: CpSolver> ExactSolveDriver<S> {
    pub fn new(solver: S) -> Self {
        Self {
            solver,
            config: SolverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    #[inline]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solves with the instance's own horizon.
    pub fn solve(&self, instance: &Instance) -> Result<ExactSolution, SolveError> {
        self.solve_built(instance, FjspCpBuilder::new(instance).build())
    }

    /// Solves with an explicit horizon.
    pub fn solve_with_horizon(
        &self,
        instance: &Instance,
        horizon: i64,
    ) -> Result<ExactSolution, SolveError> {
        self.solve_built(instance, FjspCpBuilder::new(instance).with_horizon(horizon).build())
    }

    fn solve_built(&self, instance: &Instance, built: FjspModel) -> Result<ExactSolution, SolveError> {
        built
            .model
            .validate()
            .map_err(|e| SolveError::ModelInvalid(e.to_string()))?;

        let solution = self.solver.solve(&built.model, &self.config);
        tracing::info!(
            status = ?solution.status,
            objective = ?solution.objective_value,
            solve_time_ms = solution.solve_time_ms,
            "exact solve finished"
        );

        match solution.status {
            SolverStatus::Optimal | SolverStatus::Feasible => {
                decode_solution(instance, &built, &solution)
            }
            SolverStatus::Infeasible => Err(SolveError::Infeasible {
                horizon: built.horizon,
            }),
            SolverStatus::Timeout | SolverStatus::Unknown => {
                let best = if solution.has_assignment() {
                    match decode_solution(instance, &built, &solution) {
                        Ok(s) => Some(Box::new(s)),
                        Err(e) => {
                            tracing::warn!(error = %e, "discarding undecodable incumbent");
                            None
                        }
                    }
                } else {
                    None
                };
                Err(SolveError::Unknown {
                    status: solution.status,
                    best,
                })
            }
            SolverStatus::ModelInvalid => Err(SolveError::ModelInvalid(
                "solver reported the model as invalid".into(),
            )),
        }
    }
}

/// Reads the chosen machine, equipment and start of every operation.
pub fn decode_solution(
    instance: &Instance,
    built: &FjspModel,
    solution: &CpSolution,
) -> Result<ExactSolution, SolveError> {
    let mut schedule = Schedule::with_capacity(built.operations.len());

    for vars in &built.operations {
        let tag = || {
            let name = instance.job(vars.job).map(|j| j.name()).unwrap_or("?");
            format!("{name}#{}", vars.sequence)
        };

        let chosen: Vec<_> = vars
            .machines
            .iter()
            .filter(|c| solution.bool_value(c.presence) == Some(true))
            .collect();
        let machine = match chosen.as_slice() {
            [one] => one.resource,
            _ => {
                return Err(SolveError::InconsistentAssignment(format!(
                    "{} has {} machines selected",
                    tag(),
                    chosen.len()
                )))
            }
        };

        let equipment = if vars.equipment.is_empty() {
            None
        } else {
            let chosen: Vec<_> = vars
                .equipment
                .iter()
                .filter(|c| solution.bool_value(c.presence) == Some(true))
                .collect();
            match chosen.as_slice() {
                [one] => Some(one.resource),
                _ => {
                    return Err(SolveError::InconsistentAssignment(format!(
                        "{} has {} equipment selected",
                        tag(),
                        chosen.len()
                    )))
                }
            }
        };

        let start = solution
            .value(vars.start)
            .ok_or_else(|| SolveError::InconsistentAssignment(format!("{} has no start", tag())))?;
        let end = start.checked_add(vars.duration).ok_or_else(|| {
            SolveError::InconsistentAssignment(format!("{} starts out of range at {start}", tag()))
        })?;

        schedule.push(ScheduledOperation {
            op_index: vars.op_index,
            job: vars.job,
            sequence: vars.sequence,
            machine,
            equipment,
            start,
            end,
        });
    }

    let makespan = solution.value(built.makespan).ok_or_else(|| {
        SolveError::InconsistentAssignment("makespan has no value".into())
    })?;
    if makespan != schedule.makespan() {
        return Err(SolveError::InconsistentAssignment(format!(
            "makespan {} differs from latest end {}",
            makespan,
            schedule.makespan()
        )));
    }

    Ok(ExactSolution {
        schedule,
        makespan,
        status: solution.status,
    })
}
