//! Depth-first branch-and-bound solver for small models.
//!
//! Labels booleans first (true before false), then integers in ascending
//! value order. After each assignment only the constraints watching that
//! variable are re-checked, using the values fixed so far and the domain
//! bounds of the rest. Every incumbent tightens the objective bound.
//!
//! Complete and exact, but exponential: intended for tests and toy
//! instances, not as a replacement for a production CP solver.

use std::time::Instant;

use super::model::{Constraint, CpModel, Objective};
use super::solver::{CpSolution, CpSolver, SolverConfig, SolverStatus};
use super::variables::{IntVarId, Literal};

/// Exhaustive reference solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktrackingSolver;

impl BacktrackingSolver {
    pub fn new() -> Self {
        Self
    }
}

impl CpSolver for BacktrackingSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        if let Err(e) = model.validate() {
            tracing::warn!(model = %model.name, error = %e, "rejecting invalid model");
            return CpSolution::empty(SolverStatus::ModelInvalid);
        }

        let started = Instant::now();
        let deadline = config.time_limit().map(|limit| started + limit);

        tracing::debug!(
            model = %model.name,
            ints = model.int_var_count(),
            bools = model.bool_var_count(),
            intervals = model.interval_count(),
            constraints = model.constraint_count(),
            "backtracking search started"
        );

        let mut search = Search::new(model, deadline, config.stop_after_first);
        if search.root_consistent() {
            search.dfs(0);
        }

        let status = if search.timed_out {
            SolverStatus::Timeout
        } else if search.best.is_some() {
            if search.stopped_early {
                SolverStatus::Feasible
            } else {
                SolverStatus::Optimal
            }
        } else {
            SolverStatus::Infeasible
        };

        tracing::debug!(
            model = %model.name,
            ?status,
            nodes = search.nodes,
            "backtracking search finished"
        );

        let mut solution = CpSolution::empty(status);
        if let Some(best) = search.best {
            solution.int_values = best.ints;
            solution.bool_values = best.bools;
            solution.objective_value = best.objective;
        }
        solution.solve_time_ms = started.elapsed().as_millis() as i64;
        solution
    }
}

struct Incumbent {
    ints: Vec<i64>,
    bools: Vec<bool>,
    objective: Option<i64>,
}

struct Search<'a> {
    model: &'a CpModel,
    /// Model constraints followed by the `end = start + size` links of intervals.
    constraints: Vec<Constraint>,
    int_watch: Vec<Vec<usize>>,
    bool_watch: Vec<Vec<usize>>,
    ints: Vec<Option<i64>>,
    bools: Vec<Option<bool>>,
    bounds: Vec<(i64, i64)>,
    objective: Option<Objective>,
    best: Option<Incumbent>,
    deadline: Option<Instant>,
    stop_after_first: bool,
    nodes: u64,
    timed_out: bool,
    stopped_early: bool,
    proven: bool,
}

impl<'a> Search<'a> {
    fn new(model: &'a CpModel, deadline: Option<Instant>, stop_after_first: bool) -> Self {
        let mut constraints: Vec<Constraint> = model.constraints().to_vec();
        for iv in model.intervals() {
            constraints.push(Constraint::Linear {
                terms: vec![(1, iv.end), (-1, iv.start)],
                lower: iv.size,
                upper: iv.size,
                enforced_by: iv.presence.map(|p| p.lit()).into_iter().collect(),
            });
        }

        let mut int_watch = vec![Vec::new(); model.int_var_count()];
        let mut bool_watch = vec![Vec::new(); model.bool_var_count()];
        for (ci, c) in constraints.iter().enumerate() {
            match c {
                Constraint::Linear {
                    terms, enforced_by, ..
                } => {
                    for &(_, v) in terms {
                        int_watch[v.index()].push(ci);
                    }
                    for lit in enforced_by {
                        bool_watch[lit.var.index()].push(ci);
                    }
                }
                Constraint::ExactlyOne { literals } => {
                    for lit in literals {
                        bool_watch[lit.var.index()].push(ci);
                    }
                }
                Constraint::NoOverlap { intervals } => {
                    for &i in intervals {
                        let iv = &model.intervals()[i.index()];
                        int_watch[iv.start.index()].push(ci);
                        int_watch[iv.end.index()].push(ci);
                        if let Some(p) = iv.presence {
                            bool_watch[p.index()].push(ci);
                        }
                    }
                }
                Constraint::MaxEquality { target, vars } => {
                    int_watch[target.index()].push(ci);
                    for &v in vars {
                        int_watch[v.index()].push(ci);
                    }
                }
            }
        }
        for list in int_watch.iter_mut().chain(bool_watch.iter_mut()) {
            list.sort_unstable();
            list.dedup();
        }

        Self {
            model,
            constraints,
            int_watch,
            bool_watch,
            ints: vec![None; model.int_var_count()],
            bools: vec![None; model.bool_var_count()],
            bounds: model.int_vars().iter().map(|v| (v.min, v.max)).collect(),
            objective: model.objective(),
            best: None,
            deadline,
            stop_after_first,
            nodes: 0,
            timed_out: false,
            stopped_early: false,
            proven: false,
        }
    }

    fn root_consistent(&self) -> bool {
        (0..self.constraints.len()).all(|ci| self.satisfiable(ci))
    }

    #[inline]
    fn halted(&self) -> bool {
        self.timed_out || self.stopped_early || self.proven
    }

    fn should_stop(&mut self) -> bool {
        if self.halted() {
            return true;
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                tracing::trace!(nodes = self.nodes, "time limit reached");
                self.timed_out = true;
                return true;
            }
        }
        false
    }

    fn dfs(&mut self, depth: usize) {
        self.nodes += 1;
        if self.should_stop() {
            return;
        }

        let n_bools = self.bools.len();
        if depth == n_bools + self.ints.len() {
            self.record_incumbent();
            return;
        }

        if depth < n_bools {
            for value in [true, false] {
                self.bools[depth] = Some(value);
                let ok = self.bool_watch[depth].iter().all(|&ci| self.satisfiable(ci));
                if ok {
                    self.dfs(depth + 1);
                }
                if self.halted() {
                    break;
                }
            }
            self.bools[depth] = None;
        } else {
            let i = depth - n_bools;
            let mut value = self.bounds[i].0;
            // The upper bound may shrink while we iterate (objective tightening).
            while value <= self.bounds[i].1 {
                self.ints[i] = Some(value);
                let ok = self.int_watch[i].iter().all(|&ci| self.satisfiable(ci));
                if ok {
                    self.dfs(depth + 1);
                }
                if self.halted() {
                    break;
                }
                match value.checked_add(1) {
                    Some(next) => value = next,
                    None => break,
                }
            }
            self.ints[i] = None;
        }
    }

    fn record_incumbent(&mut self) {
        let ints: Vec<i64> = self.ints.iter().map(|v| v.unwrap_or(0)).collect();
        let bools: Vec<bool> = self.bools.iter().map(|v| v.unwrap_or(false)).collect();
        let objective = self.objective.map(|o| ints[o.var().index()]);

        tracing::trace!(?objective, nodes = self.nodes, "new incumbent");

        match self.objective {
            Some(Objective::Minimize(v)) => {
                let bound = &mut self.bounds[v.index()];
                bound.1 = bound.1.min(ints[v.index()].saturating_sub(1));
            }
            Some(Objective::Maximize(v)) => {
                let bound = &mut self.bounds[v.index()];
                bound.0 = bound.0.max(ints[v.index()].saturating_add(1));
            }
            // Without an objective the first solution is optimal.
            None => self.proven = true,
        }

        self.best = Some(Incumbent {
            ints,
            bools,
            objective,
        });

        if self.stop_after_first && !self.proven {
            self.stopped_early = true;
        }
    }

    fn lit_value(&self, lit: Literal) -> Option<bool> {
        self.bools[lit.var.index()].map(|v| lit.eval(v))
    }

    /// Current (lo, hi) of an integer variable.
    #[inline]
    fn range(&self, v: IntVarId) -> (i64, i64) {
        match self.ints[v.index()] {
            Some(x) => (x, x),
            None => self.bounds[v.index()],
        }
    }

    /// `false` when constraint `ci` cannot hold under the current partial assignment.
    fn satisfiable(&self, ci: usize) -> bool {
        match &self.constraints[ci] {
            Constraint::Linear {
                terms,
                lower,
                upper,
                enforced_by,
            } => {
                for &lit in enforced_by {
                    match self.lit_value(lit) {
                        Some(true) => {}
                        Some(false) => return true,
                        None => return true,
                    }
                }
                let (mut min_sum, mut max_sum) = (0i64, 0i64);
                for &(coef, v) in terms {
                    let (lo, hi) = self.range(v);
                    let (a, b) = (coef.saturating_mul(lo), coef.saturating_mul(hi));
                    min_sum = min_sum.saturating_add(a.min(b));
                    max_sum = max_sum.saturating_add(a.max(b));
                }
                max_sum >= *lower && min_sum <= *upper
            }
            Constraint::ExactlyOne { literals } => {
                let mut trues = 0;
                let mut unknown = 0;
                for &lit in literals {
                    match self.lit_value(lit) {
                        Some(true) => trues += 1,
                        Some(false) => {}
                        None => unknown += 1,
                    }
                }
                trues <= 1 && trues + unknown >= 1
            }
            Constraint::NoOverlap { intervals } => {
                let placed: Vec<(i64, i64)> = intervals
                    .iter()
                    .filter_map(|&i| {
                        let iv = &self.model.intervals()[i.index()];
                        let present = match iv.presence {
                            Some(p) => self.bools[p.index()] == Some(true),
                            None => true,
                        };
                        match (present, self.ints[iv.start.index()], self.ints[iv.end.index()]) {
                            (true, Some(s), Some(e)) => Some((s, e)),
                            _ => None,
                        }
                    })
                    .collect();
                for (k, &(s1, e1)) in placed.iter().enumerate() {
                    for &(s2, e2) in &placed[k + 1..] {
                        if s1 < e2 && s2 < e1 {
                            return false;
                        }
                    }
                }
                true
            }
            Constraint::MaxEquality { target, vars } => {
                let (t_lo, t_hi) = self.range(*target);
                let mut max_lo = i64::MIN;
                let mut max_hi = i64::MIN;
                for &v in vars {
                    let (lo, hi) = self.range(v);
                    max_lo = max_lo.max(lo);
                    max_hi = max_hi.max(hi);
                }
                // max(vars) ranges over [max_lo, max_hi]; it must meet [t_lo, t_hi].
                max_lo <= t_hi && max_hi >= t_lo
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(model: &CpModel) -> CpSolution {
        BacktrackingSolver::new().solve(model, &SolverConfig::default())
    }

    #[test]
    fn test_no_overlap_minimizes_makespan() {
        let mut model = CpModel::new("test", 10);
        let s1 = model.new_int_var("s1", 0, 10);
        let e1 = model.new_int_var("e1", 0, 10);
        let s2 = model.new_int_var("s2", 0, 10);
        let e2 = model.new_int_var("e2", 0, 10);
        let a = model.new_interval("a", s1, e1, 3);
        let b = model.new_interval("b", s2, e2, 2);
        model.add_no_overlap(vec![a, b]);
        let makespan = model.new_int_var("makespan", 0, 10);
        model.add_max_equality(makespan, vec![e1, e2]);
        model.minimize(makespan);

        let solution = solve(&model);
        assert_eq!(solution.status, SolverStatus::Optimal);
        assert_eq!(solution.objective_value, Some(5));

        let (s1, e1, s2, e2) = (
            solution.value(s1).unwrap(),
            solution.value(e1).unwrap(),
            solution.value(s2).unwrap(),
            solution.value(e2).unwrap(),
        );
        assert_eq!(e1 - s1, 3);
        assert_eq!(e2 - s2, 2);
        assert!(e1 <= s2 || e2 <= s1);
    }

    #[test]
    fn test_optional_intervals_pick_free_resource() {
        // Two unit tasks, each may use r1 or r2; both r1 intervals cannot overlap.
        let mut model = CpModel::new("test", 4);
        let mut ends = Vec::new();
        let mut on_r1 = Vec::new();
        for k in 0..2 {
            let s = model.new_int_var(format!("s{k}"), 0, 4);
            let e = model.new_int_var(format!("e{k}"), 0, 4);
            let p1 = model.new_bool_var(format!("p{k}_r1"));
            let p2 = model.new_bool_var(format!("p{k}_r2"));
            on_r1.push(model.new_optional_interval(format!("i{k}_r1"), s, e, 1, p1));
            model.new_optional_interval(format!("i{k}_r2"), s, e, 1, p2);
            model.add_exactly_one(vec![p1.lit(), p2.lit()]);
            model.add_linear(vec![(1, e), (-1, s)], 1, 1);
            ends.push(e);
        }
        model.add_no_overlap(on_r1);
        let makespan = model.new_int_var("makespan", 0, 4);
        model.add_max_equality(makespan, ends);
        model.minimize(makespan);

        let solution = solve(&model);
        assert_eq!(solution.status, SolverStatus::Optimal);
        assert_eq!(solution.objective_value, Some(1));
    }

    #[test]
    fn test_enforced_disjunction() {
        // x in [0, 5], b ? x <= 1 : x >= 4, minimize -x via maximize.
        let mut model = CpModel::new("test", 5);
        let x = model.new_int_var("x", 0, 5);
        let b = model.new_bool_var("b");
        model.add_linear_if(vec![(1, x)], i64::MIN, 1, vec![b.lit()]);
        model.add_linear_if(vec![(1, x)], 4, i64::MAX, vec![!b]);
        model.add_linear(vec![(1, x)], 2, 4);
        model.maximize(x);

        let solution = solve(&model);
        assert_eq!(solution.status, SolverStatus::Optimal);
        assert_eq!(solution.value(x), Some(4));
        assert_eq!(solution.bool_value(b), Some(false));
    }

    #[test]
    fn test_infeasible() {
        let mut model = CpModel::new("test", 2);
        let s1 = model.new_int_var("s1", 0, 2);
        let e1 = model.new_int_var("e1", 0, 2);
        let s2 = model.new_int_var("s2", 0, 2);
        let e2 = model.new_int_var("e2", 0, 2);
        let a = model.new_interval("a", s1, e1, 2);
        let b = model.new_interval("b", s2, e2, 1);
        model.add_no_overlap(vec![a, b]);

        let solution = solve(&model);
        assert_eq!(solution.status, SolverStatus::Infeasible);
        assert!(!solution.has_assignment());
    }

    #[test]
    fn test_without_objective_first_solution_is_optimal() {
        let mut model = CpModel::new("test", 3);
        let x = model.new_int_var("x", 0, 3);
        model.add_linear(vec![(1, x)], 2, 3);

        let solution = solve(&model);
        assert_eq!(solution.status, SolverStatus::Optimal);
        assert_eq!(solution.value(x), Some(2));
        assert_eq!(solution.objective_value, None);
    }

    #[test]
    fn test_stop_after_first() {
        let mut model = CpModel::new("test", 5);
        let x = model.new_int_var("x", 0, 5);
        model.maximize(x);

        let config = SolverConfig::default().with_stop_after_first(true);
        let solution = BacktrackingSolver::new().solve(&model, &config);
        assert_eq!(solution.status, SolverStatus::Feasible);
        assert_eq!(solution.value(x), Some(0));
    }

    #[test]
    fn test_zero_time_limit_times_out() {
        let mut model = CpModel::new("test", 5);
        let x = model.new_int_var("x", 0, 5);
        model.minimize(x);

        let config = SolverConfig::default().with_time_limit_ms(0);
        let solution = BacktrackingSolver::new().solve(&model, &config);
        assert_eq!(solution.status, SolverStatus::Timeout);
        assert!(!solution.has_assignment());
    }

    #[test]
    fn test_invalid_model() {
        let mut model = CpModel::new("test", 5);
        model.add_exactly_one(vec![]);

        let solution = solve(&model);
        assert_eq!(solution.status, SolverStatus::ModelInvalid);
    }
}
