//! CP model definition.

use super::variables::{BoolVar, BoolVarId, IntVar, IntVarId, IntervalId, IntervalVar, Literal};

/// A constraint in the CP model.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// `lower <= sum(coef * var) <= upper`, applied only when every literal
    /// in `enforced_by` is true (always applied if the list is empty).
    Linear {
        terms: Vec<(i64, IntVarId)>,
        lower: i64,
        upper: i64,
        enforced_by: Vec<Literal>,
    },

    /// Exactly one of the literals is true.
    ExactlyOne { literals: Vec<Literal> },

    /// Present intervals in the set do not overlap in time.
    NoOverlap { intervals: Vec<IntervalId> },

    /// `target = max(vars)`.
    MaxEquality { target: IntVarId, vars: Vec<IntVarId> },
}

/// Objective function for the CP model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    Minimize(IntVarId),
    Maximize(IntVarId),
}

impl Objective {
    pub fn var(&self) -> IntVarId {
        match *self {
            Objective::Minimize(v) | Objective::Maximize(v) => v,
        }
    }
}

/// Structural problems found by [`CpModel::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("undefined integer variable #{0}")]
    UndefinedIntVar(usize),
    #[error("undefined boolean variable #{0}")]
    UndefinedBoolVar(usize),
    #[error("undefined interval #{0}")]
    UndefinedInterval(usize),
    #[error("variable {name:?} has empty domain [{min}, {max}]")]
    EmptyDomain { name: String, min: i64, max: i64 },
    #[error("interval {name:?} has negative size {size}")]
    NegativeSize { name: String, size: i64 },
    #[error("linear constraint with empty range [{lower}, {upper}]")]
    EmptyRange { lower: i64, upper: i64 },
    #[error("exactly-one constraint without literals")]
    EmptyExactlyOne,
    #[error("max-equality constraint without operands")]
    EmptyMaxEquality,
}

/// A constraint programming model.
///
/// Variables live in arenas and are referenced by typed handles, so a
/// model can be handed to any [`super::CpSolver`] without name lookups.
///
/// # Examples
///
/// ```
/// use u_fjsp::cp::CpModel;
///
/// let mut model = CpModel::new("example", 10);
/// let s1 = model.new_int_var("s1", 0, 10);
/// let e1 = model.new_int_var("e1", 0, 10);
/// let s2 = model.new_int_var("s2", 0, 10);
/// let e2 = model.new_int_var("e2", 0, 10);
/// let a = model.new_interval("a", s1, e1, 3);
/// let b = model.new_interval("b", s2, e2, 4);
/// model.add_no_overlap(vec![a, b]);
/// let makespan = model.new_int_var("makespan", 0, 10);
/// model.add_max_equality(makespan, vec![e1, e2]);
/// model.minimize(makespan);
/// assert!(model.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CpModel {
    pub name: String,
    /// Planning horizon (maximum time).
    pub horizon: i64,
    int_vars: Vec<IntVar>,
    bool_vars: Vec<BoolVar>,
    intervals: Vec<IntervalVar>,
    constraints: Vec<Constraint>,
    objective: Option<Objective>,
}

impl CpModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>, horizon: i64) -> Self {
        Self {
            name: name.into(),
            horizon,
            int_vars: Vec::new(),
            bool_vars: Vec::new(),
            intervals: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    pub fn new_int_var(&mut self, name: impl Into<String>, min: i64, max: i64) -> IntVarId {
        self.int_vars.push(IntVar::new(name, min, max));
        IntVarId(self.int_vars.len() - 1)
    }

    pub fn new_bool_var(&mut self, name: impl Into<String>) -> BoolVarId {
        self.bool_vars.push(BoolVar::new(name));
        BoolVarId(self.bool_vars.len() - 1)
    }

    /// Adds an always-present interval.
    pub fn new_interval(
        &mut self,
        name: impl Into<String>,
        start: IntVarId,
        end: IntVarId,
        size: i64,
    ) -> IntervalId {
        self.push_interval(name.into(), start, end, size, None)
    }

    /// Adds an interval that exists only when `presence` is true.
    pub fn new_optional_interval(
        &mut self,
        name: impl Into<String>,
        start: IntVarId,
        end: IntVarId,
        size: i64,
        presence: BoolVarId,
    ) -> IntervalId {
        self.push_interval(name.into(), start, end, size, Some(presence))
    }

    fn push_interval(
        &mut self,
        name: String,
        start: IntVarId,
        end: IntVarId,
        size: i64,
        presence: Option<BoolVarId>,
    ) -> IntervalId {
        self.intervals.push(IntervalVar {
            name,
            start,
            end,
            size,
            presence,
        });
        IntervalId(self.intervals.len() - 1)
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Convenience: `lower <= sum(terms) <= upper`.
    pub fn add_linear(&mut self, terms: Vec<(i64, IntVarId)>, lower: i64, upper: i64) {
        self.add_linear_if(terms, lower, upper, Vec::new());
    }

    /// Convenience: linear constraint active only when all `enforced_by` hold.
    pub fn add_linear_if(
        &mut self,
        terms: Vec<(i64, IntVarId)>,
        lower: i64,
        upper: i64,
        enforced_by: Vec<Literal>,
    ) {
        self.add_constraint(Constraint::Linear {
            terms,
            lower,
            upper,
            enforced_by,
        });
    }

    /// Convenience: `after >= before + delay`.
    pub fn add_precedence(&mut self, before: IntVarId, after: IntVarId, delay: i64) {
        self.add_linear(vec![(1, after), (-1, before)], delay, i64::MAX);
    }

    pub fn add_exactly_one(&mut self, literals: Vec<Literal>) {
        self.add_constraint(Constraint::ExactlyOne { literals });
    }

    pub fn add_no_overlap(&mut self, intervals: Vec<IntervalId>) {
        self.add_constraint(Constraint::NoOverlap { intervals });
    }

    pub fn add_max_equality(&mut self, target: IntVarId, vars: Vec<IntVarId>) {
        self.add_constraint(Constraint::MaxEquality { target, vars });
    }

    pub fn minimize(&mut self, var: IntVarId) {
        self.objective = Some(Objective::Minimize(var));
    }

    pub fn maximize(&mut self, var: IntVarId) {
        self.objective = Some(Objective::Maximize(var));
    }

    #[inline]
    pub fn objective(&self) -> Option<Objective> {
        self.objective
    }

    #[inline]
    pub fn int_vars(&self) -> &[IntVar] {
        &self.int_vars
    }

    #[inline]
    pub fn bool_vars(&self) -> &[BoolVar] {
        &self.bool_vars
    }

    #[inline]
    pub fn intervals(&self) -> &[IntervalVar] {
        &self.intervals
    }

    #[inline]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn int_var(&self, id: IntVarId) -> Option<&IntVar> {
        self.int_vars.get(id.0)
    }

    pub fn bool_var(&self, id: BoolVarId) -> Option<&BoolVar> {
        self.bool_vars.get(id.0)
    }

    pub fn interval(&self, id: IntervalId) -> Option<&IntervalVar> {
        self.intervals.get(id.0)
    }

    pub fn int_var_count(&self) -> usize {
        self.int_vars.len()
    }

    pub fn bool_var_count(&self) -> usize {
        self.bool_vars.len()
    }

    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Validates the model for consistency.
    ///
    /// Checks that every referenced handle exists and that domains and
    /// ranges are non-empty.
    pub fn validate(&self) -> Result<(), ModelError> {
        for v in &self.int_vars {
            if v.min > v.max {
                return Err(ModelError::EmptyDomain {
                    name: v.name.clone(),
                    min: v.min,
                    max: v.max,
                });
            }
        }
        for iv in &self.intervals {
            self.check_int(iv.start)?;
            self.check_int(iv.end)?;
            if let Some(p) = iv.presence {
                self.check_bool(p)?;
            }
            if iv.size < 0 {
                return Err(ModelError::NegativeSize {
                    name: iv.name.clone(),
                    size: iv.size,
                });
            }
        }
        for constraint in &self.constraints {
            match constraint {
                Constraint::Linear {
                    terms,
                    lower,
                    upper,
                    enforced_by,
                } => {
                    if lower > upper {
                        return Err(ModelError::EmptyRange {
                            lower: *lower,
                            upper: *upper,
                        });
                    }
                    for &(_, v) in terms {
                        self.check_int(v)?;
                    }
                    for lit in enforced_by {
                        self.check_bool(lit.var)?;
                    }
                }
                Constraint::ExactlyOne { literals } => {
                    if literals.is_empty() {
                        return Err(ModelError::EmptyExactlyOne);
                    }
                    for lit in literals {
                        self.check_bool(lit.var)?;
                    }
                }
                Constraint::NoOverlap { intervals } => {
                    for &i in intervals {
                        if i.0 >= self.intervals.len() {
                            return Err(ModelError::UndefinedInterval(i.0));
                        }
                    }
                }
                Constraint::MaxEquality { target, vars } => {
                    if vars.is_empty() {
                        return Err(ModelError::EmptyMaxEquality);
                    }
                    self.check_int(*target)?;
                    for &v in vars {
                        self.check_int(v)?;
                    }
                }
            }
        }
        if let Some(obj) = self.objective {
            self.check_int(obj.var())?;
        }
        Ok(())
    }

    fn check_int(&self, id: IntVarId) -> Result<(), ModelError> {
        if id.0 < self.int_vars.len() {
            Ok(())
        } else {
            Err(ModelError::UndefinedIntVar(id.0))
        }
    }

    fn check_bool(&self, id: BoolVarId) -> Result<(), ModelError> {
        if id.0 < self.bool_vars.len() {
            Ok(())
        } else {
            Err(ModelError::UndefinedBoolVar(id.0))
        }
    }
}
