//! CP variable types and their arena handles.

use std::ops::Not;

/// Handle of an integer variable inside a [`super::CpModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntVarId(pub(crate) usize);

/// Handle of a boolean variable inside a [`super::CpModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoolVarId(pub(crate) usize);

/// Handle of an interval variable inside a [`super::CpModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntervalId(pub(crate) usize);

impl IntVarId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl BoolVarId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }

    /// The positive literal of this variable.
    #[inline]
    pub fn lit(self) -> Literal {
        Literal {
            var: self,
            negated: false,
        }
    }
}

impl IntervalId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A boolean variable or its negation.
///
/// Used as enforcement condition: a constraint enforced by a list of
/// literals only applies when all of them are true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Literal {
    pub var: BoolVarId,
    pub negated: bool,
}

impl Literal {
    /// Truth value of the literal given the value of its variable.
    #[inline]
    pub fn eval(self, value: bool) -> bool {
        value != self.negated
    }
}

impl From<BoolVarId> for Literal {
    fn from(var: BoolVarId) -> Self {
        var.lit()
    }
}

impl Not for BoolVarId {
    type Output = Literal;

    fn not(self) -> Literal {
        Literal {
            var: self,
            negated: true,
        }
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Literal {
        Literal {
            var: self.var,
            negated: !self.negated,
        }
    }
}

/// An integer variable with a domain [min, max].
#[derive(Debug, Clone)]
pub struct IntVar {
    /// Variable name (for diagnostics only).
    pub name: String,
    pub min: i64,
    pub max: i64,
}

impl IntVar {
    pub fn new(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }

    /// Whether this variable is fixed to a single value.
    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    /// Domain size (max - min + 1).
    pub fn domain_size(&self) -> i64 {
        self.max - self.min + 1
    }
}

/// A boolean variable (true/false decision).
#[derive(Debug, Clone)]
pub struct BoolVar {
    pub name: String,
}

impl BoolVar {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An interval `[start, end)` with fixed size.
///
/// The solver maintains `end = start + size` whenever the interval is
/// present. An optional interval (one with a `presence` literal) only takes
/// part in no-overlap constraints when its presence variable is true.
#[derive(Debug, Clone)]
pub struct IntervalVar {
    pub name: String,
    pub start: IntVarId,
    pub end: IntVarId,
    pub size: i64,
    pub presence: Option<BoolVarId>,
}

impl IntervalVar {
    #[inline]
    pub fn is_optional(&self) -> bool {
        self.presence.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_var() {
        let v = IntVar::new("x", 0, 10);
        assert_eq!(v.domain_size(), 11);
        assert!(!v.is_fixed());
        assert!(IntVar::new("y", 5, 5).is_fixed());
    }

    #[test]
    fn test_literals() {
        let b = BoolVarId(3);
        let pos = b.lit();
        let neg = !b;

        assert_eq!(pos.var, b);
        assert!(!pos.negated);
        assert!(neg.negated);
        assert_eq!(!neg, pos);
        assert_eq!(Literal::from(b), pos);

        assert!(pos.eval(true));
        assert!(!pos.eval(false));
        assert!(neg.eval(false));
    }

    #[test]
    fn test_optional_interval() {
        let iv = IntervalVar {
            name: "op".into(),
            start: IntVarId(0),
            end: IntVarId(1),
            size: 4,
            presence: Some(BoolVarId(0)),
        };
        assert!(iv.is_optional());
    }
}
