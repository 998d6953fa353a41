//! Errors of the priority-driven path.

/// A priority vector whose length does not match the flattened operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("priority vector has length {actual}, expected {expected}")]
pub struct MalformedInput {
    pub expected: usize,
    pub actual: usize,
}

impl MalformedInput {
    /// Checks `actual` against `expected`.
    pub(crate) fn check(expected: usize, actual: usize) -> Result<(), Self> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self { expected, actual })
        }
    }
}
