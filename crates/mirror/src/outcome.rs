//! Tri-state result for operations that may partially succeed
//!
//! A ledger transaction that confirmed but whose mirror write-back failed is
//! neither a full success nor a failure: the caller's money moved, only the
//! cache is stale. `Outcome` makes that third state explicit instead of
//! hiding it in an ad hoc warning field.

/// Result of an operation whose ledger side succeeded but whose mirror side
/// may have degraded. Hard failures (nothing submitted, or the submission
/// itself reverted) stay `Err` at the call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Ledger and mirror both updated
    Complete(T),

    /// Ledger updated; mirror write-back failed or lagged
    Degraded { value: T, warning: String },
}

impl<T> Outcome<T> {
    /// The carried value, regardless of degradation.
    pub fn value(&self) -> &T {
        match self {
            Self::Complete(value) => value,
            Self::Degraded { value, .. } => value,
        }
    }

    /// The degradation warning, if any.
    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::Complete(_) => None,
            Self::Degraded { warning, .. } => Some(warning),
        }
    }

    /// Split into value and optional warning.
    pub fn into_parts(self) -> (T, Option<String>) {
        match self {
            Self::Complete(value) => (value, None),
            Self::Degraded { value, warning } => (value, Some(warning)),
        }
    }

    /// True when the mirror kept up with the ledger.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }
}
