//! Structural self-checks for sieve storage.
//!
//! Checks run after allocation in debug builds. Release builds compile them
//! out unless `strict-invariants` or `check-invariants` is enabled.

use crate::sieve_error::{SieveError, SieveResult};

/// Trait for validating sieve storage invariants.
pub trait DebugInvariants {
    /// Validate invariants and return the first violation encountered.
    fn validate_invariants(&self) -> SieveResult<()>;

    /// Panic on the first violation when invariant checking is enabled.
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "sieve storage");
    }
}

/// Turn a failed condition into [`SieveError::InternalInconsistency`].
#[inline]
pub(crate) fn ensure(cond: bool, what: impl FnOnce() -> String) -> SieveResult<()> {
    if cond {
        Ok(())
    } else {
        Err(SieveError::inconsistency(what()))
    }
}

/// Run a fallible check and panic on error when invariant checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
