//! SieveError: Unified error type for gaussian-sieve public APIs
//!
//! Every public entry point validates its arguments up front and reports
//! problems through this type before any sieve storage is allocated.

use thiserror::Error;

/// Unified error type for sieve operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SieveError {
    /// The norm bound is negative or exceeds the representable range.
    #[error("norm bound {value} is outside the supported range [0, {max}]")]
    InvalidBound { value: i128, max: u64 },
    /// A sector, window or query parameter describes an empty or malformed region.
    #[error("invalid region: {0}")]
    InvalidRegion(String),
    /// An algorithm invariant failed; the computation was aborted.
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),
    /// The explored moat component reached the norm bound, so no moat was found.
    #[error("component touched norm bound {bound} without a moat of jump size {jump}")]
    MoatNotFound { jump: f64, bound: u64 },
    /// The requested storage could not be reserved.
    #[error("sieve storage of {cells} cells cannot be allocated")]
    StorageTooLarge { cells: u128 },
    /// A progress hook stopped a segmented run between strips.
    #[error("sieve cancelled after {completed} of {total} strips")]
    Cancelled { completed: usize, total: usize },
}

impl SieveError {
    pub(crate) fn region(msg: impl Into<String>) -> Self {
        SieveError::InvalidRegion(msg.into())
    }

    pub(crate) fn inconsistency(msg: impl Into<String>) -> Self {
        SieveError::InternalInconsistency(msg.into())
    }
}

/// Convenience alias used throughout the crate.
pub type SieveResult<T> = Result<T, SieveError>;

/// Empty vector with room for exactly `len` items.
///
/// A failed reservation is reported as [`SieveError::StorageTooLarge`] for
/// `cells` cells instead of aborting.
pub(crate) fn reserve_exact<T>(len: u128, cells: u128) -> SieveResult<Vec<T>> {
    let too_large = || SieveError::StorageTooLarge { cells };
    let len = usize::try_from(len).map_err(|_| too_large())?;
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| too_large())?;
    Ok(v)
}
