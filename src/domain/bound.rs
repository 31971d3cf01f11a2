//! Norm bounds and exact integer square roots.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::gint::Gint;
use crate::sieve_error::{SieveError, SieveResult};

/// Largest accepted norm bound. Every point with norm up to this value has
/// coordinates below `2³²`, and norms of such points never overflow `u64`.
pub const MAX_NORM: u64 = i64::MAX as u64;

/// Floor of the square root of `n`, by Newton's iteration on integers.
///
/// The iteration starts above the root and stops as soon as successive
/// approximations stop decreasing, which happens exactly at `⌊√n⌋`.
pub fn isqrt(n: u64) -> u64 {
    let mut x = n;
    let mut y = n / 2 + (n & 1);
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

/// A validated norm bound `X`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NormBound(u64);

impl NormBound {
    /// Validates `x`, rejecting negative values and values above [`MAX_NORM`].
    pub fn new(x: impl Into<i128>) -> SieveResult<Self> {
        let x = x.into();
        if x < 0 || x > i128::from(MAX_NORM) {
            return Err(SieveError::InvalidBound { value: x, max: MAX_NORM });
        }
        Ok(NormBound(x as u64))
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// `⌊√X⌋`, the largest coordinate of any point within the bound.
    #[inline]
    pub fn radius(self) -> u32 {
        isqrt(self.0) as u32
    }

    /// The bound `⌊√X⌋` that sieving primes must stay within.
    #[inline]
    pub fn sqrt_bound(self) -> NormBound {
        NormBound(isqrt(self.0))
    }

    /// Largest `b` with `a² + b² ≤ X`; requires `a ≤ radius()`.
    #[inline]
    pub fn column_top(self, a: u32) -> u32 {
        let a = u64::from(a);
        debug_assert!(a * a <= self.0);
        isqrt(self.0 - a * a) as u32
    }

    #[inline]
    pub fn contains(self, g: Gint) -> bool {
        g.norm() <= self.0
    }
}

impl TryFrom<i128> for NormBound {
    type Error = SieveError;
    fn try_from(x: i128) -> SieveResult<Self> {
        NormBound::new(x)
    }
}

impl fmt::Display for NormBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
