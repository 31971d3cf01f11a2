//! Self-bootstrapping sieve over a quadrant or octant array.

use serde::Serialize;

use crate::debug_invariants::{DebugInvariants, ensure};
use crate::domain::bound::NormBound;
use crate::domain::candidates::SortedCandidates;
use crate::domain::gint::{GaussianInt, Gint};
use crate::engine::array::SieveArray;
use crate::sieve_error::SieveResult;
use crate::symmetry::Symmetry;
use crate::wheel::{WHEEL, Wheel};

/// Counters collected while sieving.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SieveStats {
    /// Sieving primes whose multiples were crossed off.
    pub sieving_primes: usize,
    /// Largest norm among them.
    pub largest_sieving_norm: u64,
    /// Bytes of sieve storage.
    pub storage_bytes: usize,
}

/// Builder for a sieve that discovers its own sieving primes.
///
/// Every point of norm at most `X` in the canonical region gets one cell.
/// Candidates are visited in ascending norm up to `⌊√X⌋`; each one still
/// marked when reached is prime and has its multiples crossed off.
///
/// ```rust
/// # use gaussian_sieve::domain::{Gint, NormBound};
/// # use gaussian_sieve::engine::BaseSieve;
/// let region = BaseSieve::new(NormBound::new(10)?).run()?;
/// assert_eq!(region.primes(), vec![Gint::new(1, 1), Gint::new(2, 1), Gint::new(1, 2), Gint::new(3, 0)]);
/// assert_eq!(region.count(), 16);
/// # Ok::<(), gaussian_sieve::SieveError>(())
/// ```
#[derive(Copy, Clone, Debug)]
pub struct BaseSieve {
    bound: NormBound,
    symmetry: Symmetry,
    wheel: bool,
}

impl BaseSieve {
    pub fn new(bound: NormBound) -> Self {
        BaseSieve { bound, symmetry: Symmetry::Quadrant, wheel: false }
    }

    pub fn symmetry(mut self, symmetry: Symmetry) -> Self {
        self.symmetry = symmetry;
        self
    }

    /// Clear every cell divisible by a prime above 2 or 5 before sieving.
    pub fn wheel(mut self, on: bool) -> Self {
        self.wheel = on;
        self
    }

    pub fn run(self) -> SieveResult<SievedRegion> {
        let storage = SieveArray::reserve(self.symmetry.cells_bound(self.bound))?;
        let mut array = SieveArray::with_storage(self.symmetry.shape(self.bound)?, storage)?;
        for (a, b) in [(0, 0), (1, 0), (0, 1)] {
            array.clear(a, b);
        }
        if self.wheel {
            WHEEL.prefilter(&mut array);
        }

        let candidates = SortedCandidates::from_shape(&self.symmetry.shape(self.bound.sqrt_bound())?)?;
        let mut stats = SieveStats { storage_bytes: array.storage_bytes(), ..SieveStats::default() };

        for &g in candidates.iter().skip(candidates.first_nonunit()) {
            if !array.get(g.a, g.b) {
                continue;
            }
            if self.wheel && Wheel::is_wheel_prime(g) {
                continue;
            }
            log::trace!("crossing off multiples of {}", g);
            for prime in self.symmetry.sieving_primes(g) {
                ensure(prime.has_consistent_type(), || {
                    format!("sieving prime {} lies above {}, which has the wrong residue mod 4", g, prime.rational_prime())
                })?;
                prime.cross_off(&mut array);
                stats.sieving_primes += 1;
            }
            for (i, prime) in self.symmetry.sieving_primes(g).enumerate() {
                let marked = prime.restore(&mut array);
                ensure(marked || i > 0, || format!("sieving prime {} has no cell to re-mark", g))?;
            }
            stats.largest_sieving_norm = g.norm();
        }

        log::debug!(
            "base sieve to {} ({:?}, wheel {}): {} sieving primes, {} bytes",
            self.bound,
            self.symmetry,
            self.wheel,
            stats.sieving_primes,
            stats.storage_bytes
        );

        let region = SievedRegion { bound: self.bound, symmetry: self.symmetry, array, stats };
        region.debug_assert_invariants();
        Ok(region)
    }
}

/// Result of a completed [`BaseSieve`] run.
#[derive(Clone, Debug)]
pub struct SievedRegion {
    bound: NormBound,
    symmetry: Symmetry,
    array: SieveArray,
    stats: SieveStats,
}

impl SievedRegion {
    #[inline]
    pub fn bound(&self) -> NormBound {
        self.bound
    }

    #[inline]
    pub fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    #[inline]
    pub fn array(&self) -> &SieveArray {
        &self.array
    }

    #[inline]
    pub fn stats(&self) -> SieveStats {
        self.stats
    }

    /// Marked canonical cells (`a ≥ 1`), column by column.
    pub fn canonical(&self) -> impl Iterator<Item = Gint> + '_ {
        self.array
            .columns()
            .filter(|&a| a >= 1)
            .flat_map(move |a| self.array.marked_in_column(a))
    }

    /// First-quadrant primes `a ≥ 1, b ≥ 0`, sorted by norm then larger `a`.
    pub fn primes(&self) -> Vec<Gint> {
        let mut out: Vec<Gint> = self
            .canonical()
            .flat_map(|g| self.symmetry.expand(g))
            .collect();
        out.sort_unstable();
        out
    }

    /// Number of Gaussian primes in the whole plane, four per quadrant point.
    pub fn count(&self) -> u64 {
        4 * self
            .canonical()
            .map(|g| self.symmetry.multiplicity(g))
            .sum::<u64>()
    }

    /// Primality of `z`, or `None` when `z` lies beyond the bound.
    pub fn is_prime(&self, z: GaussianInt) -> Option<bool> {
        if z.norm() > u128::from(self.bound.get()) {
            return None;
        }
        Some(
            self.symmetry
                .canonicalize(z)
                .is_some_and(|g| self.array.get(g.a, g.b)),
        )
    }

    pub fn into_array(self) -> SieveArray {
        self.array
    }
}

impl DebugInvariants for SievedRegion {
    fn validate_invariants(&self) -> SieveResult<()> {
        self.array.validate_invariants()?;
        for (a, b) in [(0, 0), (1, 0)] {
            ensure(!self.array.get(a, b), || format!("unit cell ({}, {}) is marked prime", a, b))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(x: u64, symmetry: Symmetry, wheel: bool) -> SievedRegion {
        BaseSieve::new(NormBound::new(x).unwrap())
            .symmetry(symmetry)
            .wheel(wheel)
            .run()
            .unwrap()
    }

    #[test]
    fn tiny_bounds() {
        let expected = [0, 0, 4, 4, 4, 12, 12, 12, 12, 16, 16];
        for (x, &n) in expected.iter().enumerate() {
            for sym in [Symmetry::Quadrant, Symmetry::Octant] {
                for wheel in [false, true] {
                    assert_eq!(run(x as u64, sym, wheel).count(), n, "x = {x}, {sym:?}, wheel {wheel}");
                }
            }
        }
    }

    #[test]
    fn primes_up_to_ten() {
        let v = run(10, Symmetry::Octant, false).primes();
        assert_eq!(v, vec![Gint::new(1, 1), Gint::new(2, 1), Gint::new(1, 2), Gint::new(3, 0)]);
    }

    #[test]
    fn layouts_agree_at_ten_thousand() {
        let quad = run(10_000, Symmetry::Quadrant, false);
        assert_eq!(quad.count(), 4928);
        for (sym, wheel) in [(Symmetry::Quadrant, true), (Symmetry::Octant, false), (Symmetry::Octant, true)] {
            assert_eq!(run(10_000, sym, wheel).primes(), quad.primes());
        }
    }

    #[test]
    fn primality_queries_fold_into_region() {
        let region = run(100, Symmetry::Octant, false);
        assert_eq!(region.is_prime(GaussianInt::new(-1, 2)), Some(true));
        assert_eq!(region.is_prime(GaussianInt::new(0, -7)), Some(true));
        assert_eq!(region.is_prime(GaussianInt::new(5, 0)), Some(false));
        assert_eq!(region.is_prime(GaussianInt::new(0, 0)), Some(false));
        assert_eq!(region.is_prime(GaussianInt::new(10, 1)), None);
    }

    #[test]
    fn stats_record_sieving_primes() {
        let region = run(100, Symmetry::Quadrant, false);
        // (1,1) (2,1) (1,2) (3,0) have norm at most 10.
        assert_eq!(region.stats().sieving_primes, 4);
        assert_eq!(region.stats().largest_sieving_norm, 9);
    }
}
