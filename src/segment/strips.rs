//! Segmented sieve over vertical strips of the quadrant.
//!
//! Columns `1..=⌊√X⌋` are cut into strips whose rectangles hold at most
//! `block_area` cells. Every strip is sieved as a [`WindowSieve`] with one
//! shared bootstrap, so memory stays bounded by the strip size and strips
//! are independent units of parallel work.

use itertools::Itertools;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::Serialize;

use crate::domain::bound::NormBound;
use crate::domain::gint::Gint;
use crate::segment::window::{Bootstrap, Window, WindowSieve};
use crate::sieve_error::{SieveError, SieveResult, reserve_exact};

/// Default cells per strip.
pub const DEFAULT_BLOCK_AREA: usize = 1 << 22;

/// Progress report handed to the hook of [`SegmentedSieve::run_with`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StripProgress {
    pub completed: usize,
    pub total: usize,
    /// Primes found so far.
    pub found: usize,
}

#[derive(Copy, Clone, Debug)]
pub struct SegmentedSieve {
    bound: NormBound,
    block_area: usize,
    parallel: bool,
}

impl SegmentedSieve {
    pub fn new(bound: NormBound) -> Self {
        SegmentedSieve { bound, block_area: DEFAULT_BLOCK_AREA, parallel: true }
    }

    /// Cells per strip; a strip is always at least one column wide.
    pub fn block_area(mut self, cells: usize) -> Self {
        self.block_area = cells.max(1);
        self
    }

    /// Sieve strips on the rayon pool when the `rayon` feature is enabled.
    pub fn parallel(mut self, on: bool) -> Self {
        self.parallel = on;
        self
    }

    /// The strip partition of columns `1..=⌊√X⌋`.
    pub fn strips(&self) -> SieveResult<Vec<Window>> {
        let n = self.strip_walk().count() as u128;
        let mut out = reserve_exact(n, n)?;
        out.extend(self.strip_walk());
        Ok(out)
    }

    fn strip_walk(&self) -> impl Iterator<Item = Window> + '_ {
        let r = self.bound.radius();
        let mut a = 1u32;
        std::iter::from_fn(move || {
            if a > r {
                return None;
            }
            let height = self.bound.column_top(a) + 1;
            let width = (self.block_area / height as usize).max(1).min((r - a + 1) as usize) as u32;
            let strip = Window::strip(a, width, height);
            a += width;
            Some(strip)
        })
    }

    fn merge(per_strip: Vec<Vec<Gint>>) -> SieveResult<Vec<Gint>> {
        let n = per_strip.iter().map(|v| v.len() as u128).sum::<u128>();
        let mut out = reserve_exact(n, n)?;
        out.extend(per_strip.into_iter().kmerge());
        Ok(out)
    }

    fn sieve_strip(&self, window: Window, bootstrap: &Bootstrap) -> SieveResult<Vec<Gint>> {
        let x = self.bound.get();
        let mut primes = WindowSieve::run(window, bootstrap)?.primes();
        primes.retain(|g| g.norm() <= x);
        Ok(primes)
    }

    fn sieve_all(&self, strips: &[Window], bootstrap: &Bootstrap) -> SieveResult<Vec<Vec<Gint>>> {
        log::debug!(
            "segmented sieve to {}: {} strips of at most {} cells (parallel {})",
            self.bound,
            strips.len(),
            self.block_area,
            self.parallel
        );
        #[cfg(feature = "rayon")]
        if self.parallel {
            return strips
                .par_iter()
                .map(|w| self.sieve_strip(*w, bootstrap))
                .collect();
        }
        strips.iter().map(|w| self.sieve_strip(*w, bootstrap)).collect()
    }

    /// First-quadrant primes sorted by norm then larger real part.
    pub fn primes(&self) -> SieveResult<Vec<Gint>> {
        let bootstrap = Bootstrap::new(self.bound.sqrt_bound())?;
        let strips = self.strips()?;
        let per_strip = self.sieve_all(&strips, &bootstrap)?;
        SegmentedSieve::merge(per_strip)
    }

    /// Number of Gaussian primes in the whole plane.
    pub fn count(&self) -> SieveResult<u64> {
        let bootstrap = Bootstrap::new(self.bound.sqrt_bound())?;
        let strips = self.strips()?;
        let per_strip = self.sieve_all(&strips, &bootstrap)?;
        Ok(4 * per_strip.iter().map(|v| v.len() as u64).sum::<u64>())
    }

    /// Serial run that reports progress after every strip. Returning `false`
    /// from `hook` stops the run with [`SieveError::Cancelled`].
    pub fn run_with<F>(&self, mut hook: F) -> SieveResult<Vec<Gint>>
    where
        F: FnMut(StripProgress) -> bool,
    {
        let bootstrap = Bootstrap::new(self.bound.sqrt_bound())?;
        let strips = self.strips()?;
        let total = strips.len();
        let mut per_strip = reserve_exact(total as u128, total as u128)?;
        let mut found = 0;
        for (i, w) in strips.iter().enumerate() {
            let primes = self.sieve_strip(*w, &bootstrap)?;
            found += primes.len();
            per_strip.push(primes);
            let progress = StripProgress { completed: i + 1, total, found };
            if !hook(progress) && i + 1 < total {
                log::debug!("segmented sieve cancelled after {} of {} strips", i + 1, total);
                return Err(SieveError::Cancelled { completed: i + 1, total });
            }
        }
        SegmentedSieve::merge(per_strip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::base::BaseSieve;

    fn bound(x: u64) -> NormBound {
        NormBound::new(x).unwrap()
    }

    #[test]
    fn strips_partition_the_columns() {
        let seg = SegmentedSieve::new(bound(10_000)).block_area(500);
        let strips = seg.strips().unwrap();
        assert_eq!(strips.first().map(|w| w.x()), Some(1));
        for pair in strips.windows(2) {
            assert_eq!(pair[0].x() + pair[0].width(), pair[1].x());
        }
        let last = strips.last().unwrap();
        assert_eq!(last.x() + last.width() - 1, 100);
        assert!(strips.iter().all(|w| w.width() == 1 || (w.width() * w.height()) as usize <= 500));
    }

    #[test]
    fn matches_base_sieve_serial_and_parallel() {
        let base = BaseSieve::new(bound(20_000)).run().unwrap();
        for parallel in [false, true] {
            let seg = SegmentedSieve::new(bound(20_000)).block_area(700).parallel(parallel);
            assert_eq!(seg.primes().unwrap(), base.primes());
            assert_eq!(seg.count().unwrap(), base.count());
        }
    }

    #[test]
    fn empty_bounds_have_no_strips() {
        assert!(SegmentedSieve::new(bound(0)).strips().unwrap().is_empty());
        assert_eq!(SegmentedSieve::new(bound(1)).count().unwrap(), 0);
        assert_eq!(SegmentedSieve::new(bound(2)).count().unwrap(), 4);
    }

    #[test]
    fn hook_can_cancel() {
        let seg = SegmentedSieve::new(bound(10_000)).block_area(300);
        let mut calls = 0;
        let err = seg
            .run_with(|p| {
                calls += 1;
                p.completed < 2
            })
            .unwrap_err();
        assert_eq!(calls, 2);
        assert!(matches!(err, SieveError::Cancelled { completed: 2, .. }));

        let mut last = None;
        let all = seg.run_with(|p| {
            last = Some(p);
            true
        });
        assert_eq!(all.unwrap().len() as u64 * 4, 4928);
        let last = last.unwrap();
        assert_eq!(last.completed, last.total);
    }
}
