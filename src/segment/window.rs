//! Rectangular windows of the first quadrant and their sieve.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::debug_invariants::ensure;
use crate::domain::bound::{MAX_NORM, NormBound, isqrt};
use crate::domain::gint::Gint;
use crate::domain::shape::Shape;
use crate::engine::array::SieveArray;
use crate::engine::base::BaseSieve;
use crate::engine::prime::SievingPrime;
use crate::sieve_error::{SieveError, SieveResult};

/// Axis-aligned rectangle `[x, x + width) × [y, y + height)`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl Window {
    /// Validates a window by its lower-left corner.
    ///
    /// Empty windows are an [`SieveError::InvalidRegion`]; windows whose far
    /// corner lies beyond [`MAX_NORM`] are an [`SieveError::InvalidBound`].
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> SieveResult<Self> {
        if width == 0 || height == 0 {
            return Err(SieveError::region(format!("window {}x{} is empty", width, height)));
        }
        let w = Window { x, y, width, height };
        let far = w.far_norm();
        if far > u128::from(MAX_NORM) {
            return Err(SieveError::InvalidBound { value: far as i128, max: MAX_NORM });
        }
        Ok(w)
    }

    /// Validates a window of the given size centred on `center`.
    ///
    /// The window spans `center - size/2 ..` on each axis and must not reach
    /// below the first quadrant.
    pub fn centered(center: (i64, i64), width: i64, height: i64) -> SieveResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(SieveError::region(format!("window {}x{} is empty", width, height)));
        }
        let below = || {
            SieveError::region(format!("window centred at {:?} reaches below the first quadrant", center))
        };
        let x = center.0.checked_sub(width / 2).filter(|&x| x >= 0).ok_or_else(below)?;
        let y = center.1.checked_sub(height / 2).filter(|&y| y >= 0).ok_or_else(below)?;
        let coord = |v: i64| {
            u32::try_from(v).map_err(|_| SieveError::InvalidBound {
                value: i128::from(v) * i128::from(v),
                max: MAX_NORM,
            })
        };
        Window::new(coord(x)?, coord(y)?, coord(width)?, coord(height)?)
    }

    /// Strip window without the far-corner check, for segments whose
    /// results are clipped to a norm bound afterwards.
    pub(crate) fn strip(x: u32, width: u32, height: u32) -> Self {
        Window { x, y: 0, width, height }
    }

    #[inline]
    pub fn x(&self) -> u32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> u32 {
        self.y
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn columns(&self) -> Range<u32> {
        self.x..self.x + self.width
    }

    #[inline]
    pub fn contains(&self, g: Gint) -> bool {
        self.columns().contains(&g.a) && (self.y..self.y + self.height).contains(&g.b)
    }

    fn far_norm(&self) -> u128 {
        let fx = u128::from(self.x) + u128::from(self.width) - 1;
        let fy = u128::from(self.y) + u128::from(self.height) - 1;
        fx * fx + fy * fy
    }

    /// Largest norm in the window, saturating at `u64::MAX`.
    pub fn max_norm(&self) -> u64 {
        u64::try_from(self.far_norm()).unwrap_or(u64::MAX)
    }

    /// Number of lattice points in the window.
    pub fn cell_count(&self) -> u128 {
        u128::from(self.width) * u128::from(self.height)
    }

    pub fn shape(&self) -> SieveResult<Shape> {
        Shape::rectangle(self.x, self.y, self.width, self.height)
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Window[{}..{}, {}..{}]",
            self.x,
            self.x + self.width,
            self.y,
            self.y + self.height
        )
    }
}

/// Sieving primes of norm up to a bound, ascending.
#[derive(Clone, Debug)]
pub struct Bootstrap {
    bound: NormBound,
    primes: Vec<SievingPrime>,
}

impl Bootstrap {
    /// Collects the first-quadrant primes of norm at most `bound`.
    pub fn new(bound: NormBound) -> SieveResult<Self> {
        let primes = BaseSieve::new(bound)
            .run()?
            .primes()
            .into_iter()
            .map(SievingPrime::from_canonical)
            .collect::<Vec<_>>();
        log::trace!("bootstrap to {} holds {} primes", bound, primes.len());
        Ok(Bootstrap { bound, primes })
    }

    /// Bootstrap sufficient to classify every point of norm at most `max_norm`.
    pub fn covering(max_norm: u64) -> SieveResult<Self> {
        Bootstrap::new(NormBound::new(isqrt(max_norm))?)
    }

    #[inline]
    pub fn bound(&self) -> NormBound {
        self.bound
    }

    #[inline]
    pub fn primes(&self) -> &[SievingPrime] {
        &self.primes
    }

    /// Largest norm whose points are classified exactly by these primes.
    pub fn exact_to(&self) -> u64 {
        let r = u128::from(self.bound.get()) + 1;
        u64::try_from(r * r - 1).unwrap_or(u64::MAX)
    }

    /// Rebuilds with a larger bound when `max_norm` is not yet covered.
    /// The covered norm at least quadruples on each rebuild.
    pub fn cover(&mut self, max_norm: u64) -> SieveResult<()> {
        if max_norm > self.exact_to() {
            *self = Bootstrap::covering(max_norm.max(self.exact_to().saturating_mul(4)))?;
        }
        Ok(())
    }
}

/// Sieve of one window with externally supplied primes.
///
/// Only canonical points (`a ≥ 1`) are reported, so the windows of a
/// partition of the quadrant report every prime exactly once.
#[derive(Clone, Debug)]
pub struct WindowSieve {
    window: Window,
    exact_to: u64,
    array: SieveArray,
}

impl WindowSieve {
    pub fn run(window: Window, bootstrap: &Bootstrap) -> SieveResult<Self> {
        let storage = SieveArray::reserve(window.cell_count())?;
        let mut array = SieveArray::with_storage(window.shape()?, storage)?;
        array.clear_column(0);
        array.clear(1, 0);

        let limit = isqrt(window.max_norm());
        let mut last = 0;
        for prime in bootstrap.primes().iter().take_while(|p| p.norm() <= limit) {
            ensure(prime.norm() >= last, || {
                format!("bootstrap primes out of order at {}", prime.generator())
            })?;
            last = prime.norm();
            prime.cross_off_by_columns(&mut array);
            prime.restore(&mut array);
        }

        let exact_to = window.max_norm().min(bootstrap.exact_to());
        log::trace!("{:?}: sieved with primes up to norm {}, exact to {}", window, last, exact_to);
        Ok(WindowSieve { window, exact_to, array })
    }

    #[inline]
    pub fn window(&self) -> Window {
        self.window
    }

    /// Norm up to which the classification is exact.
    #[inline]
    pub fn exact_to(&self) -> u64 {
        self.exact_to
    }

    /// Primes in the window, sorted by norm then larger real part.
    pub fn primes(&self) -> Vec<Gint> {
        let mut out: Vec<Gint> = self
            .array
            .marked()
            .filter(|g| g.norm() <= self.exact_to)
            .collect();
        out.sort_unstable();
        out
    }

    /// Primality of a canonical point `a ≥ 1`, or `None` when it lies
    /// outside the window or beyond [`WindowSieve::exact_to`].
    pub fn is_prime(&self, g: Gint) -> Option<bool> {
        (self.window.contains(g) && g.norm() <= self.exact_to).then(|| self.array.get(g.a, g.b))
    }

    /// Number of primes in the window.
    pub fn count(&self) -> u64 {
        if self.exact_to == self.window.max_norm() {
            self.array.count_marked()
        } else {
            self.array.marked().filter(|g| g.norm() <= self.exact_to).count() as u64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_primes(x: u32, y: u32, w: u32, h: u32) -> Vec<Gint> {
        let window = Window::new(x, y, w, h).unwrap();
        let boot = Bootstrap::covering(window.max_norm()).unwrap();
        WindowSieve::run(window, &boot).unwrap().primes()
    }

    #[test]
    fn rejects_empty_and_oversized() {
        assert!(matches!(Window::new(0, 0, 0, 5), Err(SieveError::InvalidRegion(_))));
        assert!(matches!(Window::new(u32::MAX, 0, 1, 1), Err(SieveError::InvalidBound { .. })));
        assert!(Window::centered((0, 0), 4, 4).is_err());
        assert_eq!(Window::centered((10, 10), 4, 6).unwrap(), Window::new(8, 7, 4, 6).unwrap());
    }

    #[test]
    fn point_queries_and_growing_bootstrap() {
        let window = Window::new(30, 0, 20, 20).unwrap();
        let mut boot = Bootstrap::new(NormBound::new(3).unwrap()).unwrap();
        assert_eq!(boot.exact_to(), 15);
        boot.cover(window.max_norm()).unwrap();
        assert!(boot.exact_to() >= window.max_norm());
        let covered = boot.exact_to();
        boot.cover(100).unwrap();
        assert_eq!(boot.exact_to(), covered);

        let sieve = WindowSieve::run(window, &boot).unwrap();
        assert_eq!(sieve.is_prime(Gint::new(31, 0)), Some(true));
        assert_eq!(sieve.is_prime(Gint::new(33, 0)), Some(false));
        assert_eq!(sieve.is_prime(Gint::new(30, 11)), Some(true));
        assert_eq!(sieve.is_prime(Gint::new(30, 1)), Some(false));
        assert_eq!(sieve.is_prime(Gint::new(29, 0)), None);
        assert_eq!(sieve.is_prime(Gint::new(30, 20)), None);
    }

    #[test]
    fn oversized_window_fails_before_sieving() {
        let window = Window::new(0, 0, 2_000_000_000, 2_000_000_000).unwrap();
        let boot = Bootstrap::new(NormBound::new(10).unwrap()).unwrap();
        assert!(matches!(WindowSieve::run(window, &boot), Err(SieveError::StorageTooLarge { .. })));
    }

    #[test]
    fn centres_at_the_edge_of_i64() {
        for center in [(i64::MIN, 0), (0, i64::MIN), (i64::MIN, i64::MIN)] {
            assert!(matches!(Window::centered(center, 4, 4), Err(SieveError::InvalidRegion(_))));
        }
        assert!(matches!(
            Window::centered((i64::MAX, 0), 4, 4),
            Err(SieveError::InvalidBound { .. })
        ));
    }

    #[test]
    fn row_one_window() {
        let norms: Vec<u64> = window_primes(0, 1, 225, 1).iter().map(|g| g.norm()).collect();
        let expected = [
            2, 5, 17, 37, 101, 197, 257, 401, 577, 677, 1297, 1601, 2917, 3137, 4357, 5477, 7057,
            8101, 8837, 12101, 13457, 14401, 15377, 15877, 16901, 17957, 21317, 22501, 24337,
            25601, 28901, 30977, 32401, 33857, 41617, 42437, 44101, 50177,
        ];
        assert_eq!(norms, expected);
    }

    #[test]
    fn far_window_on_the_real_axis() {
        assert_eq!(window_primes(20_785_197, 0, 20, 10), vec![Gint::new(20_785_207, 0)]);
    }

    #[test]
    fn matches_full_sieve_near_origin() {
        let all = BaseSieve::new(NormBound::new(5000).unwrap()).run().unwrap().primes();
        let window = Window::new(13, 21, 30, 17).unwrap();
        let expected: Vec<Gint> = all.into_iter().filter(|g| window.contains(*g)).collect();
        assert_eq!(window_primes(13, 21, 30, 17), expected);
    }

    #[test]
    fn exactness_is_limited_by_bootstrap() {
        let window = Window::new(1, 0, 40, 40).unwrap();
        let boot = Bootstrap::new(NormBound::new(10).unwrap()).unwrap();
        let sieve = WindowSieve::run(window, &boot).unwrap();
        assert_eq!(sieve.exact_to(), 120);
        assert!(sieve.primes().iter().all(|g| g.norm() <= 120));
    }
}
