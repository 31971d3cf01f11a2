//! Vertical moats: walls of columns that no walk with bounded jumps crosses.
//!
//! A walk whose steps are at most `k` long moves at most `r = ⌊k⌋` columns
//! per step, so any walk from column `a < x` to the right of `x` lands in
//! the band `x ≤ a < x + r` when it first crosses. The search starts from
//! every octant prime in that band and explores rightwards without ever
//! stepping left of `x`. If the exploration stays within `max_width`
//! columns of the wall, nothing reachable from the origin side gets further,
//! so the origin's component is finite. Otherwise the wall is moved right by
//! `max_width` and the search repeats.
//!
//! Primality is looked up in window sieves over tiles of the octant, built
//! on first use and kept for later attempts.

use hashbrown::hash_map::Entry;
use hashbrown::{HashMap, HashSet};
use serde::Serialize;

use crate::domain::gint::{GaussianInt, Gint};
use crate::region::moat::JumpSet;
use crate::segment::window::{Bootstrap, Window, WindowSieve};
use crate::sieve_error::{SieveError, SieveResult};

/// Columns explored past the wall before the wall is moved.
pub const DEFAULT_MAX_WIDTH: u32 = 1_000;
/// Walls tried before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Outcome of a successful [`VerticalMoat::find`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerticalMoatReport {
    /// Column of the wall that holds.
    pub wall: u32,
    /// Largest column reached from the wall.
    pub farthest: u32,
    /// Distinct primes visited from the wall.
    pub visited: usize,
    /// Times the wall was moved right before it held.
    pub shifts: u32,
}

/// Builder for a vertical moat search.
///
/// ```rust
/// # use gaussian_sieve::region::VerticalMoat;
/// let report = VerticalMoat::new(2.0)?.find(20)?;
/// assert_eq!((report.wall, report.farthest), (20, 42));
/// # Ok::<(), gaussian_sieve::SieveError>(())
/// ```
#[derive(Clone, Debug)]
pub struct VerticalMoat {
    jumps: JumpSet,
    max_width: u32,
    max_attempts: u32,
    tile: (u32, u32),
}

impl VerticalMoat {
    pub fn new(jump: f64) -> SieveResult<Self> {
        Ok(VerticalMoat {
            jumps: JumpSet::new(jump)?,
            max_width: DEFAULT_MAX_WIDTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            tile: (64, 1024),
        })
    }

    /// Columns explored past the wall; at least one more than a jump spans.
    pub fn max_width(mut self, columns: u32) -> Self {
        self.max_width = columns.max(self.reach() + 1);
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Size of the sieve tiles primality is read from.
    pub fn tile(mut self, width: u32, height: u32) -> Self {
        self.tile = (width.max(1), height.max(1));
        self
    }

    #[inline]
    pub fn jumps(&self) -> &JumpSet {
        &self.jumps
    }

    /// Columns a single jump can cross.
    fn reach(&self) -> u32 {
        self.jumps.offsets().iter().map(|&(du, _)| du.unsigned_abs() as u32).max().unwrap_or(0)
    }

    /// Searches for a wall at column `x` or to its right.
    ///
    /// Fails with [`SieveError::MoatNotFound`] when every attempted wall is
    /// crossed, and with [`SieveError::InvalidRegion`] for `x = 0`.
    pub fn find(&self, x: u32) -> SieveResult<VerticalMoatReport> {
        if x == 0 {
            return Err(SieveError::region("a vertical moat needs a wall right of the origin"));
        }
        let mut tiles = PrimeTiles::new(self.tile)?;
        let mut wall = x;
        let mut shifts = 0;
        loop {
            if let Some((farthest, visited)) = self.explore(wall, &mut tiles)? {
                log::debug!(
                    "vertical moat for jump {} at column {}: {} primes up to column {}",
                    self.jumps.jump(),
                    wall,
                    visited,
                    farthest
                );
                return Ok(VerticalMoatReport { wall, farthest, visited, shifts });
            }
            log::trace!("wall at column {} crossed within {} columns", wall, self.max_width);
            shifts += 1;
            if shifts == self.max_attempts {
                return Err(self.not_found(wall));
            }
            wall = wall.checked_add(self.max_width).ok_or_else(|| self.not_found(wall))?;
        }
    }

    fn not_found(&self, wall: u32) -> SieveError {
        let far = u64::from(wall) + u64::from(self.max_width);
        SieveError::MoatNotFound { jump: self.jumps.jump(), bound: far.saturating_mul(far) }
    }

    /// Explores from the band at `wall`; `None` if it gets `max_width`
    /// columns past the wall.
    fn explore(&self, wall: u32, tiles: &mut PrimeTiles) -> SieveResult<Option<(u32, usize)>> {
        let end = u64::from(wall) + u64::from(self.max_width);
        let mut seen: HashSet<Gint> = HashSet::new();
        let mut stack = Vec::new();
        for a in wall..wall.saturating_add(self.reach()) {
            for b in 0..=a {
                let g = Gint::new(a, b);
                if tiles.is_prime(g)? {
                    seen.insert(g);
                    stack.push(g);
                }
            }
        }

        let mut farthest = stack.iter().map(|g| g.a).max().unwrap_or(wall);
        while let Some(p) = stack.pop() {
            for &(du, dv) in self.jumps.offsets() {
                let z = GaussianInt::new(i64::from(p.a) + du, i64::from(p.b) + dv);
                if z.re < i64::from(wall) || z.im < 0 || z.im > z.re {
                    continue;
                }
                if z.re as u64 >= end {
                    return Ok(None);
                }
                let Some(g) = z.to_gint() else {
                    return Err(self.not_found(wall));
                };
                if !seen.contains(&g) && tiles.is_prime(g)? {
                    seen.insert(g);
                    stack.push(g);
                    farthest = farthest.max(g.a);
                }
            }
        }
        Ok(Some((farthest, seen.len())))
    }
}

/// Lazily sieved tiles of the first quadrant sharing one bootstrap.
struct PrimeTiles {
    width: u32,
    height: u32,
    bootstrap: Bootstrap,
    tiles: HashMap<(u32, u32), WindowSieve>,
}

impl PrimeTiles {
    fn new((width, height): (u32, u32)) -> SieveResult<Self> {
        Ok(PrimeTiles { width, height, bootstrap: Bootstrap::covering(0)?, tiles: HashMap::new() })
    }

    fn is_prime(&mut self, g: Gint) -> SieveResult<bool> {
        let key = (g.a / self.width, g.b / self.height);
        let sieve = match self.tiles.entry(key) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let window = Window::new(key.0 * self.width, key.1 * self.height, self.width, self.height)?;
                self.bootstrap.cover(window.max_norm())?;
                e.insert(WindowSieve::run(window, &self.bootstrap)?)
            }
        };
        sieve
            .is_prime(g)
            .ok_or_else(|| SieveError::inconsistency(format!("{} is not classified by its own tile", g)))
    }
}
