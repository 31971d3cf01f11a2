//! Public entry points.
//!
//! Every function validates its arguments before allocating sieve storage
//! and reports problems as [`SieveError`](crate::SieveError).

use crate::config::{Engine, SieveConfig};
use crate::domain::bound::NormBound;
use crate::domain::gint::{GaussianInt, Gint};
use crate::engine::base::{BaseSieve, SievedRegion};
use crate::region::moat::{self, JumpSet, MoatGraph};
use crate::region::race::{RaceCheckpoint, SectorRace, angular_histogram};
use crate::region::sector::{Sector, sector_count, sector_primes};
use crate::region::strip_moat::SegmentedMoat;
use crate::region::vertical_moat::{VerticalMoat, VerticalMoatReport};
use crate::segment::{Bootstrap, SegmentedSieve, Window, WindowSieve};
use crate::sieve_error::{SieveError, SieveResult};
use crate::symmetry::Symmetry;
use crate::wheel::DonutSieve;

/// First-quadrant Gaussian primes `a ≥ 1, b ≥ 0` of norm at most `x`,
/// sorted by norm then larger real part.
///
/// ```rust
/// use gaussian_sieve::{Gint, sieve};
/// assert_eq!(sieve(10)?, vec![Gint::new(1, 1), Gint::new(2, 1), Gint::new(1, 2), Gint::new(3, 0)]);
/// # Ok::<(), gaussian_sieve::SieveError>(())
/// ```
pub fn sieve(x: impl Into<i128>) -> SieveResult<Vec<Gint>> {
    sieve_with(x, &SieveConfig::with_engine(Engine::Octant))
}

/// Number of Gaussian primes of norm at most `x` in the whole plane.
pub fn count(x: impl Into<i128>) -> SieveResult<u64> {
    count_with(x, &SieveConfig::default())
}

pub fn sieve_with(x: impl Into<i128>, config: &SieveConfig) -> SieveResult<Vec<Gint>> {
    let bound = NormBound::new(x)?;
    config.validate()?;
    Ok(match config.engine {
        Engine::Quadrant => base(bound, Symmetry::Quadrant, config.wheel)?.primes(),
        Engine::Octant => base(bound, Symmetry::Octant, config.wheel)?.primes(),
        Engine::Donut => DonutSieve::run(bound)?.primes(),
        Engine::Segmented => segmented(bound, config).primes()?,
    })
}

pub fn count_with(x: impl Into<i128>, config: &SieveConfig) -> SieveResult<u64> {
    let bound = NormBound::new(x)?;
    config.validate()?;
    Ok(match config.engine {
        Engine::Quadrant => base(bound, Symmetry::Quadrant, config.wheel)?.count(),
        Engine::Octant => base(bound, Symmetry::Octant, config.wheel)?.count(),
        Engine::Donut => DonutSieve::run(bound)?.count(),
        Engine::Segmented => segmented(bound, config).count()?,
    })
}

fn base(bound: NormBound, symmetry: Symmetry, wheel: bool) -> SieveResult<SievedRegion> {
    BaseSieve::new(bound).symmetry(symmetry).wheel(wheel).run()
}

fn segmented(bound: NormBound, config: &SieveConfig) -> SegmentedSieve {
    SegmentedSieve::new(bound)
        .block_area(config.block_area)
        .parallel(config.parallel)
}

/// Primes in the `width × height` window centred on `center`.
pub fn sieve_block(center: (i64, i64), width: i64, height: i64) -> SieveResult<Vec<Gint>> {
    sieve_window(Window::centered(center, width, height)?)
}

/// Primes with `a ≥ 1` in `window`, sorted by norm then larger real part.
pub fn sieve_window(window: Window) -> SieveResult<Vec<Gint>> {
    let bootstrap = Bootstrap::covering(window.max_norm())?;
    Ok(WindowSieve::run(window, &bootstrap)?.primes())
}

/// Number of primes with `a ≥ 1` in `window`.
pub fn count_window(window: Window) -> SieveResult<u64> {
    let bootstrap = Bootstrap::covering(window.max_norm())?;
    Ok(WindowSieve::run(window, &bootstrap)?.count())
}

/// Gaussian primes of norm at most `x` with argument in `[theta1, theta2)`,
/// sorted by norm then argument.
pub fn sieve_sector(x: impl Into<i128>, theta1: f64, theta2: f64) -> SieveResult<Vec<GaussianInt>> {
    let bound = NormBound::new(x)?;
    sector_primes(bound, Sector::new(theta1, theta2)?)
}

pub fn count_sector(x: impl Into<i128>, theta1: f64, theta2: f64) -> SieveResult<u64> {
    let bound = NormBound::new(x)?;
    sector_count(bound, Sector::new(theta1, theta2)?)
}

/// Components of the octant primes of norm at most `x` under jumps of at
/// most `k`.
pub fn moat_components(x: impl Into<i128>, k: f64) -> SieveResult<Vec<Vec<Gint>>> {
    let bound = NormBound::new(x)?;
    moat::octant_components(bound, &JumpSet::new(k)?)
}

/// Octant primes reachable from the origin by jumps of at most `k`.
pub fn origin_component(x: impl Into<i128>, k: f64) -> SieveResult<Vec<Gint>> {
    let bound = NormBound::new(x)?;
    moat::origin_component(bound, &JumpSet::new(k)?)
}

/// Origin component for `k`, at a norm bound known to enclose it.
pub fn moat_main_component(k: f64) -> SieveResult<Vec<Gint>> {
    let jumps = JumpSet::new(k)?;
    let bound = NormBound::new(moat::main_component_bound(k)?)?;
    moat::origin_component(bound, &jumps)
}

/// Number of octant primes in the origin component for `k`.
///
/// Jumps covered by [`moat::main_component_bound`] are answered by a direct
/// search; larger ones below 6 are counted strip by strip.
pub fn moat_main_component_size(k: f64) -> SieveResult<u64> {
    let jumps = JumpSet::new(k)?;
    match moat::main_component_bound(k) {
        Ok(bound) => Ok(moat::origin_component(NormBound::new(bound)?, &jumps)?.len() as u64),
        Err(_) => Ok(SegmentedMoat::new(k)?.run()?.size),
    }
}

/// Wall at column `x` or to its right that no walk with jumps of at most
/// `k` crosses.
pub fn vertical_moat(x: u32, k: f64) -> SieveResult<VerticalMoatReport> {
    VerticalMoat::new(k)?.find(x)
}

/// Components of the primes inside `window`; jumps leaving the window are
/// ignored.
pub fn moat_components_in_window(window: Window, k: f64) -> SieveResult<Vec<Vec<Gint>>> {
    let jumps = JumpSet::new(k)?;
    let primes = sieve_window(window)?;
    Ok(MoatGraph::build(primes, &jumps).components())
}

/// Histogram of first-quadrant prime arguments over `bins` slices of `[0, π/2)`.
pub fn angular_distribution(x: impl Into<i128>, bins: usize) -> SieveResult<Vec<u64>> {
    let bound = NormBound::new(x)?;
    if bins == 0 {
        return Err(SieveError::region("histogram needs at least one bin"));
    }
    angular_histogram(&sieve(bound.get())?, bins)
}

/// Counts of two sectors at `checkpoints` evenly spaced norms up to `x`.
pub fn sector_race(
    x: impl Into<i128>,
    first: (f64, f64),
    second: (f64, f64),
    checkpoints: usize,
) -> SieveResult<Vec<RaceCheckpoint>> {
    let bound = NormBound::new(x)?;
    let first = Sector::new(first.0, first.1)?;
    let second = Sector::new(second.0, second.1)?;
    if checkpoints == 0 {
        return Err(SieveError::region("a race needs at least one checkpoint"));
    }
    SectorRace::run(bound, first, second)?.checkpoints(checkpoints)
}
