//! Angular statistics: histograms of prime arguments and races between
//! two sectors.

use std::f64::consts::FRAC_PI_2;

use serde::Serialize;

use crate::domain::bound::NormBound;
use crate::domain::gint::{GaussianInt, Gint};
use crate::region::sector::{Sector, sector_primes};
use crate::sieve_error::{SieveError, SieveResult};

/// Histogram of the arguments of first-quadrant primes over `bins` equal
/// slices of `[0, π/2)`.
pub fn angular_histogram(primes: &[Gint], bins: usize) -> SieveResult<Vec<u64>> {
    if bins == 0 {
        return Err(SieveError::region("histogram needs at least one bin"));
    }
    let mut hist = vec![0u64; bins];
    for g in primes {
        let slot = (g.arg() / FRAC_PI_2 * bins as f64) as usize;
        hist[slot.min(bins - 1)] += 1;
    }
    Ok(hist)
}

/// Primes of two sectors up to a common bound, for comparing how their
/// counts grow with the norm.
#[derive(Clone, Debug, Serialize)]
pub struct SectorRace {
    bound: NormBound,
    first: Vec<GaussianInt>,
    second: Vec<GaussianInt>,
}

/// Counts of both sectors at one norm.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RaceCheckpoint {
    pub norm: u64,
    pub first: u64,
    pub second: u64,
}

impl RaceCheckpoint {
    /// `first - second`.
    pub fn lead(&self) -> i64 {
        self.first as i64 - self.second as i64
    }
}

impl SectorRace {
    pub fn run(bound: NormBound, first: Sector, second: Sector) -> SieveResult<Self> {
        let first = sector_primes(bound, first)?;
        let second = sector_primes(bound, second)?;
        log::debug!("sector race to {}: {} vs {}", bound, first.len(), second.len());
        Ok(SectorRace { bound, first, second })
    }

    pub fn first(&self) -> &[GaussianInt] {
        &self.first
    }

    pub fn second(&self) -> &[GaussianInt] {
        &self.second
    }

    /// Counts at the norm `norm`.
    pub fn at(&self, norm: u64) -> RaceCheckpoint {
        let upto = |v: &[GaussianInt]| v.partition_point(|z| z.norm() <= u128::from(norm)) as u64;
        RaceCheckpoint { norm, first: upto(&self.first), second: upto(&self.second) }
    }

    /// Counts at `steps` evenly spaced norms ending at the bound.
    pub fn checkpoints(&self, steps: usize) -> SieveResult<Vec<RaceCheckpoint>> {
        if steps == 0 {
            return Err(SieveError::region("a race needs at least one checkpoint"));
        }
        let x = u128::from(self.bound.get());
        Ok((1..=steps as u128)
            .map(|i| self.at((x * i / steps as u128) as u64))
            .collect())
    }
}
