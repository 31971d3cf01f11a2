//! Angular sectors.
//!
//! A [`Sector`] `[start, end)` of the plane is split into its pieces in the
//! four quadrants. Each piece is rotated into the first quadrant, sieved
//! there as a [`QuadrantSector`], and rotated back.
//!
//! Membership is always decided on the argument of the plane point in
//! `[0, 2π)`, so a point exactly on the start ray is kept in every quadrant.
//! A quadrant piece stores, for every column `a ≥ 1`, the contiguous run of
//! `b` whose rotated argument lies in `[start, end)`. Multiples of a prime π
//! of argument φ are generated from cofactors `c + di` with `c ≥ 1` whose
//! argument lies in the local range `[α - φ, β - φ)`; the float bounds on
//! `d` are padded by one on each side and the exact membership test decides.

use std::f64::consts::{FRAC_PI_2 as HALF_PI, TAU};

use serde::{Deserialize, Serialize};

use crate::domain::bound::{NormBound, isqrt};
use crate::domain::gint::{GaussianInt, Gint, norm_then_arg};
use crate::domain::shape::{ColumnSpan, Shape};
use crate::engine::array::SieveArray;
use crate::engine::base::BaseSieve;
use crate::sieve_error::{SieveError, SieveResult, reserve_exact};

/// Smallest argument of a point in quadrant `q`, as [`GaussianInt::arg`]
/// computes it; `2π` past the last quadrant.
fn quadrant_start(q: u32) -> f64 {
    if q >= 4 { TAU } else { GaussianInt::new(1, 0).rotate(q).arg() }
}

/// Half-open angular range `[start, end)` with `0 ≤ start < end ≤ 2π`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    start: f64,
    end: f64,
}

impl Sector {
    pub fn new(start: f64, end: f64) -> SieveResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(SieveError::region(format!("sector [{}, {}) has a non-finite angle", start, end)));
        }
        if start < 0.0 || end > TAU {
            return Err(SieveError::region(format!("sector [{}, {}) leaves [0, 2π]", start, end)));
        }
        if start >= end {
            return Err(SieveError::region(format!("sector [{}, {}) is empty or reversed", start, end)));
        }
        Ok(Sector { start, end })
    }

    /// The whole plane.
    pub fn full() -> Self {
        Sector { start: 0.0, end: TAU }
    }

    #[inline]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Quadrant pieces that can hold a point of the sector; piece `q` covers
    /// `i^q` times its first-quadrant points.
    pub fn pieces(&self) -> impl Iterator<Item = QuadrantSector> + '_ {
        (0..4u32).filter_map(move |q| {
            let (lo, hi) = (quadrant_start(q), quadrant_start(q + 1));
            (self.start < hi && self.end > lo).then(|| QuadrantSector {
                q,
                start: self.start,
                end: self.end,
                alpha: (self.start - lo).max(0.0),
                beta: (self.end - lo).min(HALF_PI),
            })
        })
    }

    /// True if `z ≠ 0` has its argument in `[start, end)`.
    pub fn contains(&self, z: GaussianInt) -> bool {
        if z.quadrant().is_none() {
            return false;
        }
        let t = z.arg();
        self.start <= t && t < self.end
    }
}

/// The part of a [`Sector`] inside quadrant `q`, stored in first-quadrant
/// coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct QuadrantSector {
    q: u32,
    start: f64,
    end: f64,
    /// Local bounds in `[0, π/2]`, used only to bound cofactor walks.
    alpha: f64,
    beta: f64,
}

impl QuadrantSector {
    /// Quadrant index `q`: local point `g` stands for `i^q · g`.
    #[inline]
    pub fn quadrant(&self) -> u32 {
        self.q
    }

    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    #[inline]
    pub fn beta(&self) -> f64 {
        self.beta
    }

    #[inline]
    fn plane_arg(&self, a: u32, b: u32) -> f64 {
        Gint::new(a, b).to_signed().rotate(self.q).arg()
    }

    /// True if local `g` with `a ≥ 1` maps into the sector.
    #[inline]
    pub fn contains(&self, g: Gint) -> bool {
        if g.a == 0 {
            return false;
        }
        let t = self.plane_arg(g.a, g.b);
        self.start <= t && t < self.end
    }

    /// Smallest `b` in `0..=top + 1` whose plane argument in column `a` is
    /// at least `angle`.
    fn first_at_or_above(&self, a: u32, angle: f64, top: u32) -> u32 {
        let local = (angle - quadrant_start(self.q)).clamp(0.0, HALF_PI);
        let estimate = (f64::from(a) * local.tan()).floor();
        let mut b = estimate.clamp(0.0, f64::from(top) + 1.0) as u32;
        while b > 0 && self.plane_arg(a, b - 1) >= angle {
            b -= 1;
        }
        while b <= top && self.plane_arg(a, b) < angle {
            b += 1;
        }
        b
    }

    /// Upper bound on the cells of [`QuadrantSector::shape`]: the circular
    /// slice plus a strip of width one along each edge ray.
    pub fn cells_bound(&self, bound: NormBound) -> u128 {
        let r = f64::from(bound.radius()) + 2.5;
        let slice = ((self.beta - self.alpha) / 2.0 * r * r).ceil().max(0.0) as u128;
        slice + 2 * (u128::from(bound.radius()) + 3)
    }

    /// Column runs of the piece within `bound`, for columns `1..=⌊√X⌋`.
    pub fn shape(&self, bound: NormBound) -> SieveResult<Shape> {
        let mut spans = reserve_exact(u128::from(bound.radius()), self.cells_bound(bound))?;
        spans.extend((1..=bound.radius()).map(|a| {
            let top = bound.column_top(a);
            let lo = self.first_at_or_above(a, self.start, top);
            let hi = self.first_at_or_above(a, self.end, top).max(lo);
            ColumnSpan::new(lo, hi)
        }));
        Ok(Shape::from_spans(1, spans))
    }
}

/// Sieve of one first-quadrant sector.
#[derive(Clone, Debug)]
pub struct SectorSieve {
    sector: QuadrantSector,
    array: SieveArray,
}

impl SectorSieve {
    pub fn run(bound: NormBound, sector: QuadrantSector) -> SieveResult<Self> {
        let storage = SieveArray::reserve(sector.cells_bound(bound))?;
        let mut array = SieveArray::with_storage(sector.shape(bound)?, storage)?;
        array.clear(1, 0);

        let primes = BaseSieve::new(bound.sqrt_bound()).run()?.primes();
        let x = bound.get();
        for pi in &primes {
            let (a, b) = (i64::from(pi.a), i64::from(pi.b));
            let q = x / pi.norm();
            let phi = pi.arg();
            let (tan_lo, tan_hi) = ((sector.alpha - phi).tan(), (sector.beta - phi).tan());
            for c in 1..=isqrt(q) {
                let limit = isqrt(q - c * c) as i64;
                let cf = c as f64;
                let d_lo = ((cf * tan_lo).floor() as i64 - 1).max(-limit);
                let d_hi = ((cf * tan_hi).ceil() as i64).saturating_add(1).min(limit);
                let c = c as i64;
                for d in d_lo..=d_hi {
                    let (u, v) = (a * c - b * d, b * c + a * d);
                    if u >= 1 && v >= 0 {
                        array.clear(u as u32, v as u32);
                    }
                }
            }
            array.mark(pi.a, pi.b);
        }
        log::debug!(
            "sector [{:.6}, {:.6}) in quadrant {} to {}: {} cells, {} sieving primes",
            sector.start,
            sector.end,
            sector.q,
            bound,
            array.shape().cell_count(),
            primes.len()
        );
        Ok(SectorSieve { sector, array })
    }

    #[inline]
    pub fn sector(&self) -> QuadrantSector {
        self.sector
    }

    /// Primes in the sector, sorted by norm then larger real part.
    pub fn primes(&self) -> Vec<Gint> {
        let mut out: Vec<Gint> = self.array.marked().collect();
        out.sort_unstable();
        out
    }

    pub fn count(&self) -> u64 {
        self.array.count_marked()
    }
}

/// Gaussian primes of norm at most `bound` with argument in `sector`,
/// sorted by norm then argument.
pub fn sector_primes(bound: NormBound, sector: Sector) -> SieveResult<Vec<GaussianInt>> {
    let mut out = Vec::new();
    for piece in sector.pieces() {
        let sieve = SectorSieve::run(bound, piece)?;
        out.extend(sieve.primes().into_iter().map(|g| g.to_signed().rotate(piece.q)));
    }
    out.sort_by(norm_then_arg);
    Ok(out)
}

/// Number of Gaussian primes of norm at most `bound` in `sector`.
pub fn sector_count(bound: NormBound, sector: Sector) -> SieveResult<u64> {
    sector
        .pieces()
        .map(|piece| SectorSieve::run(bound, piece).map(|s| s.count()))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symmetry::full_plane;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_8, PI};

    fn expected(x: u64, sector: Sector) -> Vec<GaussianInt> {
        let base = BaseSieve::new(NormBound::new(x).unwrap()).run().unwrap();
        let mut v: Vec<GaussianInt> = full_plane(&base.primes())
            .into_iter()
            .filter(|z| sector.contains(*z))
            .collect();
        v.sort_by(norm_then_arg);
        v
    }

    #[test]
    fn rejects_malformed_sectors() {
        assert!(Sector::new(0.5, 0.5).is_err());
        assert!(Sector::new(1.0, 0.5).is_err());
        assert!(Sector::new(-0.1, 0.5).is_err());
        assert!(Sector::new(0.0, 7.0).is_err());
        assert!(Sector::new(f64::NAN, 1.0).is_err());
        assert!(Sector::new(0.0, TAU).is_ok());
    }

    #[test]
    fn first_quadrant_sectors_match_filtered_sieve() {
        let bound = NormBound::new(30_000).unwrap();
        for (lo, hi) in [(0.0, FRAC_PI_2), (0.1, 0.2), (0.0, FRAC_PI_8), (FRAC_PI_4, FRAC_PI_2), (FRAC_PI_4, 0.79), (0.3, 1.5)] {
            let sector = Sector::new(lo, hi).unwrap();
            assert_eq!(sector_primes(bound, sector).unwrap(), expected(30_000, sector), "[{lo}, {hi})");
        }
    }

    #[test]
    fn sectors_crossing_quadrants() {
        let bound = NormBound::new(5_000).unwrap();
        for (lo, hi) in [(1.2, 2.0), (3.0, 5.5), (0.0, TAU), (PI, 1.5 * PI)] {
            let sector = Sector::new(lo, hi).unwrap();
            let got = sector_primes(bound, sector).unwrap();
            assert_eq!(got, expected(5_000, sector), "[{lo}, {hi})");
            assert_eq!(sector_count(bound, sector).unwrap(), got.len() as u64);
        }
        assert_eq!(sector_count(bound, Sector::full()).unwrap(), BaseSieve::new(bound).run().unwrap().count());
    }

    #[test]
    fn diagonal_belongs_to_the_upper_half_of_the_quadrant() {
        let lower = Sector::new(0.0, FRAC_PI_4).unwrap();
        let upper = Sector::new(FRAC_PI_4, FRAC_PI_2).unwrap();
        let one_plus_i = GaussianInt::new(1, 1);
        assert!(!lower.contains(one_plus_i));
        assert!(upper.contains(one_plus_i));
    }

    #[test]
    fn column_runs_follow_the_angles() {
        let piece = Sector::new(FRAC_PI_4, FRAC_PI_2).unwrap().pieces().next().unwrap();
        let shape = piece.shape(NormBound::new(50).unwrap()).unwrap();
        // column a keeps b in a..=top(a)
        assert_eq!(shape.span(1), Some(ColumnSpan::new(1, 8)));
        assert_eq!(shape.span(5), Some(ColumnSpan::new(5, 6)));
        assert_eq!(shape.span(6), Some(ColumnSpan::new(4, 4)));
    }

    #[test]
    fn start_ray_is_kept_in_every_quadrant() {
        let bound = NormBound::new(2_000).unwrap();
        let base = BaseSieve::new(bound).run().unwrap();
        for z in full_plane(&base.primes()) {
            let t = z.arg();
            let from = Sector::new(t, (t + 0.3).min(TAU)).unwrap();
            assert!(from.contains(z));
            assert!(sector_primes(bound, from).unwrap().contains(&z), "{z:?} at {t}");
            if t > 0.0 {
                let before = Sector::new((t - 0.3).max(0.0), t).unwrap();
                assert!(!before.contains(z));
                assert!(!sector_primes(bound, before).unwrap().contains(&z), "{z:?} at {t}");
            }
        }
    }

    #[test]
    fn pieces_follow_the_quadrant_boundaries() {
        let quadrants = |lo: f64, hi: f64| -> Vec<u32> {
            Sector::new(lo, hi).unwrap().pieces().map(|p| p.quadrant()).collect()
        };
        assert_eq!(quadrants(FRAC_PI_2, PI), vec![1]);
        assert_eq!(quadrants(0.0, TAU), vec![0, 1, 2, 3]);
        assert_eq!(quadrants(1.0, 4.0), vec![0, 1, 2]);
        assert_eq!(quadrants(GaussianInt::new(0, -1).arg(), TAU), vec![3]);
    }
}
