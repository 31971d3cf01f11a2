//! Wheel-compressed octant sieve.
//!
//! The octant `0 ≤ v ≤ u, u² + v² ≤ X` is cut into 10×10 blocks. Each block
//! keeps one `u32` holding a bit per admissible residue class, so cells
//! divisible by a prime above 2 or 5 are never stored. Block column `A`
//! holds blocks `B = 0..=min(A, ⌊√(⌊X/100⌋ - A²)⌋)`.
//!
//! Multiples are produced by walking cofactors `κ = c + di` of the first
//! octant with `N(κ) ≤ X / N(π)` through admissible `d` only, multiplying
//! by π, and folding the product back into the octant with units and
//! conjugation.

use crate::debug_invariants::{DebugInvariants, ensure};
use crate::domain::bound::{NormBound, isqrt};
use crate::domain::gint::Gint;
use crate::domain::shape::Shape;
use crate::engine::base::{BaseSieve, SieveStats};
use crate::engine::prime::SievingPrime;
use crate::sieve_error::{SieveError, SieveResult, reserve_exact};
use crate::symmetry::Symmetry;
use crate::wheel::tables::{CLASSES, MODULUS, WHEEL, WHEEL_PRIMES};

const M: u64 = MODULUS as u64;

#[derive(Clone, Debug)]
pub struct DonutSieve {
    bound: NormBound,
    /// CSR offsets of block columns into `blocks`.
    offsets: Vec<usize>,
    blocks: Vec<u32>,
    stats: SieveStats,
}

impl DonutSieve {
    /// Sieves every Gaussian prime of norm at most `bound`.
    pub fn run(bound: NormBound) -> SieveResult<Self> {
        let x = bound.get();
        let block_bound = x / (M * M);
        let block_columns = u64::from(bound.radius()) / M;

        let estimate = Shape::octant_cells_bound(NormBound::new(block_bound)?);
        let cells = |blocks: u128| blocks * CLASSES as u128;
        let mut blocks: Vec<u32> = reserve_exact(estimate, cells(estimate))?;
        let mut offsets = reserve_exact(u128::from(block_columns) + 2, cells(estimate))?;
        let mut acc = 0usize;
        offsets.push(acc);
        for col in 0..=block_columns {
            acc += (col.min(isqrt(block_bound - col * col)) + 1) as usize;
            offsets.push(acc);
        }
        blocks
            .try_reserve_exact(acc)
            .map_err(|_| SieveError::StorageTooLarge { cells: cells(acc as u128) })?;
        blocks.resize(acc, u32::MAX);

        let mut sieve = DonutSieve {
            bound,
            offsets,
            blocks,
            stats: SieveStats { storage_bytes: acc * std::mem::size_of::<u32>(), ..SieveStats::default() },
        };
        sieve.set(1, 0, false);
        sieve.set(0, 1, false);

        let primes = BaseSieve::new(bound.sqrt_bound()).run()?.primes();
        for g in primes.into_iter().filter(|g| g.norm() > 5) {
            let prime = SievingPrime::from_canonical(g);
            ensure(prime.has_consistent_type(), || {
                format!("bootstrap prime {} has the wrong residue mod 4", g)
            })?;
            sieve.cross_off(g);
            sieve.stats.sieving_primes += 1;
            sieve.stats.largest_sieving_norm = g.norm();
        }

        log::debug!(
            "donut sieve to {}: {} blocks, {} sieving primes",
            bound,
            sieve.blocks.len(),
            sieve.stats.sieving_primes
        );
        sieve.debug_assert_invariants();
        Ok(sieve)
    }

    #[inline]
    fn slot(&self, u: u64, v: u64) -> Option<(usize, u32)> {
        let (col, row) = ((u / M) as usize, (v / M) as usize);
        let start = *self.offsets.get(col)?;
        let end = *self.offsets.get(col + 1)?;
        let bit = WHEEL.bit(u, v)?;
        (start + row < end).then_some((start + row, bit))
    }

    #[inline]
    fn set(&mut self, u: u64, v: u64, on: bool) {
        if let Some((i, bit)) = self.slot(u, v) {
            if on {
                self.blocks[i] |= 1 << bit;
            } else {
                self.blocks[i] &= !(1 << bit);
            }
        }
    }

    #[inline]
    fn get(&self, u: u64, v: u64) -> bool {
        self.slot(u, v).is_some_and(|(i, bit)| (self.blocks[i] >> bit) & 1 == 1)
    }

    /// Clears every multiple `π·κ` with `κ ≠ 1` admissible, then re-marks π.
    fn cross_off(&mut self, pi: Gint) {
        let (a, b) = (i64::from(pi.a), i64::from(pi.b));
        let q = self.bound.get() / pi.norm();
        let half = isqrt(q / 2);
        for c in 0..=isqrt(q) {
            let d_bound = if c <= half { c } else { isqrt(q - c * c) };
            let mut d = WHEEL.first(c);
            while d <= d_bound {
                let (ci, di) = (c as i64, d as i64);
                let (mut u, mut v) = (a * ci - b * di, a * di + b * ci);
                if u < 0 {
                    (u, v) = (v, -u);
                }
                if v > u {
                    (u, v) = (v, u);
                }
                self.set(u as u64, v as u64, false);
                d += WHEEL.gap(c, d);
            }
        }
        let home = if pi.a >= pi.b { pi } else { pi.flip() };
        self.set(u64::from(home.a), u64::from(home.b), true);
    }

    /// Octant primes `u > v` stored in the blocks, plus `1 + i`.
    pub fn octant_primes(&self) -> impl Iterator<Item = Gint> + '_ {
        let x = self.bound.get();
        let head = WHEEL_PRIMES
            .into_iter()
            .filter(move |g| g.in_octant() && g.norm() <= x);
        let tail = (0..self.offsets.len() - 1).flat_map(move |col| {
            (self.offsets[col]..self.offsets[col + 1]).flat_map(move |i| {
                let row = (i - self.offsets[col]) as u32;
                let word = self.blocks[i];
                (0..CLASSES as u32)
                    .filter(move |&bit| (word >> bit) & 1 == 1)
                    .map(move |bit| {
                        let (c, d) = WHEEL.residue(bit);
                        Gint::new(col as u32 * MODULUS + c, row * MODULUS + d)
                    })
                    .filter(move |g| g.a >= 1 && g.a > g.b && g.norm() <= x)
            })
        });
        head.chain(tail)
    }

    /// First-quadrant primes sorted by norm then larger real part.
    pub fn primes(&self) -> Vec<Gint> {
        let mut out: Vec<Gint> = self
            .octant_primes()
            .flat_map(|g| Symmetry::Octant.expand(g))
            .collect();
        out.sort_unstable();
        out
    }

    /// Number of Gaussian primes in the whole plane.
    pub fn count(&self) -> u64 {
        4 * self
            .octant_primes()
            .map(|g| Symmetry::Octant.multiplicity(g))
            .sum::<u64>()
    }

    pub fn is_marked(&self, g: Gint) -> bool {
        self.get(u64::from(g.a), u64::from(g.b))
    }

    #[inline]
    pub fn stats(&self) -> SieveStats {
        self.stats
    }
}

impl DebugInvariants for DonutSieve {
    fn validate_invariants(&self) -> SieveResult<()> {
        ensure(self.offsets.last() == Some(&self.blocks.len()), || {
            format!("block offsets end at {:?} for {} blocks", self.offsets.last(), self.blocks.len())
        })?;
        ensure(self.offsets.windows(2).all(|w| w[0] < w[1]), || {
            "every block column must hold at least one block".into()
        })?;
        ensure(!self.get(1, 0), || "unit 1 is marked prime".into())
    }
}
