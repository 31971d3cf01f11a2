//! Residue tables of the modulus-10 wheel.
//!
//! The Gaussian primes dividing 10 are `1+i`, `2+i` and `1+2i` (up to
//! units). Divisibility by each of them depends only on `(c mod 10, d mod 10)`,
//! so a residue pair is *admissible* when none of them divides `c + di`.
//! Exactly 32 of the 100 pairs are admissible; each gets one bit of a `u32`.
//!
//! All tables are derived at first use from those three primes.

use once_cell::sync::Lazy;

use crate::domain::gint::Gint;
use crate::engine::array::SieveArray;

pub const MODULUS: u32 = 10;

/// Admissible residue pairs modulo [`MODULUS`].
pub const CLASSES: usize = 32;

/// Canonical first-quadrant primes dividing [`MODULUS`].
pub const WHEEL_PRIMES: [Gint; 3] = [Gint::new(1, 1), Gint::new(2, 1), Gint::new(1, 2)];

const NO_BIT: u8 = u8::MAX;

pub static WHEEL: Lazy<Wheel> = Lazy::new(Wheel::derive);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wheel {
    bit: [[u8; 10]; 10],
    first: [u8; 10],
    gap: [[u8; 10]; 10],
    residues: [(u8, u8); CLASSES],
}

fn divides(p: Gint, c: i64, d: i64) -> bool {
    let (a, b) = (i64::from(p.a), i64::from(p.b));
    let n = a * a + b * b;
    (c * a + d * b) % n == 0 && (d * a - c * b) % n == 0
}

impl Wheel {
    fn derive() -> Self {
        let admissible = |c: usize, d: usize| {
            WHEEL_PRIMES.iter().all(|p| !divides(*p, c as i64, d as i64))
        };

        let mut bit = [[NO_BIT; 10]; 10];
        let mut residues = [(0u8, 0u8); CLASSES];
        let mut next = 0usize;
        for c in 0..10 {
            for d in 0..10 {
                if admissible(c, d) {
                    bit[c][d] = next as u8;
                    residues[next] = (c as u8, d as u8);
                    next += 1;
                }
            }
        }
        debug_assert_eq!(next, CLASSES);

        let mut first = [0u8; 10];
        let mut gap = [[0u8; 10]; 10];
        for c in 0..10 {
            first[c] = (0..10).find(|&d| admissible(c, d)).unwrap_or(0) as u8;
            for d in 0..10 {
                gap[c][d] = (1..=10).find(|g| admissible(c, (d + g) % 10)).unwrap_or(10) as u8;
            }
        }

        log::trace!("wheel tables derived: first = {:?}", first);
        Wheel { bit, first, gap, residues }
    }

    #[inline]
    pub fn is_admissible(&self, c: u64, d: u64) -> bool {
        self.bit[(c % 10) as usize][(d % 10) as usize] != NO_BIT
    }

    /// Bit position of the residue class of `(c, d)`, if admissible.
    #[inline]
    pub fn bit(&self, c: u64, d: u64) -> Option<u32> {
        let bit = self.bit[(c % 10) as usize][(d % 10) as usize];
        (bit != NO_BIT).then_some(u32::from(bit))
    }

    /// Smallest admissible `d` in `0..10` for columns `c (mod 10)`.
    #[inline]
    pub fn first(&self, c: u64) -> u64 {
        u64::from(self.first[(c % 10) as usize])
    }

    /// Distance from `d` to the next admissible `d` in column class `c`.
    #[inline]
    pub fn gap(&self, c: u64, d: u64) -> u64 {
        u64::from(self.gap[(c % 10) as usize][(d % 10) as usize])
    }

    /// Residue pair `(c, d)` owning bit `bit`.
    #[inline]
    pub fn residue(&self, bit: u32) -> (u32, u32) {
        let (c, d) = self.residues[bit as usize];
        (u32::from(c), u32::from(d))
    }

    /// True for the three canonical primes dividing the modulus.
    #[inline]
    pub fn is_wheel_prime(g: Gint) -> bool {
        WHEEL_PRIMES.contains(&g)
    }

    /// Clears every inadmissible cell of `array`, then re-marks the wheel
    /// primes that the shape contains.
    pub fn prefilter(&self, array: &mut SieveArray) {
        for u in array.columns() {
            let c = (u % MODULUS) as usize;
            for t in 0..10u64 {
                if self.bit[c][t as usize] == NO_BIT {
                    array.clear_progression(u, t, u64::from(MODULUS));
                }
            }
        }
        for g in WHEEL_PRIMES {
            array.mark(g.a, g.b);
        }
    }
}
