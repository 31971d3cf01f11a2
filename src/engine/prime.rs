//! Sieving primes and their cross-off patterns.
//!
//! The multiples of a Gaussian prime π inside the first quadrant form a
//! periodic pattern with period `p` in both coordinates, where `p` is the
//! rational prime below π:
//! - an inert prime `p ≡ 3 mod 4` divides `u + vi` iff `p | u` and `p | v`;
//! - a split prime `π = a + bi` of norm `p` divides `u + vi` iff
//!   `(u mod p, v mod p)` is one of the `p` residues `k·(a, b) mod p`, i.e.
//!   iff `v ≡ r·u (mod p)` with `r = b·a⁻¹ mod p`.
//!
//! Both patterns are applied to whatever [`SieveArray`] they are given, so
//! the same prime crosses off quadrant arrays, octant arrays and windows.

use crate::domain::gint::Gint;
use crate::engine::array::SieveArray;

/// `base^exp mod modulus` with 128-bit intermediates.
pub fn pow_mod(mut base: u64, mut exp: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let mut result: u64 = 1;
    base %= modulus;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, modulus);
        }
        exp >>= 1;
        base = mul_mod(base, base, modulus);
    }
    result
}

#[inline]
pub fn mul_mod(x: u64, y: u64, modulus: u64) -> u64 {
    (u128::from(x) * u128::from(y) % u128::from(modulus)) as u64
}

/// A prime used to cross off its multiples.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SievingPrime {
    /// Degree-one prime `a + bi` with `b > 0`, above `p = a² + b²`.
    Split { p: u64, generator: Gint },
    /// Rational prime `p ≡ 3 mod 4`, which stays prime in ℤ[i].
    Inert { p: u64 },
}

impl SievingPrime {
    /// Classifies a canonical prime `a + bi`.
    pub fn from_canonical(g: Gint) -> Self {
        if g.b == 0 {
            SievingPrime::Inert { p: u64::from(g.a) }
        } else {
            SievingPrime::Split { p: g.norm(), generator: g }
        }
    }

    /// The rational prime below this prime.
    #[inline]
    pub fn rational_prime(&self) -> u64 {
        match *self {
            SievingPrime::Split { p, .. } | SievingPrime::Inert { p } => p,
        }
    }

    /// Norm of the Gaussian prime: `p` if split, `p²` if inert.
    #[inline]
    pub fn norm(&self) -> u64 {
        match *self {
            SievingPrime::Split { p, .. } => p,
            SievingPrime::Inert { p } => p * p,
        }
    }

    /// The canonical point of this prime.
    #[inline]
    pub fn generator(&self) -> Gint {
        match *self {
            SievingPrime::Split { generator, .. } => generator,
            SievingPrime::Inert { p } => Gint::new(p as u32, 0),
        }
    }

    /// True if the rational prime has the residue mod 4 its splitting type
    /// requires (`2` or `1 mod 4` for split, `3 mod 4` for inert).
    pub fn has_consistent_type(&self) -> bool {
        match *self {
            SievingPrime::Split { p, .. } => p == 2 || p % 4 == 1,
            SievingPrime::Inert { p } => p % 4 == 3,
        }
    }

    /// Crosses off multiples by walking the residues `k·(a, b) mod p` for
    /// `k = 1..=p` and clearing each residue lattice.
    ///
    /// Costs `p` lattice starts plus one clear per multiple, which suits
    /// arrays anchored at the origin where the prime is much smaller than
    /// the array.
    pub fn cross_off(&self, array: &mut SieveArray) {
        match *self {
            SievingPrime::Inert { p } => array.clear_lattice(0, 0, p),
            SievingPrime::Split { p, generator } => {
                let (a, b) = (u64::from(generator.a) % p, u64::from(generator.b) % p);
                let (mut s, mut t) = (0u64, 0u64);
                for _ in 0..p {
                    s += a;
                    if s >= p {
                        s -= p;
                    }
                    t += b;
                    if t >= p {
                        t -= p;
                    }
                    array.clear_lattice(s, t, p);
                }
            }
        }
    }

    /// Crosses off multiples column by column through the congruence
    /// `v ≡ r·u (mod p)`.
    ///
    /// Work is proportional to the number of columns plus multiples, so this
    /// is the right choice for windows far from the origin and for primes
    /// larger than the window width.
    pub fn cross_off_by_columns(&self, array: &mut SieveArray) {
        match *self {
            SievingPrime::Inert { p } => array.clear_lattice(0, 0, p),
            SievingPrime::Split { p, generator } => {
                let a = u64::from(generator.a) % p;
                let r = mul_mod(u64::from(generator.b), pow_mod(a, p - 2, p), p);
                for u in array.columns() {
                    let t = mul_mod(r, u64::from(u), p);
                    array.clear_progression(u, t, p);
                }
            }
        }
    }

    /// Re-marks the prime itself after its multiples were crossed off.
    ///
    /// Returns `false` when the generator has no cell in the array.
    #[inline]
    pub fn restore(&self, array: &mut SieveArray) -> bool {
        let g = self.generator();
        array.mark(g.a, g.b)
    }
}
