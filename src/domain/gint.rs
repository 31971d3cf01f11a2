//! `Gint` and `GaussianInt`: lattice points of the Gaussian integers
//!
//! Every Gaussian prime is an associate class under the unit group
//! {±1, ±i}. The sieve works with one representative per class:
//! - [`Gint`] is the canonical first-quadrant representative `a + bi`
//!   with `a ≥ 1, b ≥ 0` (or additionally `a ≥ b` in the octant layout),
//!   stored as two `u32` so sieve output stays compact.
//! - [`GaussianInt`] is a signed point anywhere in the plane, used for
//!   associates, sector results and moat offsets.
//!
//! `Gint` is `repr(C)` and `Pod`, so a slice of points can be handed to a
//! plotting or binding collaborator as a flat `&[u32]` with [`as_flat`].

use std::cmp::Ordering;
use std::f64::consts::TAU;
use std::fmt;
use std::ops::{Add, Mul};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Canonical lattice point `a + bi` with non-negative coordinates.
///
/// # Ordering
/// Points are ordered by ascending norm; equal norms put the larger real part
/// first. The order is total and agrees with `Eq`, because `a` and the norm
/// together determine `b`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Gint {
    pub a: u32,
    pub b: u32,
}

impl Gint {
    /// Creates the point `a + bi`.
    ///
    /// ```rust
    /// # use gaussian_sieve::domain::gint::Gint;
    /// let g = Gint::new(2, 1);
    /// assert_eq!(g.norm(), 5);
    /// ```
    #[inline]
    pub const fn new(a: u32, b: u32) -> Self {
        Gint { a, b }
    }

    /// The norm `a² + b²`.
    ///
    /// Points produced by the sieve never exceed `MAX_NORM`, so this cannot
    /// overflow for them. Use [`Gint::checked_norm`] for arbitrary input.
    #[inline]
    pub const fn norm(self) -> u64 {
        let (a, b) = (self.a as u64, self.b as u64);
        a * a + b * b
    }

    /// The norm, or `None` if it does not fit in a `u64`.
    #[inline]
    pub fn checked_norm(self) -> Option<u64> {
        let (a, b) = (u64::from(self.a), u64::from(self.b));
        a.checked_mul(a)?.checked_add(b.checked_mul(b)?)
    }

    /// Reflection across the diagonal `a = b`; equals `i · conj(self)`.
    #[inline]
    pub const fn flip(self) -> Self {
        Gint { a: self.b, b: self.a }
    }

    /// Argument in `[0, π/2]`.
    #[inline]
    pub fn arg(self) -> f64 {
        f64::from(self.b).atan2(f64::from(self.a))
    }

    /// True if the point lies in the closed first octant `0 ≤ b ≤ a`.
    #[inline]
    pub const fn in_octant(self) -> bool {
        self.b <= self.a
    }

    /// The rational prime below this point, assuming it is a Gaussian prime:
    /// `a² + b²` for a degree-one prime, `a` itself for an inert one.
    #[inline]
    pub const fn rational_prime(self) -> u64 {
        if self.b == 0 { self.a as u64 } else { self.norm() }
    }

    #[inline]
    pub const fn to_signed(self) -> GaussianInt {
        GaussianInt::new(self.a as i64, self.b as i64)
    }
}

impl Ord for Gint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.norm()
            .cmp(&other.norm())
            .then_with(|| other.a.cmp(&self.a))
    }
}

impl PartialOrd for Gint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Gint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Gint").field(&self.a).field(&self.b).finish()
    }
}

impl fmt::Display for Gint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}i", self.a, self.b)
    }
}

impl From<(u32, u32)> for Gint {
    fn from((a, b): (u32, u32)) -> Self {
        Gint::new(a, b)
    }
}

impl From<Gint> for (u32, u32) {
    fn from(g: Gint) -> Self {
        (g.a, g.b)
    }
}

// `as_flat` relies on two packed u32 fields.
static_assertions::assert_eq_size!(Gint, [u32; 2]);

/// View a slice of points as interleaved `[a0, b0, a1, b1, ...]` coordinates.
pub fn as_flat(points: &[Gint]) -> &[u32] {
    bytemuck::cast_slice(points)
}

/// Signed Gaussian integer `re + im·i`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug, Serialize, Deserialize)]
pub struct GaussianInt {
    pub re: i64,
    pub im: i64,
}

impl GaussianInt {
    pub const ZERO: GaussianInt = GaussianInt::new(0, 0);
    pub const ONE: GaussianInt = GaussianInt::new(1, 0);
    pub const I: GaussianInt = GaussianInt::new(0, 1);

    #[inline]
    pub const fn new(re: i64, im: i64) -> Self {
        GaussianInt { re, im }
    }

    /// The norm `re² + im²`, computed without overflow.
    #[inline]
    pub fn norm(self) -> u128 {
        let (re, im) = (i128::from(self.re), i128::from(self.im));
        (re * re + im * im) as u128
    }

    #[inline]
    pub const fn conj(self) -> Self {
        GaussianInt::new(self.re, -self.im)
    }

    /// Multiplication by `i^k`.
    #[inline]
    pub const fn rotate(self, k: u32) -> Self {
        match k % 4 {
            0 => self,
            1 => GaussianInt::new(-self.im, self.re),
            2 => GaussianInt::new(-self.re, -self.im),
            _ => GaussianInt::new(self.im, -self.re),
        }
    }

    /// Quadrant index `q` such that `self = i^q · w` with `w.re > 0, w.im ≥ 0`.
    /// `None` for zero.
    pub const fn quadrant(self) -> Option<u32> {
        let (re, im) = (self.re, self.im);
        if re > 0 && im >= 0 {
            Some(0)
        } else if re <= 0 && im > 0 {
            Some(1)
        } else if re < 0 && im <= 0 {
            Some(2)
        } else if re >= 0 && im < 0 {
            Some(3)
        } else {
            None
        }
    }

    /// Argument in `[0, 2π)`.
    pub fn arg(self) -> f64 {
        let t = (self.im as f64).atan2(self.re as f64);
        if t < 0.0 { t + TAU } else { t }
    }

    /// Converts back to a [`Gint`] if both coordinates are non-negative and fit.
    pub fn to_gint(self) -> Option<Gint> {
        Some(Gint::new(
            u32::try_from(self.re).ok()?,
            u32::try_from(self.im).ok()?,
        ))
    }
}

impl Add for GaussianInt {
    type Output = GaussianInt;
    #[inline]
    fn add(self, rhs: GaussianInt) -> GaussianInt {
        GaussianInt::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Mul for GaussianInt {
    type Output = GaussianInt;
    #[inline]
    fn mul(self, rhs: GaussianInt) -> GaussianInt {
        GaussianInt::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl From<Gint> for GaussianInt {
    fn from(g: Gint) -> Self {
        g.to_signed()
    }
}

impl fmt::Display for GaussianInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im < 0 {
            write!(f, "{}-{}i", self.re, -self.im)
        } else {
            write!(f, "{}+{}i", self.re, self.im)
        }
    }
}

/// Order by ascending norm, then by argument.
pub fn norm_then_arg(z: &GaussianInt, w: &GaussianInt) -> Ordering {
    z.norm()
        .cmp(&w.norm())
        .then_with(|| z.arg().total_cmp(&w.arg()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn norm_and_flip() {
        let g = Gint::new(3, 2);
        assert_eq!(g.norm(), 13);
        assert_eq!(g.flip(), Gint::new(2, 3));
        assert_eq!(Gint::new(u32::MAX, u32::MAX).checked_norm(), None);
    }

    #[test]
    fn ordering_is_norm_then_larger_real_part() {
        let mut v = vec![Gint::new(1, 2), Gint::new(3, 0), Gint::new(2, 1), Gint::new(1, 1)];
        v.sort();
        assert_eq!(
            v,
            vec![Gint::new(1, 1), Gint::new(2, 1), Gint::new(1, 2), Gint::new(3, 0)]
        );
    }

    #[test]
    fn debug_and_display() {
        let g = Gint::new(7, 4);
        assert_eq!(format!("{:?}", g), "Gint(7, 4)");
        assert_eq!(format!("{}", g), "7+4i");
        assert_eq!(format!("{}", GaussianInt::new(2, -5)), "2-5i");
    }

    #[test]
    fn flat_view_interleaves_coordinates() {
        let pts = [Gint::new(1, 1), Gint::new(2, 1), Gint::new(3, 0)];
        assert_eq!(as_flat(&pts), &[1, 1, 2, 1, 3, 0]);
    }

    #[test]
    fn rotation_and_quadrants() {
        let z = GaussianInt::new(3, 2);
        assert_eq!(z.rotate(1), GaussianInt::new(-2, 3));
        assert_eq!(z.rotate(4), z);
        for k in 0..4 {
            assert_eq!(z.rotate(k).quadrant(), Some(k));
        }
        assert_eq!(GaussianInt::new(0, 5).quadrant(), Some(1));
        assert_eq!(GaussianInt::ZERO.quadrant(), None);
        assert_eq!(GaussianInt::I * GaussianInt::I, GaussianInt::new(-1, 0));
    }

    #[test]
    fn arg_is_in_zero_to_tau() {
        assert_eq!(GaussianInt::ONE.arg(), 0.0);
        assert!((GaussianInt::new(0, -1).arg() - 1.5 * PI).abs() < 1e-12);
    }
}
