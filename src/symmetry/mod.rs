//! Unit-group and conjugation symmetry of the Gaussian primes.
//!
//! The primes are invariant under multiplication by the units `{±1, ±i}`
//! and under complex conjugation. Two canonical regions are used:
//!
//! | layout     | region                | output expansion          |
//! |------------|-----------------------|---------------------------|
//! | `Quadrant` | `a ≥ 1, b ≥ 0`        | identity                  |
//! | `Octant`   | `a ≥ 1, 0 ≤ b ≤ a`    | `(a, b) ↦ (a, b), (b, a)` |
//!
//! The octant expansion is valid because `b + ai = i·conj(a + bi)` is an
//! associate of a conjugate, so it is prime exactly when `a + bi` is. Points
//! on the diagonal or the real axis expand to a single quadrant point.

use serde::{Deserialize, Serialize};

use crate::domain::bound::NormBound;
use crate::domain::gint::{GaussianInt, Gint};
use crate::domain::shape::Shape;
use crate::engine::prime::SievingPrime;
use crate::sieve_error::SieveResult;

/// Canonical region in which sieve storage lives.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symmetry {
    #[default]
    Quadrant,
    Octant,
}

impl Symmetry {
    /// Storage shape for all points of norm at most `bound`.
    pub fn shape(self, bound: NormBound) -> SieveResult<Shape> {
        match self {
            Symmetry::Quadrant => Shape::quadrant(bound),
            Symmetry::Octant => Shape::octant(bound),
        }
    }

    /// Upper bound on the cells of [`Symmetry::shape`].
    pub fn cells_bound(self, bound: NormBound) -> u128 {
        match self {
            Symmetry::Quadrant => Shape::quadrant_cells_bound(bound),
            Symmetry::Octant => Shape::octant_cells_bound(bound),
        }
    }

    /// True if `g` lies in this canonical region.
    #[inline]
    pub fn contains(self, g: Gint) -> bool {
        g.a >= 1
            && match self {
                Symmetry::Quadrant => true,
                Symmetry::Octant => g.in_octant(),
            }
    }

    /// First-quadrant points represented by a canonical point.
    pub fn expand(self, g: Gint) -> impl Iterator<Item = Gint> {
        let mirror = match self {
            Symmetry::Octant if g.b > 0 && g.b < g.a => Some(g.flip()),
            _ => None,
        };
        std::iter::once(g).chain(mirror)
    }

    /// Number of first-quadrant points `g` stands for.
    #[inline]
    pub fn multiplicity(self, g: Gint) -> u64 {
        match self {
            Symmetry::Octant if g.b > 0 && g.b < g.a => 2,
            _ => 1,
        }
    }

    /// Primes to cross off when the canonical prime `g` is discovered.
    ///
    /// In the octant layout the mirror of `g` has different multiples, and
    /// those multiples fold back into the octant, so both are sieved.
    pub fn sieving_primes(self, g: Gint) -> impl Iterator<Item = SievingPrime> {
        self.expand(g).map(SievingPrime::from_canonical)
    }

    /// Canonical representative of the associate-and-conjugate class of
    /// `z`, or `None` for zero. Quadrant layout ignores conjugation.
    pub fn canonicalize(self, z: GaussianInt) -> Option<Gint> {
        let q = z.quadrant()?;
        let w = z.rotate(4 - q);
        let g = w.to_gint()?;
        Some(match self {
            Symmetry::Octant if g.b > g.a => g.flip(),
            _ => g,
        })
    }
}

/// The four associates `u·g` for `u ∈ {1, i, -1, -i}`.
pub fn associates(g: Gint) -> [GaussianInt; 4] {
    let z = g.to_signed();
    [z, z.rotate(1), z.rotate(2), z.rotate(3)]
}

/// All associates of a list of first-quadrant points.
pub fn full_plane(points: &[Gint]) -> Vec<GaussianInt> {
    points.iter().flat_map(|g| associates(*g)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn octant_expansion() {
        let sym = Symmetry::Octant;
        assert_eq!(sym.expand(Gint::new(2, 1)).collect::<Vec<_>>(), vec![Gint::new(2, 1), Gint::new(1, 2)]);
        assert_eq!(sym.expand(Gint::new(1, 1)).count(), 1);
        assert_eq!(sym.expand(Gint::new(3, 0)).count(), 1);
        assert_eq!(sym.multiplicity(Gint::new(5, 2)), 2);
        assert_eq!(Symmetry::Quadrant.expand(Gint::new(2, 1)).count(), 1);
    }

    #[test]
    fn canonicalize_folds_every_associate() {
        for g in [Gint::new(2, 1), Gint::new(1, 2), Gint::new(7, 0), Gint::new(1, 1)] {
            for z in associates(g) {
                assert_eq!(Symmetry::Quadrant.canonicalize(z), Some(g));
                let folded = Symmetry::Octant.canonicalize(z).unwrap();
                assert!(Symmetry::Octant.contains(folded));
                assert!(folded == g || folded == g.flip());
            }
        }
        assert_eq!(Symmetry::Octant.canonicalize(GaussianInt::ZERO), None);
    }

    #[test]
    fn contains_requires_positive_real_part() {
        assert!(!Symmetry::Quadrant.contains(Gint::new(0, 3)));
        assert!(Symmetry::Quadrant.contains(Gint::new(1, 3)));
        assert!(!Symmetry::Octant.contains(Gint::new(1, 3)));
    }

    #[test]
    fn full_plane_quadruples() {
        let v = full_plane(&[Gint::new(1, 1), Gint::new(3, 0)]);
        assert_eq!(v.len(), 8);
        assert!(v.contains(&GaussianInt::new(0, -3)));
        assert!(v.contains(&GaussianInt::new(-1, 1)));
    }

    #[test]
    fn symmetry_serializes_lowercase() {
        let s = serde_json::to_string(&Symmetry::Octant).unwrap();
        assert_eq!(s, "\"octant\"");
    }
}
