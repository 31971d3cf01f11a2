//! Candidate list for sieving primes.
//!
//! Sieving primes are discovered in ascending norm, so the driver walks a
//! pre-sorted list of every canonical point that could be one. A point is
//! used as a sieving prime when it is still marked in the sieve array at
//! the moment the walk reaches it.

use std::ops::Index;

use crate::domain::gint::Gint;
use crate::domain::shape::Shape;
use crate::sieve_error::{SieveResult, reserve_exact};

/// Canonical points `a ≥ 1` of a shape, sorted by [`Gint`] order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortedCandidates {
    points: Vec<Gint>,
}

impl SortedCandidates {
    /// Collects every cell of `shape` with `a ≥ 1`.
    ///
    /// Built over the shape of the bound `⌊√X⌋`, this is exactly the set of
    /// possible sieving primes for a sieve of bound `X`.
    pub fn from_shape(shape: &Shape) -> SieveResult<Self> {
        let len = shape.cell_count() - shape.span(0).map_or(0, |s| u128::from(s.len()));
        let mut points = reserve_exact(len, len)?;
        points.extend(
            shape
                .columns()
                .zip(shape.spans())
                .filter(|(a, _)| *a >= 1)
                .flat_map(|(a, span)| (span.start..span.end).map(move |b| Gint::new(a, b))),
        );
        points.sort_unstable();
        log::trace!("candidate list holds {} points", points.len());
        Ok(SortedCandidates { points })
    }

    /// Index of the first candidate with norm above one, skipping the unit.
    pub fn first_nonunit(&self) -> usize {
        self.points.partition_point(|g| g.norm() <= 1)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Gint> + '_ {
        self.points.iter()
    }
}

impl Index<usize> for SortedCandidates {
    type Output = Gint;
    fn index(&self, i: usize) -> &Gint {
        &self.points[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bound::NormBound;

    #[test]
    fn quadrant_candidates_are_sorted_and_skip_column_zero() {
        let c = SortedCandidates::from_shape(&Shape::quadrant(NormBound::new(10).unwrap()).unwrap()).unwrap();
        let v: Vec<Gint> = c.iter().copied().collect();
        assert_eq!(
            v,
            vec![
                Gint::new(1, 0),
                Gint::new(1, 1),
                Gint::new(2, 0),
                Gint::new(2, 1),
                Gint::new(1, 2),
                Gint::new(2, 2),
                Gint::new(3, 0),
                Gint::new(3, 1),
                Gint::new(1, 3),
            ]
        );
        assert_eq!(c.first_nonunit(), 1);
    }

    #[test]
    fn empty_shape_has_no_candidates() {
        let c = SortedCandidates::from_shape(&Shape::quadrant(NormBound::new(0).unwrap()).unwrap()).unwrap();
        assert!(c.is_empty());
        assert_eq!(c.first_nonunit(), 0);
    }
}
