//! Column shapes of sieve storage.
//!
//! A [`Shape`] lists, for consecutive columns `a = first_column, ...`, the
//! contiguous range of `b` values stored in that column. Quadrant and octant
//! arrays start every column at `b = 0`; windows and sectors may start higher.

use std::f64::consts::{FRAC_PI_4, FRAC_PI_8};
use std::ops::Range;

use crate::domain::bound::NormBound;
use crate::sieve_error::{SieveResult, reserve_exact};

/// Half-open range `[start, end)` of `b` values stored for one column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct ColumnSpan {
    pub start: u32,
    pub end: u32,
}

impl ColumnSpan {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        ColumnSpan { start, end }
    }

    #[inline]
    pub const fn len(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.end <= self.start
    }

    #[inline]
    pub const fn contains(self, b: u32) -> bool {
        self.start <= b && b < self.end
    }
}

/// Column layout of a sieve array.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Shape {
    first_column: u32,
    spans: Vec<ColumnSpan>,
}

impl Shape {
    pub fn from_spans(first_column: u32, spans: Vec<ColumnSpan>) -> Self {
        Shape { first_column, spans }
    }

    /// Every point `a, b ≥ 0` with `a² + b² ≤ X`.
    pub fn quadrant(bound: NormBound) -> SieveResult<Self> {
        Shape::by_column(bound, Shape::quadrant_cells_bound(bound), |a| bound.column_top(a))
    }

    /// Every point `0 ≤ b ≤ a` with `a² + b² ≤ X`.
    pub fn octant(bound: NormBound) -> SieveResult<Self> {
        Shape::by_column(bound, Shape::octant_cells_bound(bound), |a| a.min(bound.column_top(a)))
    }

    fn by_column(bound: NormBound, cells: u128, top: impl Fn(u32) -> u32) -> SieveResult<Self> {
        let mut spans = reserve_exact(u128::from(bound.radius()) + 1, cells)?;
        spans.extend((0..=bound.radius()).map(|a| ColumnSpan::new(0, top(a) + 1)));
        Ok(Shape::from_spans(0, spans))
    }

    /// Axis-aligned rectangle `[x, x + width) × [y, y + height)`.
    pub fn rectangle(x: u32, y: u32, width: u32, height: u32) -> SieveResult<Self> {
        let mut spans = reserve_exact(u128::from(width), u128::from(width) * u128::from(height))?;
        spans.resize(width as usize, ColumnSpan::new(y, y + height));
        Ok(Shape::from_spans(x, spans))
    }

    /// Upper bound on the cells of [`Shape::quadrant`], computed without
    /// building it.
    ///
    /// The unit squares at the lattice points lie inside the quarter disc of
    /// radius `√X + √2`.
    pub fn quadrant_cells_bound(bound: NormBound) -> u128 {
        let r = f64::from(bound.radius()) + 2.5;
        (FRAC_PI_4 * r * r).ceil() as u128
    }

    /// Upper bound on the cells of [`Shape::octant`]; the diagonal adds a
    /// strip of width one to the eighth disc.
    pub fn octant_cells_bound(bound: NormBound) -> u128 {
        let r = f64::from(bound.radius()) + 2.5;
        (FRAC_PI_8 * r * r).ceil() as u128 + u128::from(bound.radius()) + 3
    }

    #[inline]
    pub fn first_column(&self) -> u32 {
        self.first_column
    }

    #[inline]
    pub fn columns(&self) -> Range<u32> {
        self.first_column..self.first_column + self.spans.len() as u32
    }

    #[inline]
    pub fn spans(&self) -> &[ColumnSpan] {
        &self.spans
    }

    /// Span of column `a`, if the column exists.
    #[inline]
    pub fn span(&self, a: u32) -> Option<ColumnSpan> {
        let i = a.checked_sub(self.first_column)? as usize;
        self.spans.get(i).copied()
    }

    #[inline]
    pub fn contains(&self, a: u32, b: u32) -> bool {
        self.span(a).is_some_and(|s| s.contains(b))
    }

    /// Total number of cells, computed without overflow.
    pub fn cell_count(&self) -> u128 {
        self.spans.iter().map(|s| u128::from(s.len())).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadrant_columns_follow_the_disk() {
        let s = Shape::quadrant(NormBound::new(10).unwrap()).unwrap();
        let lens: Vec<u32> = s.spans().iter().map(|c| c.len()).collect();
        assert_eq!(lens, vec![4, 4, 3, 2]);
        assert!(s.contains(3, 1));
        assert!(!s.contains(3, 2));
        assert_eq!(s.cell_count(), 13);
    }

    #[test]
    fn octant_is_capped_by_diagonal() {
        let s = Shape::octant(NormBound::new(10).unwrap()).unwrap();
        let lens: Vec<u32> = s.spans().iter().map(|c| c.len()).collect();
        assert_eq!(lens, vec![1, 2, 3, 2]);
        assert!(s.contains(2, 2));
        assert!(!s.contains(1, 2));
    }

    #[test]
    fn rectangle_offsets() {
        let s = Shape::rectangle(5, 7, 3, 2).unwrap();
        assert_eq!(s.columns(), 5..8);
        assert!(s.contains(5, 7));
        assert!(!s.contains(4, 7));
        assert!(!s.contains(7, 9));
        assert_eq!(s.span(100), None);
    }

    #[test]
    fn cell_bounds_cover_the_layouts() {
        for x in (0..2_000).chain([10_007, 99_991, 1_000_000]) {
            let bound = NormBound::new(x).unwrap();
            let quad = Shape::quadrant(bound).unwrap().cell_count();
            let oct = Shape::octant(bound).unwrap().cell_count();
            assert!(quad <= Shape::quadrant_cells_bound(bound), "x = {x}");
            assert!(oct <= Shape::octant_cells_bound(bound), "x = {x}");
        }
        let top = NormBound::new(crate::domain::bound::MAX_NORM).unwrap();
        assert!(Shape::quadrant_cells_bound(top) > 1u128 << 62);
    }
}
