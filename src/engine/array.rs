//! Bit-packed sieve storage.
//!
//! Cells of a [`Shape`] are laid out column by column in one bit vector.
//! `offsets[i]` is the index of the first bit of column `first_column + i`
//! (the CSR convention, so `offsets` has one more entry than columns). A set
//! bit means the cell is still a prime candidate.

use std::ops::Range;

use crate::debug_invariants::{DebugInvariants, ensure};
use crate::domain::gint::Gint;
use crate::domain::shape::{ColumnSpan, Shape};
use crate::sieve_error::{SieveError, SieveResult, reserve_exact};

const WORD_BITS: usize = 64;

#[derive(Clone, Debug)]
pub struct SieveArray {
    shape: Shape,
    offsets: Vec<usize>,
    words: Vec<u64>,
}

impl SieveArray {
    /// Allocates storage for `shape` with every cell marked.
    ///
    /// Fails with [`SieveError::StorageTooLarge`] instead of aborting when the
    /// bit vector cannot be reserved.
    pub fn new(shape: Shape) -> SieveResult<Self> {
        let storage = SieveArray::reserve(shape.cell_count())?;
        SieveArray::with_storage(shape, storage)
    }

    /// Reserves bit storage for up to `cells` cells.
    ///
    /// Callers reserve from an estimate before building a large shape, so an
    /// impossible request fails before anything proportional to it is built.
    pub fn reserve(cells: u128) -> SieveResult<Vec<u64>> {
        reserve_exact(cells.div_ceil(WORD_BITS as u128), cells)
    }

    /// Lays out `shape` over storage from [`SieveArray::reserve`], growing
    /// it if the estimate fell short.
    pub fn with_storage(shape: Shape, mut words: Vec<u64>) -> SieveResult<Self> {
        let cells = shape.cell_count();
        let too_large = || SieveError::StorageTooLarge { cells };
        let bits = usize::try_from(cells).map_err(|_| too_large())?;
        let n_words = bits.div_ceil(WORD_BITS);

        words.clear();
        words.try_reserve_exact(n_words).map_err(|_| too_large())?;
        words.resize(n_words, u64::MAX);
        if bits % WORD_BITS != 0 {
            if let Some(last) = words.last_mut() {
                *last = (1u64 << (bits % WORD_BITS)) - 1;
            }
        }

        let mut offsets = reserve_exact(shape.spans().len() as u128 + 1, cells)?;
        let mut acc = 0usize;
        offsets.push(acc);
        for span in shape.spans() {
            acc += span.len() as usize;
            offsets.push(acc);
        }

        let array = SieveArray { shape, offsets, words };
        array.debug_assert_invariants();
        Ok(array)
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn columns(&self) -> Range<u32> {
        self.shape.columns()
    }

    #[inline]
    pub fn span(&self, a: u32) -> Option<ColumnSpan> {
        self.shape.span(a)
    }

    #[inline]
    pub fn contains(&self, a: u32, b: u32) -> bool {
        self.shape.contains(a, b)
    }

    #[inline]
    fn bit_index(&self, a: u32, b: u32) -> Option<usize> {
        let col = a.checked_sub(self.shape.first_column())? as usize;
        let span = *self.shape.spans().get(col)?;
        span.contains(b)
            .then(|| self.offsets[col] + (b - span.start) as usize)
    }

    #[inline]
    fn clear_bit(&mut self, i: usize) {
        self.words[i / WORD_BITS] &= !(1u64 << (i % WORD_BITS));
    }

    #[inline]
    fn test_bit(&self, i: usize) -> bool {
        (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1
    }

    /// Marked state of `(a, b)`; cells outside the shape read as unmarked.
    #[inline]
    pub fn get(&self, a: u32, b: u32) -> bool {
        self.bit_index(a, b).is_some_and(|i| self.test_bit(i))
    }

    /// Clears `(a, b)` if it lies in the shape. Returns whether it did.
    #[inline]
    pub fn clear(&mut self, a: u32, b: u32) -> bool {
        match self.bit_index(a, b) {
            Some(i) => {
                self.clear_bit(i);
                true
            }
            None => false,
        }
    }

    /// Marks `(a, b)` if it lies in the shape. Returns whether it did.
    #[inline]
    pub fn mark(&mut self, a: u32, b: u32) -> bool {
        match self.bit_index(a, b) {
            Some(i) => {
                self.words[i / WORD_BITS] |= 1u64 << (i % WORD_BITS);
                true
            }
            None => false,
        }
    }

    /// Clears the cells of column `a` whose `b` is congruent to `t` modulo
    /// `step`. Requires `t < step`.
    pub fn clear_progression(&mut self, a: u32, t: u64, step: u64) {
        debug_assert!(t < step);
        let col = match a.checked_sub(self.shape.first_column()) {
            Some(c) if (c as usize) < self.shape.spans().len() => c as usize,
            _ => return,
        };
        let span = self.shape.spans()[col];
        let offset = self.offsets[col];
        let start = u64::from(span.start);
        let mut v = start + (t + step - start % step) % step;
        while v < u64::from(span.end) {
            self.clear_bit(offset + (v - start) as usize);
            v += step;
        }
    }

    /// Clears every cell `(u, v)` with `u ≡ s` and `v ≡ t` modulo `step`.
    /// Requires `s, t < step`.
    pub fn clear_lattice(&mut self, s: u64, t: u64, step: u64) {
        debug_assert!(s < step);
        let cols = self.columns();
        let lo = u64::from(cols.start);
        let mut u = lo + (s + step - lo % step) % step;
        while u < u64::from(cols.end) {
            self.clear_progression(u as u32, t, step);
            u += step;
        }
    }

    /// Clears every cell of column `a`.
    pub fn clear_column(&mut self, a: u32) {
        if let Some(span) = self.span(a) {
            for b in span.start..span.end {
                self.clear(a, b);
            }
        }
    }

    /// Marked cells of column `a`, ascending in `b`.
    pub fn marked_in_column(&self, a: u32) -> impl Iterator<Item = Gint> + '_ {
        let (bits, start) = match a.checked_sub(self.shape.first_column()) {
            Some(c) if (c as usize) < self.shape.spans().len() => {
                let c = c as usize;
                (self.offsets[c]..self.offsets[c + 1], self.shape.spans()[c].start)
            }
            _ => (0..0, 0),
        };
        let base = bits.start;
        self.ones(bits)
            .map(move |i| Gint::new(a, start + (i - base) as u32))
    }

    /// All marked cells in column-major order.
    pub fn marked(&self) -> impl Iterator<Item = Gint> + '_ {
        self.columns().flat_map(move |a| self.marked_in_column(a))
    }

    /// Number of marked cells.
    pub fn count_marked(&self) -> u64 {
        self.words.iter().map(|w| u64::from(w.count_ones())).sum()
    }

    /// Indices of set bits in `range`, skipping empty words.
    fn ones(&self, range: Range<usize>) -> impl Iterator<Item = usize> + '_ {
        let (start, end) = (range.start, range.end);
        let first_word = start / WORD_BITS;
        let last_word = end.div_ceil(WORD_BITS);
        (first_word..last_word).flat_map(move |w| {
            let mut word = self.words[w];
            let lo = w * WORD_BITS;
            if lo < start {
                word &= u64::MAX << (start - lo);
            }
            if lo + WORD_BITS > end {
                word &= (1u64 << (end - lo)) - 1;
            }
            std::iter::from_fn(move || {
                if word == 0 {
                    return None;
                }
                let bit = word.trailing_zeros() as usize;
                word &= word - 1;
                Some(lo + bit)
            })
        })
    }

    /// Heap bytes held by the bit vector.
    pub fn storage_bytes(&self) -> usize {
        self.words.len() * std::mem::size_of::<u64>()
    }
}

impl DebugInvariants for SieveArray {
    fn validate_invariants(&self) -> SieveResult<()> {
        let spans = self.shape.spans();
        ensure(self.offsets.len() == spans.len() + 1, || {
            format!("{} offsets for {} columns", self.offsets.len(), spans.len())
        })?;
        for (i, span) in spans.iter().enumerate() {
            ensure(self.offsets[i + 1] - self.offsets[i] == span.len() as usize, || {
                format!("column {} offset width disagrees with its span", i)
            })?;
        }
        let bits = self.offsets.last().copied().unwrap_or(0);
        ensure(self.words.len() == bits.div_ceil(WORD_BITS), || {
            format!("{} words for {} bits", self.words.len(), bits)
        })?;
        if bits % WORD_BITS != 0 {
            let pad = self.words.last().map_or(0, |w| w >> (bits % WORD_BITS));
            ensure(pad == 0, || "padding bits beyond the last cell are set".into())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bound::NormBound;

    fn quadrant(x: u64) -> SieveArray {
        SieveArray::new(Shape::quadrant(NormBound::new(x).unwrap()).unwrap()).unwrap()
    }

    #[test]
    fn starts_fully_marked() {
        let arr = quadrant(10);
        assert_eq!(arr.count_marked(), 13);
        assert!(arr.get(3, 1));
        assert!(!arr.get(3, 2));
        assert!(arr.validate_invariants().is_ok());
    }

    #[test]
    fn clear_and_mark_ignore_outside_cells() {
        let mut arr = quadrant(10);
        assert!(arr.clear(2, 2));
        assert!(!arr.get(2, 2));
        assert!(!arr.clear(9, 9));
        assert!(arr.mark(2, 2));
        assert!(!arr.mark(9, 9));
        assert_eq!(arr.count_marked(), 13);
    }

    #[test]
    fn progression_respects_span_start() {
        let mut arr = SieveArray::new(Shape::rectangle(10, 7, 2, 10).unwrap()).unwrap();
        arr.clear_progression(10, 0, 3);
        let left: Vec<u32> = arr.marked_in_column(10).map(|g| g.b).collect();
        assert_eq!(left, vec![7, 8, 10, 11, 13, 14, 16]);
        assert_eq!(arr.marked_in_column(11).count(), 10);
    }

    #[test]
    fn lattice_clears_both_residues() {
        let mut arr = quadrant(100);
        arr.clear_lattice(1, 2, 5);
        for a in arr.columns() {
            let span = arr.span(a).unwrap();
            for b in span.start..span.end {
                let hit = a % 5 == 1 && b % 5 == 2;
                assert_eq!(arr.get(a, b), !hit, "({a}, {b})");
            }
        }
    }

    #[test]
    fn marked_walks_columns_in_order() {
        let mut arr = quadrant(2);
        arr.clear(0, 0);
        let v: Vec<Gint> = arr.marked().collect();
        assert_eq!(v, vec![Gint::new(0, 1), Gint::new(1, 0), Gint::new(1, 1)]);
    }

    #[test]
    fn large_shapes_cross_word_boundaries() {
        let arr = quadrant(10_000);
        assert_eq!(arr.marked().count() as u64, arr.count_marked());
        assert!(arr.validate_invariants().is_ok());
    }

    #[test]
    fn estimated_storage_is_reused() {
        let shape = Shape::quadrant(NormBound::new(1000).unwrap()).unwrap();
        let storage = SieveArray::reserve(shape.cell_count() + 500).unwrap();
        let arr = SieveArray::with_storage(shape.clone(), storage).unwrap();
        assert_eq!(arr.count_marked(), shape.cell_count() as u64);
        let short = SieveArray::with_storage(shape, SieveArray::reserve(3).unwrap()).unwrap();
        assert!(short.validate_invariants().is_ok());
        assert!(matches!(SieveArray::reserve(u128::MAX), Err(SieveError::StorageTooLarge { .. })));
    }
}
