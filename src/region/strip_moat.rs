//! Size of the origin's moat component, counted strip by strip.
//!
//! The octant is cut into vertical strips whose rectangles hold about
//! `block_area` cells, left to right. Consecutive strips overlap by
//! `r = ⌊k⌋` columns, so every pair of primes within one jump lies together
//! in some strip. Components of a strip are tied to those of the previous
//! strip through the primes of the overlap, each of which carries a label
//! of a union-find over every label handed out so far. Counting stops once
//! no prime in the right overlap belongs to the origin's label.
//!
//! Only components that reach the overlap, or contain `1 + i`, get a label,
//! so memory follows the strip size rather than the norm reached.

use hashbrown::HashMap;
use serde::Serialize;

use crate::domain::bound::MAX_NORM;
use crate::domain::gint::Gint;
use crate::region::moat::{JumpSet, MoatGraph};
use crate::segment::window::{Bootstrap, Window, WindowSieve};
use crate::sieve_error::{SieveError, SieveResult};

/// Jump sizes from here on are not counted.
pub const MAX_SEGMENTED_JUMP: f64 = 6.0;

/// Strip area used for `jump` unless one is set explicitly.
pub fn default_block_area(jump: f64) -> u64 {
    match jump {
        j if j < 4.0 => 1_000_000,
        j if j < 4.1 => 10_000_000,
        j if j < 4.45 => 100_000_000,
        _ => 1_000_000_000,
    }
}

/// Component labels with union by size; `size` of a root is the number of
/// primes counted for its component.
#[derive(Clone, Debug, Default)]
struct Labels {
    parent: Vec<usize>,
    size: Vec<u64>,
}

impl Labels {
    fn add(&mut self) -> usize {
        self.parent.push(self.parent.len());
        self.size.push(0);
        self.parent.len() - 1
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            // Path halving
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    /// Merges two labels and returns the surviving root.
    fn union(&mut self, a: usize, b: usize) -> usize {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return ra;
        }
        let (big, small) = if self.size[ra] < self.size[rb] { (rb, ra) } else { (ra, rb) };
        self.parent[small] = big;
        self.size[big] += self.size[small];
        big
    }
}

/// Result of [`SegmentedMoat::run`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MainComponent {
    /// Octant primes in the origin's component.
    pub size: u64,
    /// Strips sieved.
    pub strips: usize,
    /// Last column of the last strip.
    pub last_column: u32,
}

/// Builder for the strip-wise origin component count.
///
/// ```rust
/// # use gaussian_sieve::region::SegmentedMoat;
/// let main = SegmentedMoat::new(2.0)?.block_area(2_000).run()?;
/// assert_eq!(main.size, 92);
/// # Ok::<(), gaussian_sieve::SieveError>(())
/// ```
#[derive(Clone, Debug)]
pub struct SegmentedMoat {
    jumps: JumpSet,
    block_area: u64,
    limit: u64,
}

impl SegmentedMoat {
    pub fn new(jump: f64) -> SieveResult<Self> {
        let jumps = JumpSet::new(jump)?;
        if jump >= MAX_SEGMENTED_JUMP {
            return Err(SieveError::region(format!(
                "jump size {} is at least {}, beyond the strip count",
                jump, MAX_SEGMENTED_JUMP
            )));
        }
        Ok(SegmentedMoat { jumps, block_area: default_block_area(jump), limit: MAX_NORM })
    }

    /// Approximate cells per strip.
    pub fn block_area(mut self, cells: u64) -> Self {
        self.block_area = cells.max(1);
        self
    }

    /// Largest norm a strip may reach before the count gives up with
    /// [`SieveError::MoatNotFound`].
    pub fn limit(mut self, norm: u64) -> Self {
        self.limit = norm;
        self
    }

    fn reach(&self) -> u64 {
        self.jumps.offsets().iter().map(|&(du, _)| du.unsigned_abs()).max().unwrap_or(0)
    }

    /// Width of the strip starting at column `x`, so that `w · (x + w)`
    /// is about `block_area`.
    fn strip_width(&self, x: u64) -> u64 {
        let (area, xf) = (self.block_area as f64, x as f64);
        let w = ((area + xf * xf / 4.0).sqrt() - xf / 2.0).floor() as u64;
        w.max(2 * self.reach() + 2)
    }

    pub fn run(&self) -> SieveResult<MainComponent> {
        if !self.jumps.leaves_origin() {
            return Ok(MainComponent { size: 0, strips: 0, last_column: 0 });
        }
        let r = self.reach();
        let origin = Gint::new(1, 1);
        let mut labels = Labels::default();
        let mut boundary: HashMap<Gint, usize> = HashMap::new();
        let mut bootstrap = Bootstrap::covering(0)?;
        let mut main = None;
        let (mut x, mut strips) = (0u64, 0usize);

        loop {
            let right = x + self.strip_width(x);
            let far = 2 * u128::from(right - 1) * u128::from(right - 1);
            if far > u128::from(self.limit) {
                log::debug!("origin component for jump {} reached norm {}", self.jumps.jump(), self.limit);
                return Err(SieveError::MoatNotFound { jump: self.jumps.jump(), bound: self.limit });
            }
            let first = x.max(1);
            let window = Window::new(first as u32, 0, (right - first) as u32, right as u32)?;
            bootstrap.cover(window.max_norm())?;
            let sieve = WindowSieve::run(window, &bootstrap)?;
            let graph = MoatGraph::build(sieve.primes().into_iter().filter(|g| g.in_octant()), &self.jumps);

            let next = right - r;
            let mut next_boundary = HashMap::new();
            for component in graph.components() {
                let mut carried = None;
                for &label in component.iter().filter_map(|g| boundary.get(g)) {
                    carried = Some(match carried {
                        None => label,
                        Some(root) => labels.union(root, label),
                    });
                }
                let is_main = main.is_none() && component.contains(&origin);
                let reaches_next = component.iter().any(|g| u64::from(g.a) >= next);
                let root = match carried {
                    Some(label) => labels.find(label),
                    None if is_main || reaches_next => labels.add(),
                    None => continue,
                };
                labels.size[root] +=
                    component.iter().filter(|g| x == 0 || u64::from(g.a) >= x + r).count() as u64;
                if is_main {
                    main = Some(root);
                }
                next_boundary.extend(component.iter().filter(|g| u64::from(g.a) >= next).map(|g| (*g, root)));
            }
            strips += 1;
            boundary = next_boundary;

            let Some(main_label) = main else {
                return Err(SieveError::inconsistency("1 + i is missing from the first strip"));
            };
            let root = labels.find(main_label);
            log::trace!(
                "strip {} at columns {}..{}: {} primes, origin component {} so far",
                strips,
                first,
                right,
                graph.len(),
                labels.size[root]
            );
            if !boundary.values().any(|&l| labels.find(l) == root) {
                log::debug!(
                    "origin component for jump {}: {} octant primes over {} strips",
                    self.jumps.jump(),
                    labels.size[root],
                    strips
                );
                return Ok(MainComponent { size: labels.size[root], strips, last_column: (right - 1) as u32 });
            }
            x = next;
        }
    }
}
