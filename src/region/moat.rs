//! Moat connectivity: Gaussian primes joined when at most `k` apart.
//!
//! Two primes are adjacent when their Euclidean distance is at most the
//! jump size `k`. Components are computed in the closed first octant
//! `0 ≤ b ≤ a`: folding the plane onto it by units and conjugation never
//! increases distances, so every octant component is the fold of a
//! component of the whole plane.
//!
//! [`MoatGraph`] stores adjacency in CSR form (`xadj`/`adjncy` over a
//! sorted vertex `order`) for component listings. The component of the
//! origin is explored directly on the sieve bits instead, since only the
//! part reachable from `1 + i` is needed.

use std::collections::VecDeque;

use hashbrown::HashMap;
use itertools::iproduct;

use crate::domain::bound::NormBound;
use crate::domain::gint::{GaussianInt, Gint};
use crate::engine::base::BaseSieve;
use crate::sieve_error::{SieveError, SieveResult};
use crate::symmetry::Symmetry;

/// Slack added to the jump size so that `k = 2.828` still reaches `√8`.
pub const JUMP_TOLERANCE: f64 = 1e-3;

/// Jump sizes and the norm bound each needs for the origin's component to
/// be enclosed by a moat.
const MAIN_COMPONENT_BOUNDS: [(f64, u64); 6] = [
    (2.1, 3_000),
    (3.0, 10_000),
    (4.0, 1_100_000),
    (4.2, 20_000_000),
    (4.4, 116_000_000),
    (5.0, 17_900_000_000),
];

/// Norm bound large enough to enclose the origin's component for `jump`.
pub fn main_component_bound(jump: f64) -> SieveResult<u64> {
    MAIN_COMPONENT_BOUNDS
        .iter()
        .find(|(limit, _)| jump < *limit)
        .map(|&(_, bound)| bound)
        .ok_or_else(|| SieveError::region(format!("no known moat bound for jump size {}", jump)))
}

/// Non-zero lattice offsets of length at most `k`.
#[derive(Clone, Debug, PartialEq)]
pub struct JumpSet {
    jump: f64,
    offsets: Vec<(i64, i64)>,
}

impl JumpSet {
    pub fn new(jump: f64) -> SieveResult<Self> {
        if !jump.is_finite() || jump <= 0.0 {
            return Err(SieveError::region(format!("jump size {} must be positive and finite", jump)));
        }
        let reach = jump + JUMP_TOLERANCE;
        let r = reach.floor() as i64;
        let offsets = iproduct!(-r..=r, -r..=r)
            .filter(|&(u, v)| (u, v) != (0, 0) && ((u * u + v * v) as f64) <= reach * reach)
            .collect();
        Ok(JumpSet { jump, offsets })
    }

    #[inline]
    pub fn jump(&self) -> f64 {
        self.jump
    }

    #[inline]
    pub fn offsets(&self) -> &[(i64, i64)] {
        &self.offsets
    }

    /// True if the jump reaches `1 + i` from the origin.
    #[inline]
    pub fn leaves_origin(&self) -> bool {
        self.offsets.contains(&(1, 1))
    }
}

/// Adjacency of a point set under a [`JumpSet`], in CSR form.
#[derive(Clone, Debug, Default)]
pub struct MoatGraph {
    /// CSR offsets into `adjncy` for each vertex.
    pub xadj: Vec<usize>,
    /// Neighbor indices into `order`, ascending per vertex.
    pub adjncy: Vec<usize>,
    /// Vertices sorted by norm then larger real part.
    pub order: Vec<Gint>,
}

impl MoatGraph {
    /// Builds the graph; neighbors outside `points` are ignored.
    pub fn build(points: impl IntoIterator<Item = Gint>, jumps: &JumpSet) -> Self {
        let mut order: Vec<Gint> = points.into_iter().collect();
        order.sort_unstable();
        order.dedup();
        let index: HashMap<Gint, usize> = order.iter().enumerate().map(|(i, g)| (*g, i)).collect();

        let mut xadj = Vec::with_capacity(order.len() + 1);
        let mut adjncy = Vec::new();
        xadj.push(0);
        for g in &order {
            let start = adjncy.len();
            for &(du, dv) in jumps.offsets() {
                let z = GaussianInt::new(i64::from(g.a) + du, i64::from(g.b) + dv);
                if let Some(&j) = z.to_gint().and_then(|h| index.get(&h)) {
                    adjncy.push(j);
                }
            }
            adjncy[start..].sort_unstable();
            xadj.push(adjncy.len());
        }
        log::trace!("moat graph: {} vertices, {} directed edges", order.len(), adjncy.len());
        MoatGraph { xadj, adjncy, order }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.adjncy[self.xadj[i]..self.xadj[i + 1]]
    }

    pub fn index_of(&self, g: Gint) -> Option<usize> {
        self.order.binary_search(&g).ok()
    }

    fn bfs(&self, seed: usize, seen: &mut [bool]) -> Vec<Gint> {
        let mut queue = VecDeque::from([seed]);
        let mut out = vec![self.order[seed]];
        seen[seed] = true;
        while let Some(i) = queue.pop_front() {
            for &j in self.neighbors(i) {
                if !seen[j] {
                    seen[j] = true;
                    out.push(self.order[j]);
                    queue.push_back(j);
                }
            }
        }
        out.sort_unstable();
        out
    }

    /// Connected components, each sorted, listed by their smallest vertex.
    pub fn components(&self) -> Vec<Vec<Gint>> {
        let mut seen = vec![false; self.len()];
        let mut out = Vec::new();
        for i in 0..self.len() {
            if !seen[i] {
                out.push(self.bfs(i, &mut seen));
            }
        }
        out
    }

    /// Component containing `g`, if `g` is a vertex.
    pub fn component_of(&self, g: Gint) -> Option<Vec<Gint>> {
        let i = self.index_of(g)?;
        Some(self.bfs(i, &mut vec![false; self.len()]))
    }
}

/// Components of the octant primes of norm at most `bound`.
///
/// The graph is truncated at the bound, so components touching it may be
/// parts of larger ones.
pub fn octant_components(bound: NormBound, jumps: &JumpSet) -> SieveResult<Vec<Vec<Gint>>> {
    let region = BaseSieve::new(bound).symmetry(Symmetry::Octant).run()?;
    let graph = MoatGraph::build(region.canonical(), jumps);
    let components = graph.components();
    log::debug!(
        "moat components to {} with jump {}: {} primes in {} components",
        bound,
        jumps.jump(),
        graph.len(),
        components.len()
    );
    Ok(components)
}

/// Octant primes reachable from the origin by jumps of at most `k`.
///
/// The search runs on the sieve bits of the octant. If any prime of the
/// component has a neighbor position beyond `bound`, the component is not
/// known to be enclosed and [`SieveError::MoatNotFound`] is returned.
pub fn origin_component(bound: NormBound, jumps: &JumpSet) -> SieveResult<Vec<Gint>> {
    if !jumps.leaves_origin() {
        return Ok(Vec::new());
    }
    let mut unvisited = BaseSieve::new(bound)
        .symmetry(Symmetry::Octant)
        .run()?
        .into_array();
    let start = Gint::new(1, 1);
    if !unvisited.clear(start.a, start.b) {
        return Ok(Vec::new());
    }

    let limit = u128::from(bound.get());
    let mut queue = VecDeque::from([start]);
    let mut component = vec![start];
    while let Some(p) = queue.pop_front() {
        for &(du, dv) in jumps.offsets() {
            let z = GaussianInt::new(i64::from(p.a) + du, i64::from(p.b) + dv);
            if z.norm() > limit {
                log::debug!("origin component escaped the bound {} at {}", bound, z);
                return Err(SieveError::MoatNotFound { jump: jumps.jump(), bound: bound.get() });
            }
            if z.im < 0 || z.im > z.re {
                continue;
            }
            let (a, b) = (z.re as u32, z.im as u32);
            if unvisited.get(a, b) {
                unvisited.clear(a, b);
                component.push(Gint::new(a, b));
                queue.push_back(Gint::new(a, b));
            }
        }
    }
    component.sort_unstable();
    log::debug!("origin component for jump {}: {} octant primes", jumps.jump(), component.len());
    Ok(component)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jumps(k: f64) -> JumpSet {
        JumpSet::new(k).unwrap()
    }

    #[test]
    fn jump_offsets() {
        assert_eq!(jumps(1.0).offsets().len(), 4);
        assert_eq!(jumps(1.5).offsets().len(), 8);
        assert_eq!(jumps(2.0).offsets().len(), 12);
        assert!(jumps(2.828).offsets().contains(&(2, 2)));
        assert!(!jumps(1.0).leaves_origin());
        assert!(JumpSet::new(0.0).is_err());
        assert!(JumpSet::new(f64::INFINITY).is_err());
    }

    #[test]
    fn bound_table() {
        assert_eq!(main_component_bound(2.0), Ok(3_000));
        assert_eq!(main_component_bound(3.0), Ok(1_100_000));
        assert_eq!(main_component_bound(4.3), Ok(116_000_000));
        assert!(main_component_bound(5.0).is_err());
    }

    #[test]
    fn origin_components_with_small_jumps() {
        let n = |k: f64, x: u64| origin_component(NormBound::new(x).unwrap(), &jumps(k)).unwrap().len();
        assert_eq!(n(2.0, 3_000), 92);
        assert_eq!(n(2.83, 10_000), 380);
        assert_eq!(n(1.0, 3_000), 0);
    }

    #[test]
    fn origin_component_escaping_the_bound() {
        let err = origin_component(NormBound::new(50).unwrap(), &jumps(2.0)).unwrap_err();
        assert!(matches!(err, SieveError::MoatNotFound { bound: 50, .. }));
    }

    #[test]
    fn graph_components_agree_with_origin_search() {
        let bound = NormBound::new(3_000).unwrap();
        let js = jumps(2.0);
        let comps = octant_components(bound, &js).unwrap();
        let origin = origin_component(bound, &js).unwrap();
        let containing: Vec<&Vec<Gint>> = comps.iter().filter(|c| c.contains(&Gint::new(1, 1))).collect();
        assert_eq!(containing, vec![&origin]);
        let total: usize = comps.iter().map(Vec::len).sum();
        let primes = BaseSieve::new(bound).symmetry(Symmetry::Octant).run().unwrap().canonical().count();
        assert_eq!(total, primes);
    }

    #[test]
    fn csr_neighbors_are_symmetric() {
        let pts = [Gint::new(1, 1), Gint::new(2, 1), Gint::new(3, 0), Gint::new(7, 0)];
        let g = MoatGraph::build(pts, &jumps(1.5));
        for i in 0..g.len() {
            for &j in g.neighbors(i) {
                assert!(g.neighbors(j).contains(&i));
            }
        }
        assert_eq!(g.component_of(Gint::new(7, 0)), Some(vec![Gint::new(7, 0)]));
        assert_eq!(g.components().len(), 2);
    }
}
