//! Candidate domain: lattice points, norm bounds, storage shapes and the
//! ordered candidate list that drives prime discovery.

pub mod bound;
pub mod candidates;
pub mod gint;
pub mod shape;

pub use bound::{MAX_NORM, NormBound, isqrt};
pub use candidates::SortedCandidates;
pub use gint::{GaussianInt, Gint, as_flat};
pub use shape::{ColumnSpan, Shape};
