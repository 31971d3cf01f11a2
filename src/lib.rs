#![cfg_attr(docsrs, feature(doc_cfg))]
//! # gaussian-sieve
//!
//! gaussian-sieve enumerates and counts Gaussian primes, the primes of the
//! ring ℤ[i], up to a norm bound with a sieve of Eratosthenes adapted to the
//! lattice. Beyond plain counts it answers region queries: rectangular
//! windows far from the origin, angular sectors, angular histograms, races
//! between sectors and moat connectivity ("can one walk to infinity on
//! Gaussian primes with steps of length at most k?").
//!
//! ## Features
//! - Self-bootstrapping sieve over the first quadrant or the first octant,
//!   with bit-packed storage shaped to the disk of radius √X
//! - Modulus-10 wheel: a prefilter for plain arrays and a compressed
//!   "donut" engine storing 32 admissible residues per 10×10 block
//! - Window sieve by column congruences, and a segmented sieve over
//!   strips of bounded area, parallel with the `rayon` feature
//! - Sector sieve for arbitrary angular ranges of the plane
//! - Moat components in CSR graph form, a direct search from the origin,
//!   vertical moat walls, and a strip-wise count of the origin's component
//!
//! ## Conventions
//!
//! Every Gaussian prime has four associates. Listings return one
//! representative `a + bi` with `a ≥ 1, b ≥ 0`, sorted by norm and then by
//! larger real part. Counts cover the whole plane, so `count(X)` is four
//! times the length of `sieve(X)`:
//!
//! ```rust
//! use gaussian_sieve::{count, sieve};
//! assert_eq!(sieve(100)?.len(), 25);
//! assert_eq!(count(100)?, 100);
//! # Ok::<(), gaussian_sieve::SieveError>(())
//! ```
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! gaussian-sieve = "0.3"
//! # Optional features:
//! # default-features = false          # drop rayon
//! # features = ["strict-invariants"]  # keep self-checks in release builds
//! ```
//!
//! Engines are chosen with [`SieveConfig`]; the defaults count with the
//! donut engine and list with the octant engine.

pub mod api;
pub mod config;
pub mod debug_invariants;
pub mod domain;
pub mod engine;
pub mod region;
pub mod segment;
pub mod sieve_error;
pub mod symmetry;
pub mod wheel;

pub use api::*;
pub use config::{Engine, SieveConfig};
pub use debug_invariants::DebugInvariants;
pub use domain::{GaussianInt, Gint, MAX_NORM, NormBound, as_flat};
pub use segment::Window;
pub use sieve_error::{SieveError, SieveResult};

/// A convenient prelude to import the most-used types and entry points:
pub mod prelude {
    pub use crate::api::{
        angular_distribution, count, count_sector, count_window, count_with, moat_components,
        moat_components_in_window, moat_main_component, moat_main_component_size, origin_component,
        sector_race, sieve, sieve_block, sieve_sector, sieve_window, sieve_with, vertical_moat,
    };
    pub use crate::config::{Engine, SieveConfig};
    pub use crate::domain::{GaussianInt, Gint, NormBound, as_flat};
    pub use crate::engine::{BaseSieve, SieveArray, SievingPrime};
    pub use crate::region::{
        JumpSet, MoatGraph, RaceCheckpoint, Sector, SectorRace, SegmentedMoat, VerticalMoat,
    };
    pub use crate::segment::{SegmentedSieve, StripProgress, Window, WindowSieve};
    pub use crate::sieve_error::{SieveError, SieveResult};
    pub use crate::symmetry::Symmetry;
    pub use crate::wheel::DonutSieve;
}
