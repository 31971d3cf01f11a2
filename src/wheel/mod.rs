//! Modulus-10 wheel: residue tables, the prefilter for plain arrays and the
//! compressed octant ("donut") sieve.

pub mod donut;
pub mod tables;

pub use donut::DonutSieve;
pub use tables::{CLASSES, MODULUS, WHEEL, WHEEL_PRIMES, Wheel};
