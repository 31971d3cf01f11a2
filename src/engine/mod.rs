//! Base sieve engine: bit-packed storage, sieving primes and the
//! self-bootstrapping driver.

pub mod array;
pub mod base;
pub mod prime;

pub use array::SieveArray;
pub use base::{BaseSieve, SieveStats, SievedRegion};
pub use prime::{SievingPrime, mul_mod, pow_mod};
