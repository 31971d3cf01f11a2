//! Windows and segmentation: sieving bounded rectangles with externally
//! supplied primes, and covering the quadrant with strips of such windows.

pub mod strips;
pub mod window;

pub use strips::{DEFAULT_BLOCK_AREA, SegmentedSieve, StripProgress};
pub use window::{Bootstrap, Window, WindowSieve};
