//! Region queries beyond plain bounds: angular sectors, sector races and
//! moat connectivity, including vertical moats and strip-wise component
//! counts.

pub mod moat;
pub mod race;
pub mod sector;
pub mod strip_moat;
pub mod vertical_moat;

pub use moat::{JUMP_TOLERANCE, JumpSet, MoatGraph, main_component_bound};
pub use race::{RaceCheckpoint, SectorRace, angular_histogram};
pub use sector::{QuadrantSector, Sector, SectorSieve};
pub use strip_moat::{MainComponent, SegmentedMoat};
pub use vertical_moat::{VerticalMoat, VerticalMoatReport};
