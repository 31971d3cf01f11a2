//! Engine selection and tuning for the counting and listing entry points.
//!
//! Configurations are plain serde structs, so they can be loaded from a
//! JSON or TOML document; missing fields take their defaults.

use serde::{Deserialize, Serialize};

use crate::segment::DEFAULT_BLOCK_AREA;
use crate::sieve_error::{SieveError, SieveResult};

/// Sieve implementation used by [`crate::api::sieve_with`] and
/// [`crate::api::count_with`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Bit array over the whole first quadrant.
    Quadrant,
    /// Bit array over the first octant, mirrored on output.
    Octant,
    /// Wheel-compressed octant blocks.
    #[default]
    Donut,
    /// Strips of bounded windows, optionally in parallel.
    Segmented,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SieveConfig {
    pub engine: Engine,
    /// Pre-clear cells divisible by primes above 2 and 5 (quadrant and
    /// octant engines only).
    pub wheel: bool,
    /// Cells per strip for the segmented engine.
    pub block_area: usize,
    /// Run segmented strips on the rayon pool.
    pub parallel: bool,
}

impl Default for SieveConfig {
    fn default() -> Self {
        Self {
            engine: Engine::Donut,
            wheel: false,
            block_area: DEFAULT_BLOCK_AREA,
            parallel: cfg!(feature = "rayon"),
        }
    }
}

impl SieveConfig {
    pub fn with_engine(engine: Engine) -> Self {
        Self { engine, ..Self::default() }
    }

    pub fn validate(&self) -> SieveResult<()> {
        if self.block_area == 0 {
            return Err(SieveError::region("block_area must be positive"));
        }
        if self.wheel && matches!(self.engine, Engine::Donut | Engine::Segmented) {
            log::warn!("wheel prefilter has no effect on the {:?} engine", self.engine);
        }
        Ok(())
    }
}
