//! Strongly-typed identifiers and the [`Timestep`] alias.

use std::fmt;

/// Stable identifier of a mesh unit.
///
/// Assigned when the unit is created (typically from the mesh input file)
/// and never changed afterwards. A unit keeps its id across grid
/// reallocation, position shifts, and cloning into a child grid; it is the
/// key used for input/output correlation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u64);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UnitId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifier of a patch within one grid.
///
/// Patch ids are assigned by the grid when a patch is added and recycled
/// through a free list when a patch is removed, so they stay small and
/// stable for the patch's lifetime. Ids are unique per grid, not globally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatchId(pub u32);

impl fmt::Display for PatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PatchId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// A simulation timestep index.
///
/// Timesteps are 1-based: the outer loop of a run counts `1..=nts`. The
/// value 0 is reserved for "activated at initialization" in the unit
/// lifecycle.
pub type Timestep = u32;
