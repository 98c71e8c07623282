//! Mesh-specific error types.

use std::error::Error;
use std::fmt;

use ebb_core::{PatchId, Timestep, UnitId};

/// Errors from grid, patch, and unit operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MeshError {
    /// A handle whose slot has been vacated or reused since it was taken.
    StaleHandle {
        /// Slot index encoded in the handle.
        slot: u32,
        /// Generation encoded in the handle.
        generation: u32,
    },
    /// No unit store of the requested type exists in this grid.
    UnknownUnitType {
        /// Type name of the requested unit type.
        type_name: &'static str,
    },
    /// No unit with the given id exists in the store.
    UnknownUnit {
        /// The unrecognised unit id.
        id: UnitId,
    },
    /// A unit's recorded position disagrees with the store's sequence.
    PositionMismatch {
        /// Id of the unit whose position was checked.
        id: UnitId,
        /// Position recorded on the unit.
        stored: u32,
        /// Position the store actually holds the unit at, if any.
        found: Option<u32>,
    },
    /// A position beyond the end of the store's sequence.
    UnknownPosition {
        /// The requested position.
        pos: u32,
        /// Number of units currently in the sequence.
        len: u32,
    },
    /// No patch with the given id exists in this grid.
    UnknownPatch {
        /// The unrecognised patch id.
        id: PatchId,
    },
    /// An id was assigned to a patch that already has one.
    PatchIdAssigned {
        /// The id the patch already carries.
        id: PatchId,
    },
    /// A locked patch was used before its references were rebuilt.
    PatchLocked {
        /// Id of the locked patch.
        id: PatchId,
    },
    /// `activate` was called on a unit that is already active.
    AlreadyActive {
        /// Id of the unit.
        id: UnitId,
        /// Timestep at which the unit was activated.
        activated_at: Timestep,
    },
    /// `deactivate` was called on a unit that is not active.
    NotActive {
        /// Id of the unit.
        id: UnitId,
    },
    /// The unit does not belong to the patch it was excluded from.
    NotInPatch {
        /// Id of the unit.
        unit: UnitId,
        /// Id of the patch named in the operation.
        patch: PatchId,
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleHandle { slot, generation } => {
                write!(
                    f,
                    "stale unit handle: slot {slot}, generation {generation}"
                )
            }
            Self::UnknownUnitType { type_name } => {
                write!(f, "grid has no unit store of type {type_name}")
            }
            Self::UnknownUnit { id } => write!(f, "no unit with id {id}"),
            Self::PositionMismatch { id, stored, found } => match found {
                Some(found) => write!(
                    f,
                    "unit {id} records position {stored} but is stored at {found}"
                ),
                None => write!(
                    f,
                    "unit {id} records position {stored} but is not in the sequence"
                ),
            },
            Self::UnknownPosition { pos, len } => {
                write!(f, "position {pos} is out of range for sequence of {len}")
            }
            Self::UnknownPatch { id } => write!(f, "no patch with id {id}"),
            Self::PatchIdAssigned { id } => {
                write!(f, "patch already carries id {id}")
            }
            Self::PatchLocked { id } => {
                write!(
                    f,
                    "patch {id} is locked; rebuild its references before use"
                )
            }
            Self::AlreadyActive { id, activated_at } => {
                write!(
                    f,
                    "unit {id} is already active (activated at timestep {activated_at})"
                )
            }
            Self::NotActive { id } => write!(f, "unit {id} is not active"),
            Self::NotInPatch { unit, patch } => {
                write!(f, "unit {unit} is not a member of patch {patch}")
            }
        }
    }
}

impl Error for MeshError {}
