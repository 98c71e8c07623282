//! Hierarchical mesh data model for Ebb simulations.
//!
//! A [`Grid`] is the container of discrete model data for one domain. It
//! owns one [`UnitStore`] per unit type (nodes, elements, cells, whatever
//! the discretization needs), a set of [`Patch`]es designating the active
//! regions of the mesh, and, for a child grid, the positional
//! correspondence to the parent grid it was cloned from.
//!
//! Units are stored in slot arenas: a [`UnitHandle`] names a unit by slot
//! index and generation, so it stays valid across storage growth and unit
//! position shifts, and resolves to an error (never a dangling reference)
//! after the unit is removed.
//!
//! Grids are not shared between domain workers. All access happens on the
//! worker that owns the domain; a child solver reads parent units through
//! positional lookups while the phase barrier guarantees the parent is not
//! mutating.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod error;
mod grid;
mod handle;
mod patch;
mod store;
mod unit;

pub use error::MeshError;
pub use grid::Grid;
pub use handle::UnitHandle;
pub use patch::{GridPatch, PatchCore};
pub use store::UnitStore;
pub use unit::{GridUnit, UnitCore};
