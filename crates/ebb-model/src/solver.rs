//! The solver seam: the numerical kernel behind a domain's phases.

use ebb_core::Timestep;

use crate::error::ModelError;

/// Contract for the numerical kernel of a domain.
///
/// The framework never calls a solver directly; models wrap solver
/// methods in the phase callables they register. The trait exists so
/// that nested-grid models share a vocabulary: a child solver pulls
/// boundary data from its parent at matched unit positions during its
/// boundary phase, and both sides adjust their active patches at the
/// start of each timestep.
pub trait Solver: Send {
    /// One-time initialization after the grid is populated.
    fn initialize(&mut self) -> Result<(), ModelError>;

    /// Re-establish the active patches for timestep `ts`.
    ///
    /// Typically runs as (part of) the first phase of a timestep, after
    /// wetting/drying or refinement decisions.
    fn adjust_patches(&mut self, ts: Timestep) -> Result<(), ModelError>;

    /// Impose boundary conditions on the active patches for a phase.
    ///
    /// For a child solver this is where parent boundary data is read at
    /// matched positions; the phase barrier guarantees the parent grid is
    /// quiescent while this runs.
    fn impose_patch_bcs(&mut self, phase: u32) -> Result<(), ModelError>;

    /// Whether this solver belongs to a child domain.
    fn is_child(&self) -> bool;

    /// Number of grids the solver operates on.
    fn n_grids(&self) -> usize;

    /// Intra-domain processor budget granted by the project.
    ///
    /// Defaults to one processor.
    fn intra_budget(&self) -> u32 {
        1
    }
}
