//! Ebb: a framework for hydrodynamic simulations on nested
//! computational grids.
//!
//! A coarse parent domain and one or more finer child domains advance
//! through lockstep timestep phases on separate workers, rationed by a
//! shared processor pool. Model implementors plug concrete grids,
//! solvers, inputs, and outputs into the skeleton; the framework owns
//! hierarchy, phasing, and cross-domain synchronization.
//!
//! This is the top-level facade crate re-exporting the public API of
//! the Ebb sub-crates. For most users, depending on `ebb` alone is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use ebb::prelude::*;
//!
//! // A model whose two phases just count invocations.
//! struct Ripple {
//!     steps: Timestep,
//!     calls: u32,
//! }
//!
//! impl HydroModel for Ripple {
//!     fn instantiate_members(
//!         &mut self,
//!         _phases: &mut PhaseSchedule<Self>,
//!     ) -> Result<(), ModelError> {
//!         Ok(())
//!     }
//!     fn read_inputs(&mut self) -> Result<(), ModelError> {
//!         Ok(())
//!     }
//!     fn do_initialize(&mut self, phases: &mut PhaseSchedule<Self>) -> Result<(), ModelError> {
//!         phases.insert_phase(|m: &mut Self, _ts| m.calls += 1)?;
//!         phases.insert_phase(|m: &mut Self, _ts| m.calls += 1)
//!     }
//!     fn nts(&self) -> Timestep {
//!         self.steps
//!     }
//!     fn post_process(&mut self) -> Result<(), ModelError> {
//!         Ok(())
//!     }
//! }
//!
//! let mut project = Project::new("demo");
//! project
//!     .add_domain(Domain::new("main", "/in", "/out", Ripple { steps: 3, calls: 0 }))
//!     .unwrap();
//! project.run(ConcurrencyConfig::default()).unwrap();
//! assert_eq!(project.domain("main").unwrap().model().calls, 6);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`ids`] | `ebb-core` | Typed identifiers and the timestep alias |
//! | [`mesh`] | `ebb-mesh` | Grid, patch, unit, and unit-handle data model |
//! | [`model`] | `ebb-model` | Model hooks, phase schedule, solver seam |
//! | [`engine`] | `ebb-engine` | Control points, pool, domains, the project driver |
//! | [`io`] | `ebb-io` | Project file parsing, output contract, logging setup |

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Typed identifiers and the timestep alias (`ebb-core`).
pub use ebb_core as ids;

/// Grid, patch, unit, and unit-handle data model (`ebb-mesh`).
///
/// [`mesh::Grid`] is the per-domain mesh container; [`mesh::UnitHandle`]
/// is the stable reference type that survives storage reallocation.
pub use ebb_mesh as mesh;

/// Model hooks, phase schedule, and the solver seam (`ebb-model`).
///
/// [`model::HydroModel`] is the main extension point for user models.
pub use ebb_model as model;

/// The timestepping coordination engine (`ebb-engine`).
///
/// [`engine::Project`] drives a run; [`engine::Domain`] is the
/// per-region phase driver.
pub use ebb_engine as engine;

/// Project input parsing, the output contract, and logging (`ebb-io`).
pub use ebb_io as io;

/// Common imports for typical Ebb usage.
///
/// ```rust
/// use ebb::prelude::*;
/// ```
pub mod prelude {
    pub use ebb_core::{PatchId, Timestep, UnitId};

    pub use ebb_mesh::{Grid, GridPatch, GridUnit, MeshError, PatchCore, UnitCore, UnitHandle};

    pub use ebb_model::{HydroModel, ModelError, PhaseSchedule, Solver};

    pub use ebb_engine::{ConcurrencyConfig, ControlPoint, Domain, EngineError, Pool, Project};

    pub use ebb_io::{init_logging, DomainEntry, InputError, Output, ProjectFile};
}
