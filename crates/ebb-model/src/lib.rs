//! Model-implementor surface of the Ebb simulation framework.
//!
//! The framework is a skeleton: it owns domain hierarchy, phasing, and
//! cross-domain synchronization, and leaves everything model-specific to
//! the implementor. This crate defines that boundary:
//!
//! - [`HydroModel`] is the per-domain model contract (member
//!   instantiation, input reading, initialization, post-processing);
//! - [`PhaseSchedule`] is the ordered table of phase callables a model
//!   registers during initialization and the engine drives every
//!   timestep;
//! - [`Solver`] is the seam for the numerical kernel itself, which the
//!   framework never inspects.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod error;
mod model;
mod phase;
mod solver;

pub use error::ModelError;
pub use model::HydroModel;
pub use phase::{PhaseCounter, PhaseFn, PhaseSchedule};
pub use solver::Solver;
