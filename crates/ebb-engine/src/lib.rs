//! Timestepping coordination engine for Ebb simulations.
//!
//! A project owns one or more domains: a coarse parent and, optionally,
//! finer children occupying sub-regions of it. Every domain advances
//! through the same ordered sequence of phases each timestep, on its own
//! worker thread. Between phases the domains synchronize: a parent may
//! not start a phase until no child lags behind it, and a child may not
//! start a phase until its parent is far enough ahead, so the two scales
//! stay within one timestep of each other while still running
//! concurrently. A shared processor pool bounds how many phase callables
//! execute simultaneously, independent of worker count.
//!
//! The pieces, bottom up: [`ControlPoint`] (per-domain phase progress),
//! [`Pool`] (the processor budget), the barrier (parent-owned mutex,
//! condition variables, and child progress views), [`Domain`] (the
//! per-domain phase driver), and [`Project`] (the run driver).

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod barrier;
mod config;
mod control;
mod domain;
mod error;
mod pool;
mod project;

pub use config::{ConcurrencyConfig, ResolvedConcurrency};
pub use control::{modular_gap, ControlPoint};
pub use domain::Domain;
pub use error::EngineError;
pub use pool::Pool;
pub use project::Project;
