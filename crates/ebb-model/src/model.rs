//! The per-domain model contract.

use ebb_core::Timestep;

use crate::error::ModelError;
use crate::phase::PhaseSchedule;

/// Contract implemented by the model behind each domain.
///
/// A model encapsulates everything the framework treats as opaque: the
/// computational grid, the solver, inputs, and outputs. The project
/// drives the hooks in a fixed order across all domains before
/// timestepping begins:
///
/// 1. [`instantiate_members`](Self::instantiate_members): construct
///    solver, grid, and output objects;
/// 2. [`read_inputs`](Self::read_inputs): populate model parameters from
///    files;
/// 3. [`do_initialize`](Self::do_initialize): finish initialization and
///    register phases.
///
/// Phases may be registered in step 1 or step 3; the table is fixed once
/// the project has compared timestepping parameters across domains.
/// After the last timestep, [`post_process`](Self::post_process) runs
/// once per domain, in project order.
pub trait HydroModel: Send + Sized {
    /// Construct model members (solver, grid, outputs). Called first.
    fn instantiate_members(
        &mut self,
        phases: &mut PhaseSchedule<Self>,
    ) -> Result<(), ModelError>;

    /// Read model inputs from files. Called second.
    fn read_inputs(&mut self) -> Result<(), ModelError>;

    /// Complete initialization and register phases. Called third.
    fn do_initialize(&mut self, phases: &mut PhaseSchedule<Self>) -> Result<(), ModelError>;

    /// Total number of timesteps this model wants to run.
    ///
    /// Every domain in a project must report the same value.
    fn nts(&self) -> Timestep;

    /// Final pass after all timesteps have completed.
    fn post_process(&mut self) -> Result<(), ModelError>;

    /// Receive the intra-domain processor budget.
    ///
    /// Called during concurrency configuration with the number of
    /// processors the model's solver may use internally. The default
    /// implementation ignores the value.
    fn set_intra_budget(&mut self, _n_procs: u32) {}
}
