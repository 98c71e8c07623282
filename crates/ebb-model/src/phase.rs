//! The phase schedule: ordered phase callables for one domain.
//!
//! A timestep is split into phases. Every domain in a project registers
//! the same number of phases, and the engine runs them in registration
//! order, synchronizing with the domain's parent or children between
//! phases. A phase callable receives the model by mutable reference and
//! the 1-based timestep; the engine never inspects what it does.

use ebb_core::Timestep;
use std::sync::Arc;

use crate::error::ModelError;

/// A phase callable: one stage of a timestep, applied to the model.
///
/// # Contract
///
/// - must not panic;
/// - must not block on framework primitives (the pool, the barrier);
/// - must complete in finite time. There is no cancellation or timeout;
///   a phase that never returns hangs the whole project.
pub type PhaseFn<M> = Box<dyn FnMut(&mut M, Timestep) + Send>;

/// Counts registered phases on behalf of the schedule.
///
/// Implemented by the engine's control point. The schedule talks to it
/// through this trait so that phase registration and barrier progress
/// share one counter without this crate depending on the engine.
pub trait PhaseCounter: Send + Sync {
    /// Record one newly registered phase.
    fn register_phase(&self);

    /// Number of phases registered so far.
    fn phase_count(&self) -> u32;
}

/// Ordered table of phase callables for one domain.
///
/// Models append phases during `instantiate_members` or `do_initialize`;
/// the table is fixed once timestepping begins. Each insertion also
/// advances the domain's [`PhaseCounter`] and verifies the two counts
/// agree.
pub struct PhaseSchedule<M> {
    phases: Vec<PhaseFn<M>>,
    counter: Arc<dyn PhaseCounter>,
}

impl<M> PhaseSchedule<M> {
    /// Create an empty schedule wired to the domain's phase counter.
    pub fn new(counter: Arc<dyn PhaseCounter>) -> Self {
        Self {
            phases: Vec::new(),
            counter,
        }
    }

    /// Append a phase to the schedule.
    ///
    /// Phases run in insertion order within every timestep.
    pub fn insert_phase(
        &mut self,
        phase: impl FnMut(&mut M, Timestep) + Send + 'static,
    ) -> Result<(), ModelError> {
        self.phases.push(Box::new(phase));
        self.counter.register_phase();
        let control = self.counter.phase_count();
        if control as usize != self.phases.len() {
            return Err(ModelError::PhaseCountMismatch {
                registered: self.phases.len(),
                control,
            });
        }
        Ok(())
    }

    /// Number of registered phases.
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Whether no phases are registered.
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Run phase `index` for timestep `ts`.
    ///
    /// Invoked by the domain driver between its barrier checks.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range; the driver iterates
    /// `0..self.len()`.
    pub fn run(&mut self, index: usize, model: &mut M, ts: Timestep) {
        (self.phases[index])(model, ts);
    }
}
