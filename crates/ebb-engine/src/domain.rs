//! Domains: per-region state holders and phase drivers.
//!
//! Each domain encapsulates one model region with its own inputs, grid,
//! solver, and outputs, and drives that model through the phased
//! timestepping loop on its own worker thread. General concerns
//! (hierarchy, phasing, synchronization) live here; everything
//! model-specific is delegated to the [`HydroModel`] behind the domain.

use std::sync::Arc;

use log::{debug, info};
use smallvec::SmallVec;

use ebb_core::Timestep;
use ebb_model::{HydroModel, ModelError, PhaseCounter, PhaseSchedule};

use crate::barrier::Barrier;
use crate::control::ControlPoint;
use crate::error::EngineError;

/// Lifecycle stages of a domain, in order.
///
/// Transitions are driven by the project, except the final one, which
/// happens when the timestepping loop returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Lifecycle {
    Constructed,
    HierarchySet,
    ConcurrencyConfigured,
    Initialized,
    Running,
    Finalized,
}

/// The domain's role in cross-domain synchronization.
#[derive(Debug)]
enum SyncRole {
    /// Not yet configured.
    Unconfigured,
    /// A parent with no children: no barrier, no pool, phases simply
    /// loop.
    Solo,
    /// The parent of one or more children; owns the barrier.
    Parent { barrier: Arc<Barrier> },
    /// A child; borrows the parent's barrier and watches its progress.
    Child {
        barrier: Arc<Barrier>,
        parent_control: Arc<ControlPoint>,
    },
}

/// One model region: identity, hierarchy links, phase schedule, and the
/// synchronization state needed to advance in lockstep with its family.
pub struct Domain<M: HydroModel> {
    id: String,
    path: String,
    output_dir: String,
    model: M,
    phases: PhaseSchedule<M>,
    control: Arc<ControlPoint>,
    /// Index of the parent in the project registry.
    parent: Option<usize>,
    /// Indices of the children in the project registry.
    children: SmallVec<[usize; 4]>,
    hierarchy_set: bool,
    sync: SyncRole,
    lifecycle: Lifecycle,
    intra_budget: u32,
}

// Domains move onto worker threads wholesale; every field must be Send.
#[allow(dead_code)]
fn assert_domain_is_send<M: HydroModel>() {
    fn assert_send<T: Send>() {}
    assert_send::<Domain<M>>();
}

impl<M: HydroModel> Domain<M> {
    /// Construct a domain with its identity and model.
    pub fn new(id: &str, path: &str, output_dir: &str, model: M) -> Self {
        let control = Arc::new(ControlPoint::new());
        let counter: Arc<dyn PhaseCounter> = control.clone() as Arc<dyn PhaseCounter>;
        debug!("domain {id} constructed");
        Self {
            id: id.to_string(),
            path: path.to_string(),
            output_dir: output_dir.to_string(),
            model,
            phases: PhaseSchedule::new(counter),
            control,
            parent: None,
            children: SmallVec::new(),
            hierarchy_set: false,
            sync: SyncRole::Unconfigured,
            lifecycle: Lifecycle::Constructed,
            intra_budget: 1,
        }
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// The domain id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Path of the domain's input files.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The domain's output directory.
    pub fn output_dir(&self) -> &str {
        &self.output_dir
    }

    /// Borrow the model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Mutably borrow the model.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Whether the hierarchy has been finalized.
    pub fn hierarchy_is_set(&self) -> bool {
        self.hierarchy_set
    }

    /// Whether initialization has completed.
    pub fn is_initialized(&self) -> bool {
        self.lifecycle >= Lifecycle::Initialized
    }

    /// Whether this is a parent (top-level) domain.
    ///
    /// Fails until the hierarchy has been finalized.
    pub fn is_parent(&self) -> Result<bool, EngineError> {
        if !self.hierarchy_set {
            return Err(EngineError::HierarchyUnset {
                id: self.id.clone(),
            });
        }
        Ok(self.parent.is_none())
    }

    /// Whether this is a child domain.
    ///
    /// Fails until the hierarchy has been finalized.
    pub fn is_child(&self) -> Result<bool, EngineError> {
        self.is_parent().map(|parent| !parent)
    }

    /// Number of children.
    pub fn n_children(&self) -> usize {
        self.children.len()
    }

    /// Registry index of child `i`.
    pub fn child_index(&self, i: usize) -> Result<usize, EngineError> {
        self.children
            .get(i)
            .copied()
            .ok_or(EngineError::ChildIndexOutOfRange {
                index: i,
                len: self.children.len(),
            })
    }

    /// Registry index of the parent, if any.
    pub fn parent_index(&self) -> Option<usize> {
        self.parent
    }

    /// Number of registered phases.
    pub fn n_phases(&self) -> u32 {
        self.phases.len() as u32
    }

    /// Total timesteps the model wants to run.
    pub fn nts(&self) -> Timestep {
        self.model.nts()
    }

    /// The domain's control point.
    pub fn control(&self) -> &Arc<ControlPoint> {
        &self.control
    }

    /// Intra-domain processor budget granted by the project.
    pub fn intra_budget(&self) -> u32 {
        self.intra_budget
    }

    // ── Hierarchy (project-driven) ─────────────────────────────────

    /// Record the parent's registry index. Fails if already set.
    pub(crate) fn set_parent(&mut self, parent: usize) -> Result<(), EngineError> {
        if self.parent.is_some() {
            return Err(EngineError::ParentAlreadySet {
                id: self.id.clone(),
            });
        }
        self.parent = Some(parent);
        self.mark_hierarchy_set();
        Ok(())
    }

    /// Record a child's registry index.
    pub(crate) fn add_child(&mut self, child: usize) {
        self.children.push(child);
        self.mark_hierarchy_set();
    }

    /// Finalize the hierarchy for a domain with no parent.
    pub(crate) fn set_hierarchy_top(&mut self) {
        self.mark_hierarchy_set();
    }

    fn mark_hierarchy_set(&mut self) {
        self.hierarchy_set = true;
        if self.lifecycle < Lifecycle::HierarchySet {
            self.lifecycle = Lifecycle::HierarchySet;
        }
    }

    // ── Concurrency (project-driven) ───────────────────────────────

    /// Configure a parent's synchronization: build the barrier over the
    /// children's control points, or run solo when there are none.
    pub(crate) fn set_concurrency_parent(
        &mut self,
        pool_size: Option<u32>,
        child_controls: Vec<Arc<ControlPoint>>,
    ) -> Option<Arc<Barrier>> {
        debug_assert!(self.hierarchy_set, "concurrency before hierarchy");
        let barrier = match pool_size {
            Some(size) if !child_controls.is_empty() => {
                let barrier = Arc::new(Barrier::new(size, child_controls));
                self.sync = SyncRole::Parent {
                    barrier: Arc::clone(&barrier),
                };
                Some(barrier)
            }
            _ => {
                self.sync = SyncRole::Solo;
                None
            }
        };
        self.lifecycle = Lifecycle::ConcurrencyConfigured;
        barrier
    }

    /// Configure a child's synchronization from its parent's primitives.
    pub(crate) fn set_concurrency_child(
        &mut self,
        barrier: Arc<Barrier>,
        parent_control: Arc<ControlPoint>,
    ) {
        debug_assert!(self.hierarchy_set, "concurrency before hierarchy");
        self.sync = SyncRole::Child {
            barrier,
            parent_control,
        };
        self.lifecycle = Lifecycle::ConcurrencyConfigured;
    }

    /// Grant the intra-domain processor budget and pass it to the model.
    pub(crate) fn set_intra_budget(&mut self, n_procs: u32) {
        self.intra_budget = n_procs;
        self.model.set_intra_budget(n_procs);
    }

    // ── Initialization (project-driven) ────────────────────────────

    pub(crate) fn instantiate_members(&mut self) -> Result<(), ModelError> {
        self.model.instantiate_members(&mut self.phases)
    }

    pub(crate) fn read_inputs(&mut self) -> Result<(), ModelError> {
        self.model.read_inputs()
    }

    /// Finish initialization: run the model's hook and mark the domain
    /// initialized.
    pub(crate) fn initialize(&mut self) -> Result<(), ModelError> {
        self.model.do_initialize(&mut self.phases)?;
        self.lifecycle = Lifecycle::Initialized;
        Ok(())
    }

    pub(crate) fn post_process(&mut self) -> Result<(), ModelError> {
        self.model.post_process()
    }

    // ── Timestepping ───────────────────────────────────────────────

    /// Block until this domain may enter its next phase, then advance
    /// its control point and take a processor permit.
    fn phase_check(&self) {
        match &self.sync {
            SyncRole::Solo => {}
            SyncRole::Parent { barrier } => barrier.parent_enter(&self.control),
            SyncRole::Child {
                barrier,
                parent_control,
            } => barrier.child_enter(&self.control, parent_control),
            SyncRole::Unconfigured => {
                unreachable!("timestepping before concurrency configuration")
            }
        }
    }

    /// Release the processor permit and signal phase completion.
    fn complete_phase(&self) {
        match &self.sync {
            SyncRole::Solo => {}
            SyncRole::Parent { barrier } => barrier.parent_complete(&self.control),
            SyncRole::Child { barrier, .. } => barrier.child_complete(&self.control),
            SyncRole::Unconfigured => {
                unreachable!("timestepping before concurrency configuration")
            }
        }
    }

    /// Run the timestepping loop: for each of `nts` timesteps, every
    /// registered phase in order, synchronizing at each phase boundary.
    ///
    /// Executed on the domain's worker thread.
    pub(crate) fn timestepping(&mut self, nts: Timestep) {
        info!("initiating timestepping for domain {}", self.id);
        self.lifecycle = Lifecycle::Running;

        let n_phases = self.phases.len();
        for ts in 1..=nts {
            for p in 0..n_phases {
                self.phase_check();
                let (phases, model) = (&mut self.phases, &mut self.model);
                phases.run(p, model, ts);
                self.complete_phase();
            }
        }

        self.lifecycle = Lifecycle::Finalized;
        debug!("domain {} finished {nts} timesteps", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StillWater {
        steps: Timestep,
    }

    impl HydroModel for StillWater {
        fn instantiate_members(
            &mut self,
            _phases: &mut PhaseSchedule<Self>,
        ) -> Result<(), ModelError> {
            Ok(())
        }
        fn read_inputs(&mut self) -> Result<(), ModelError> {
            Ok(())
        }
        fn do_initialize(&mut self, phases: &mut PhaseSchedule<Self>) -> Result<(), ModelError> {
            phases.insert_phase(|_, _| {})?;
            phases.insert_phase(|_, _| {})
        }
        fn nts(&self) -> Timestep {
            self.steps
        }
        fn post_process(&mut self) -> Result<(), ModelError> {
            Ok(())
        }
    }

    fn test_domain() -> Domain<StillWater> {
        Domain::new("d", "/in", "/out", StillWater { steps: 3 })
    }

    #[test]
    fn hierarchy_queries_fail_before_finalization() {
        let domain = test_domain();
        assert!(!domain.hierarchy_is_set());
        assert!(matches!(
            domain.is_parent(),
            Err(EngineError::HierarchyUnset { .. })
        ));
        assert!(matches!(
            domain.is_child(),
            Err(EngineError::HierarchyUnset { .. })
        ));
    }

    #[test]
    fn top_level_domain_is_parent() {
        let mut domain = test_domain();
        domain.set_hierarchy_top();
        assert!(domain.is_parent().unwrap());
        assert!(!domain.is_child().unwrap());
    }

    #[test]
    fn parent_can_be_set_once() {
        let mut domain = test_domain();
        domain.set_parent(0).unwrap();
        assert!(domain.is_child().unwrap());
        assert!(matches!(
            domain.set_parent(1),
            Err(EngineError::ParentAlreadySet { .. })
        ));
    }

    #[test]
    fn child_index_is_bounds_checked() {
        let mut domain = test_domain();
        domain.add_child(3);
        assert_eq!(domain.child_index(0).unwrap(), 3);
        assert!(matches!(
            domain.child_index(1),
            Err(EngineError::ChildIndexOutOfRange { index: 1, len: 1 })
        ));
    }

    #[test]
    fn initialization_registers_phases_on_the_control_point() {
        let mut domain = test_domain();
        domain.instantiate_members().unwrap();
        domain.read_inputs().unwrap();
        domain.initialize().unwrap();
        assert!(domain.is_initialized());
        assert_eq!(domain.n_phases(), 2);
        assert_eq!(domain.control().ncp(), 2);
        assert_eq!(domain.nts(), 3);
    }

    #[test]
    fn solo_domain_timesteps_without_a_barrier() {
        let mut domain = test_domain();
        domain.set_hierarchy_top();
        let barrier = domain.set_concurrency_parent(None, Vec::new());
        assert!(barrier.is_none());
        domain.instantiate_members().unwrap();
        domain.initialize().unwrap();
        domain.timestepping(3);
        assert_eq!(domain.lifecycle, Lifecycle::Finalized);
    }
}
