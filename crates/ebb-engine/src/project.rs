//! The project: driver of concurrent nested-grid simulations.
//!
//! A project owns an ordered registry of domains, reconstructs the
//! parent/child relation declared in the project file, configures the
//! shared concurrency budget, runs the three initialization passes, and
//! then spawns one worker per domain for the timestepping loop. It needs
//! no model-specific derivation; everything model-dependent reaches it
//! through the [`HydroModel`] hooks.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use log::info;

use ebb_io::{DomainEntry, ProjectFile};
use ebb_model::HydroModel;

use ebb_core::Timestep;

use crate::config::ConcurrencyConfig;
use crate::domain::Domain;
use crate::error::EngineError;

/// Driver of one simulation run over a family of domains.
pub struct Project<M: HydroModel> {
    project_id: String,
    /// Total timesteps, agreed across domains during initialization.
    nts: Timestep,
    /// Phases per timestep, agreed across domains during initialization.
    n_phases: u32,
    domains: Vec<Domain<M>>,
    /// Domain id to registry position, in declaration order.
    index: IndexMap<String, usize>,
    /// Child id to parent id, from the project file.
    hierarchy_table: HashMap<String, String>,
}

impl<M: HydroModel> Project<M> {
    /// Create an empty project.
    pub fn new(project_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            nts: 0,
            n_phases: 0,
            domains: Vec::new(),
            index: IndexMap::new(),
            hierarchy_table: HashMap::new(),
        }
    }

    /// Construct a project from a parsed project file, building each
    /// domain's model with `make_model`.
    pub fn from_file<F>(file: &ProjectFile, mut make_model: F) -> Result<Self, EngineError>
    where
        F: FnMut(&DomainEntry) -> M,
    {
        info!("project {} is initializing", file.project_id);
        let mut project = Self::new(&file.project_id);
        if !file.entries.is_empty() {
            info!(
                "constructing {} domains listed in the project file",
                file.entries.len()
            );
        }
        for entry in &file.entries {
            let model = make_model(entry);
            let domain = Domain::new(&entry.id, &entry.path, &entry.output_dir, model);
            match &entry.parent {
                Some(parent) => project.add_child_domain(domain, parent)?,
                None => project.add_domain(domain)?,
            }
        }
        Ok(project)
    }

    // ── Registry ───────────────────────────────────────────────────

    /// Add a top-level domain.
    ///
    /// Fails when the domain's id or output directory collides with one
    /// already registered.
    pub fn add_domain(&mut self, domain: Domain<M>) -> Result<(), EngineError> {
        if !self.domain_id_is_available(domain.id()) {
            return Err(EngineError::DuplicateDomainId {
                id: domain.id().to_string(),
            });
        }
        if !self.output_dir_is_available(domain.output_dir()) {
            return Err(EngineError::DuplicateOutputDir {
                dir: domain.output_dir().to_string(),
            });
        }
        self.index
            .insert(domain.id().to_string(), self.domains.len());
        self.domains.push(domain);
        Ok(())
    }

    /// Add a child domain whose parent must already be registered.
    pub fn add_child_domain(
        &mut self,
        domain: Domain<M>,
        parent_id: &str,
    ) -> Result<(), EngineError> {
        if !self.index.contains_key(parent_id) {
            return Err(EngineError::UnknownDomain {
                id: parent_id.to_string(),
            });
        }
        self.hierarchy_table
            .insert(domain.id().to_string(), parent_id.to_string());
        self.add_domain(domain)
    }

    /// Remove a domain from the registry.
    ///
    /// Only meaningful before the hierarchy is constructed; registry
    /// positions shift.
    pub fn remove_domain(&mut self, id: &str) -> Result<Domain<M>, EngineError> {
        let pos = self.domain_position(id)?;
        let domain = self.domains.remove(pos);
        self.hierarchy_table.remove(id);
        self.index.shift_remove(id);
        for index in self.index.values_mut() {
            if *index > pos {
                *index -= 1;
            }
        }
        Ok(domain)
    }

    /// Number of domains in the project.
    pub fn n_domains(&self) -> usize {
        self.domains.len()
    }

    /// The project id.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Agreed number of timesteps (0 before initialization).
    pub fn nts(&self) -> Timestep {
        self.nts
    }

    /// Agreed number of phases per timestep (0 before initialization).
    pub fn n_phases(&self) -> u32 {
        self.n_phases
    }

    /// The domain with the given id.
    pub fn domain(&self, id: &str) -> Result<&Domain<M>, EngineError> {
        let pos = self.domain_position(id)?;
        Ok(&self.domains[pos])
    }

    /// The domain with the given id, mutably.
    pub fn domain_mut(&mut self, id: &str) -> Result<&mut Domain<M>, EngineError> {
        let pos = self.domain_position(id)?;
        Ok(&mut self.domains[pos])
    }

    /// Registry position of the domain with the given id.
    pub fn domain_position(&self, id: &str) -> Result<usize, EngineError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| EngineError::UnknownDomain { id: id.to_string() })
    }

    fn domain_id_is_available(&self, id: &str) -> bool {
        !self.index.contains_key(id)
    }

    fn output_dir_is_available(&self, output_dir: &str) -> bool {
        self.domains.iter().all(|d| d.output_dir() != output_dir)
    }

    // ── Hierarchy and concurrency ──────────────────────────────────

    /// Construct the domain hierarchy from the registered parent ids.
    ///
    /// Post-condition: every domain has `hierarchy_is_set()`.
    pub fn set_domain_hierarchy(&mut self) -> Result<(), EngineError> {
        info!("constructing domain hierarchy");
        for i in 0..self.domains.len() {
            let id = self.domains[i].id().to_string();
            match self.hierarchy_table.get(&id) {
                Some(parent_id) => {
                    let parent_pos = self.domain_position(parent_id)?;
                    self.domains[i].set_parent(parent_pos)?;
                    self.domains[parent_pos].add_child(i);
                    info!("child: {id}  parent: {parent_id}");
                }
                None => self.domains[i].set_hierarchy_top(),
            }
        }
        Ok(())
    }

    /// Configure the shared synchronization primitives and processor
    /// budgets.
    ///
    /// At most one parent domain is allowed, and children may not have
    /// children of their own. The parent builds the barrier over its
    /// children's control points; each child borrows the parent's
    /// primitives.
    pub fn set_domain_concurrency(
        &mut self,
        config: ConcurrencyConfig,
    ) -> Result<(), EngineError> {
        let mut parents = Vec::new();
        for (i, domain) in self.domains.iter().enumerate() {
            if domain.is_parent()? {
                parents.push(i);
            } else if domain.n_children() > 0 {
                return Err(EngineError::NestedChild {
                    id: domain.id().to_string(),
                });
            }
        }
        if parents.len() > 1 {
            return Err(EngineError::MultipleParents {
                count: parents.len(),
            });
        }
        let Some(&parent_pos) = parents.first() else {
            return Err(EngineError::NoDomains);
        };

        let children: Vec<usize> = (0..self.domains[parent_pos].n_children())
            .map(|i| self.domains[parent_pos].child_index(i))
            .collect::<Result<_, _>>()?;
        let resolved = config.resolve(!children.is_empty());

        let child_controls = children
            .iter()
            .map(|&c| Arc::clone(self.domains[c].control()))
            .collect();
        let parent_control = Arc::clone(self.domains[parent_pos].control());
        let barrier =
            self.domains[parent_pos].set_concurrency_parent(resolved.pool_size, child_controls);
        self.domains[parent_pos].set_intra_budget(resolved.parent_intra);

        if let Some(barrier) = barrier {
            for &c in &children {
                self.domains[c]
                    .set_concurrency_child(Arc::clone(&barrier), Arc::clone(&parent_control));
                self.domains[c].set_intra_budget(resolved.child_intra);
            }
        }
        Ok(())
    }

    // ── Run driver ─────────────────────────────────────────────────

    /// Perform the simulation: hierarchy, concurrency, the three
    /// initialization passes, parallel timestepping, post-processing.
    pub fn run(&mut self, config: ConcurrencyConfig) -> Result<(), EngineError> {
        info!("project {} run is initializing", self.project_id);
        self.set_domain_hierarchy()?;
        self.set_domain_concurrency(config)?;

        info!("setting up the simulation");
        for domain in &mut self.domains {
            let id = domain.id().to_string();
            domain
                .instantiate_members()
                .map_err(|source| EngineError::Model { domain: id, source })?;
        }

        info!("reading domain inputs");
        for domain in &mut self.domains {
            let id = domain.id().to_string();
            domain
                .read_inputs()
                .map_err(|source| EngineError::Model { domain: id, source })?;
        }

        info!("completing domain initializations");
        for domain in &mut self.domains {
            let id = domain.id().to_string();
            domain
                .initialize()
                .map_err(|source| EngineError::Model { domain: id, source })?;
        }

        self.process_timestepping_params()?;

        info!("timestepping is starting");
        self.initiate_timestepping()?;

        info!("post-processing domains");
        for domain in &mut self.domains {
            let id = domain.id().to_string();
            domain
                .post_process()
                .map_err(|source| EngineError::Model { domain: id, source })?;
        }
        info!("run has finished");
        Ok(())
    }

    /// Read `nts` and the phase count from the first domain and require
    /// every other domain to agree.
    fn process_timestepping_params(&mut self) -> Result<(), EngineError> {
        let first = self.domains.first().ok_or(EngineError::NoDomains)?;
        let nts = first.nts();
        let n_phases = first.n_phases();
        for domain in &self.domains {
            if domain.nts() != nts {
                return Err(EngineError::TimesteppingMismatch {
                    domain: domain.id().to_string(),
                    param: "nts",
                    expected: nts,
                    actual: domain.nts(),
                });
            }
            if domain.n_phases() != n_phases {
                return Err(EngineError::TimesteppingMismatch {
                    domain: domain.id().to_string(),
                    param: "nPhases",
                    expected: n_phases,
                    actual: domain.n_phases(),
                });
            }
        }
        self.nts = nts;
        self.n_phases = n_phases;
        Ok(())
    }

    /// Spawn one worker per domain, run the timestepping loops, and join
    /// them all.
    fn initiate_timestepping(&mut self) -> Result<(), EngineError> {
        let nts = self.nts;
        std::thread::scope(|scope| {
            let mut workers = Vec::with_capacity(self.domains.len());
            for domain in self.domains.iter_mut() {
                let id = domain.id().to_string();
                let worker = std::thread::Builder::new()
                    .name(format!("domain-{id}"))
                    .spawn_scoped(scope, move || domain.timestepping(nts))
                    .map_err(|e| EngineError::WorkerSpawn {
                        domain: id,
                        reason: e.to_string(),
                    })?;
                workers.push(worker);
            }
            for worker in workers {
                if let Err(panic) = worker.join() {
                    // Phase callables are contracted not to fail; a panic
                    // in one is not recovered.
                    std::panic::resume_unwind(panic);
                }
            }
            Ok(())
        })
    }
}
