//! Engine error types.

use std::error::Error;
use std::fmt;

use ebb_model::ModelError;

/// Errors from project construction, configuration, and the run driver.
#[derive(Debug)]
pub enum EngineError {
    /// A domain id is used by more than one domain.
    DuplicateDomainId {
        /// The colliding id.
        id: String,
    },
    /// An output directory is used by more than one domain.
    DuplicateOutputDir {
        /// The colliding directory.
        dir: String,
    },
    /// A hierarchy query was made before the hierarchy was finalized.
    HierarchyUnset {
        /// Id of the domain queried.
        id: String,
    },
    /// `set_parent` was called on a domain that already has a parent.
    ParentAlreadySet {
        /// Id of the child domain.
        id: String,
    },
    /// More than one parent domain in a project.
    MultipleParents {
        /// Number of parent domains found.
        count: usize,
    },
    /// A child domain has children of its own.
    NestedChild {
        /// Id of the offending child domain.
        id: String,
    },
    /// No domain with the given id exists in the project.
    UnknownDomain {
        /// The unrecognised id.
        id: String,
    },
    /// A child index beyond the domain's child count.
    ChildIndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of children the domain has.
        len: usize,
    },
    /// The project holds no domains.
    NoDomains,
    /// Domains disagree on a timestepping parameter.
    TimesteppingMismatch {
        /// Id of the disagreeing domain.
        domain: String,
        /// Which parameter disagrees (`"nts"` or `"nPhases"`).
        param: &'static str,
        /// Value reported by the first domain.
        expected: u32,
        /// Value reported by the disagreeing domain.
        actual: u32,
    },
    /// A domain worker thread could not be spawned.
    WorkerSpawn {
        /// Id of the domain whose worker failed to spawn.
        domain: String,
        /// Description of the failure.
        reason: String,
    },
    /// A model hook failed.
    Model {
        /// Id of the domain whose model failed.
        domain: String,
        /// The underlying model error.
        source: ModelError,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateDomainId { id } => {
                write!(f, "domain id {id} is used multiple times")
            }
            Self::DuplicateOutputDir { dir } => {
                write!(f, "output directory {dir} is used multiple times")
            }
            Self::HierarchyUnset { id } => {
                write!(f, "hierarchy of domain {id} is not set yet")
            }
            Self::ParentAlreadySet { id } => {
                write!(f, "parent of domain {id} is already set")
            }
            Self::MultipleParents { count } => {
                write!(
                    f,
                    "{count} parent domains found; a project may run only one"
                )
            }
            Self::NestedChild { id } => {
                write!(
                    f,
                    "child domain {id} has children; only one level of nesting is supported"
                )
            }
            Self::UnknownDomain { id } => write!(f, "no domain with id {id}"),
            Self::ChildIndexOutOfRange { index, len } => {
                write!(f, "child index {index} is invalid for {len} children")
            }
            Self::NoDomains => write!(f, "the project has no domains"),
            Self::TimesteppingMismatch {
                domain,
                param,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "{param} of domain {domain} is {actual}, expected {expected}"
                )
            }
            Self::WorkerSpawn { domain, reason } => {
                write!(f, "cannot spawn worker for domain {domain}: {reason}")
            }
            Self::Model { domain, source } => {
                write!(f, "model of domain {domain}: {source}")
            }
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Model { source, .. } => Some(source),
            _ => None,
        }
    }
}
