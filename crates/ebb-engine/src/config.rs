//! Concurrency configuration and budget resolution.
//!
//! A run is given two numbers: the total processor budget and the share
//! reserved for child domains. Resolution clamps them against the
//! hardware and splits the total into an inter-domain pool (rationing
//! concurrent phase execution) and intra-domain budgets (handed to the
//! solvers). Clamping produces warnings, not errors; the run continues
//! with the adjusted values.

use log::warn;

/// Requested processor budgets for a run.
#[derive(Clone, Copy, Debug)]
pub struct ConcurrencyConfig {
    /// Total processors the run may use.
    pub n_proc_total: u32,
    /// Processors reserved for child domains; 0 means "use the default
    /// split" (half the total).
    pub n_proc_child: u32,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            n_proc_total: 1,
            n_proc_child: 0,
        }
    }
}

/// Budgets after clamping and splitting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedConcurrency {
    /// Clamped total budget.
    pub n_proc_total: u32,
    /// Size of the shared inter-domain pool; `None` when the project has
    /// no children and no pool is created.
    pub pool_size: Option<u32>,
    /// Intra-domain budget of the parent's solver.
    pub parent_intra: u32,
    /// Intra-domain budget of each child's solver.
    pub child_intra: u32,
}

impl ConcurrencyConfig {
    /// Resolve the budgets against the machine's hardware concurrency.
    pub fn resolve(&self, has_children: bool) -> ResolvedConcurrency {
        self.resolve_against(has_children, hardware_concurrency())
    }

    /// Resolve the budgets against a given hardware concurrency.
    pub fn resolve_against(&self, has_children: bool, hardware: u32) -> ResolvedConcurrency {
        let mut n_total = self.n_proc_total;
        if n_total > hardware {
            let clamped = hardware.saturating_sub(1).max(1);
            warn!(
                "requested {n_total} processors exceeds the {hardware} available; \
                 using {clamped}"
            );
            n_total = clamped;
        }

        let mut n_child = self.n_proc_child;
        if !has_children && n_child > 0 {
            warn!("no child domains; ignoring child processor budget {n_child}");
            n_child = 0;
        }
        if n_child >= n_total && n_child > 0 {
            let clamped = n_total.saturating_sub(1);
            warn!(
                "child processor budget {n_child} must stay below the total \
                 {n_total}; using {clamped}"
            );
            n_child = clamped;
        }

        if !has_children {
            return ResolvedConcurrency {
                n_proc_total: n_total,
                pool_size: None,
                parent_intra: n_total.max(1),
                child_intra: 1,
            };
        }

        let n_inter = if n_child > 0 {
            n_child + 1
        } else {
            (n_total / 2).max(1)
        };
        ResolvedConcurrency {
            n_proc_total: n_total,
            pool_size: Some(n_inter),
            parent_intra: (n_total + 1).saturating_sub(n_inter).max(1),
            child_intra: n_inter.saturating_sub(1).max(1),
        }
    }
}

/// Number of hardware threads, with a conservative fallback when the
/// query fails.
pub(crate) fn hardware_concurrency() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solo_run_creates_no_pool() {
        let cfg = ConcurrencyConfig {
            n_proc_total: 4,
            n_proc_child: 0,
        };
        let resolved = cfg.resolve_against(false, 8);
        assert_eq!(
            resolved,
            ResolvedConcurrency {
                n_proc_total: 4,
                pool_size: None,
                parent_intra: 4,
                child_intra: 1,
            }
        );
    }

    #[test]
    fn default_split_gives_half_the_total_to_the_pool() {
        let cfg = ConcurrencyConfig {
            n_proc_total: 8,
            n_proc_child: 0,
        };
        let resolved = cfg.resolve_against(true, 16);
        assert_eq!(resolved.pool_size, Some(4));
        assert_eq!(resolved.parent_intra, 5);
        assert_eq!(resolved.child_intra, 3);
    }

    #[test]
    fn explicit_child_budget_sizes_the_pool() {
        let cfg = ConcurrencyConfig {
            n_proc_total: 4,
            n_proc_child: 1,
        };
        let resolved = cfg.resolve_against(true, 16);
        assert_eq!(resolved.pool_size, Some(2));
        assert_eq!(resolved.parent_intra, 3);
        assert_eq!(resolved.child_intra, 1);
    }

    #[test]
    fn total_is_clamped_below_hardware() {
        let cfg = ConcurrencyConfig {
            n_proc_total: 64,
            n_proc_child: 0,
        };
        let resolved = cfg.resolve_against(false, 8);
        assert_eq!(resolved.n_proc_total, 7);
        assert_eq!(resolved.parent_intra, 7);
    }

    #[test]
    fn child_budget_is_clamped_below_total() {
        let cfg = ConcurrencyConfig {
            n_proc_total: 2,
            n_proc_child: 5,
        };
        let resolved = cfg.resolve_against(true, 16);
        assert_eq!(resolved.pool_size, Some(2));
    }

    #[test]
    fn child_budget_without_children_is_dropped() {
        let cfg = ConcurrencyConfig {
            n_proc_total: 4,
            n_proc_child: 2,
        };
        let resolved = cfg.resolve_against(false, 16);
        assert_eq!(resolved.pool_size, None);
    }

    #[test]
    fn budgets_never_reach_zero() {
        let cfg = ConcurrencyConfig {
            n_proc_total: 1,
            n_proc_child: 0,
        };
        let resolved = cfg.resolve_against(true, 1);
        assert!(resolved.pool_size.unwrap() >= 1);
        assert!(resolved.parent_intra >= 1);
        assert!(resolved.child_intra >= 1);
    }
}
