//! Shared setup helpers for the Ebb benchmarks.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use std::sync::Arc;

use ebb_engine::{ControlPoint, Pool};
use ebb_model::PhaseCounter;

/// A pool with the given budget, ready to be shared across threads.
pub fn shared_pool(n_procs: u32) -> Arc<Pool> {
    Arc::new(Pool::new(n_procs))
}

/// A control point with `ncp` phases registered, as it would be after
/// model initialization.
pub fn registered_control(ncp: u32) -> Arc<ControlPoint> {
    let cp = Arc::new(ControlPoint::new());
    for _ in 0..ncp {
        cp.register_phase();
    }
    cp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_build_configured_primitives() {
        assert_eq!(shared_pool(3).remaining(), 3);
        assert_eq!(registered_control(4).ncp(), 4);
    }
}
