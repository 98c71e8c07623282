//! Control points: per-domain phase progress counters.
//!
//! A control point marks where a domain stands within the phases of a
//! timestep. The owning domain's worker is the only writer; the opposite
//! side of the barrier reads it to evaluate its wait predicate. A
//! reader/writer lock guards the state; the single-writer discipline
//! means contention is reads against the occasional write.

use std::sync::RwLock;

use ebb_model::PhaseCounter;

/// The modular gap from `from` to `to` on a cycle of `ncp` phases.
///
/// Computed with wrapping arithmetic so the pre-first-increment sentinel
/// (`u32::MAX`, one less than zero) participates correctly: two fresh
/// control points have gap 0, and a fresh one trails an incremented one
/// by exactly the number of increments.
pub fn modular_gap(ncp: u32, from: u32, to: u32) -> u32 {
    ncp.wrapping_add(to).wrapping_sub(from) % ncp
}

#[derive(Clone, Copy, Debug)]
struct CpState {
    /// Number of control points per timestep. Grows during phase
    /// registration, fixed once timestepping starts.
    ncp: u32,
    /// Current phase index, modulo `ncp`.
    val: u32,
    /// Whether the domain has finished phase `val` of the current
    /// timestep.
    done: bool,
}

/// Per-domain phase progress: a modular counter plus a completion flag.
///
/// Starts at `val = u32::MAX` (one less than zero under wrapping
/// arithmetic) with `done = true`, meaning "just finished the last phase
/// of the previous timestep". The first increment therefore lands on
/// phase 0, and the initial barrier predicates pass immediately on the
/// first timestep.
#[derive(Debug)]
pub struct ControlPoint {
    state: RwLock<CpState>,
}

impl Default for ControlPoint {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlPoint {
    /// Create a control point in its initial state.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CpState {
                ncp: 0,
                val: u32::MAX,
                done: true,
            }),
        }
    }

    /// Advance to the next phase: `val = (val + 1) mod ncp`, clearing
    /// `done` in the same critical section.
    ///
    /// Called only by the owning domain's worker, under the shared
    /// barrier mutex.
    pub fn increment(&self) {
        let mut state = self.state.write().expect("control point lock poisoned");
        debug_assert!(state.ncp > 0, "increment before phase registration");
        state.val = state.val.wrapping_add(1) % state.ncp;
        state.done = false;
    }

    /// Mark the current phase as finished.
    pub fn mark_done(&self) {
        let mut state = self.state.write().expect("control point lock poisoned");
        state.done = true;
    }

    /// Current phase index.
    pub fn val(&self) -> u32 {
        self.state.read().expect("control point lock poisoned").val
    }

    /// Whether the current phase is finished.
    pub fn is_done(&self) -> bool {
        self.state.read().expect("control point lock poisoned").done
    }

    /// Number of phases per timestep registered so far.
    pub fn ncp(&self) -> u32 {
        self.state.read().expect("control point lock poisoned").ncp
    }
}

impl PhaseCounter for ControlPoint {
    fn register_phase(&self) {
        let mut state = self.state.write().expect("control point lock poisoned");
        state.ncp += 1;
    }

    fn phase_count(&self) -> u32 {
        self.ncp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_phases(n: u32) -> ControlPoint {
        let cp = ControlPoint::new();
        for _ in 0..n {
            cp.register_phase();
        }
        cp
    }

    #[test]
    fn initial_state_is_done_at_minus_one() {
        let cp = ControlPoint::new();
        assert_eq!(cp.val(), u32::MAX);
        assert!(cp.is_done());
        assert_eq!(cp.ncp(), 0);
    }

    #[test]
    fn first_increment_lands_on_phase_zero() {
        let cp = with_phases(3);
        cp.increment();
        assert_eq!(cp.val(), 0);
        assert!(!cp.is_done());
    }

    #[test]
    fn increment_wraps_modulo_ncp() {
        let cp = with_phases(3);
        let observed: Vec<u32> = (0..7)
            .map(|_| {
                cp.increment();
                cp.val()
            })
            .collect();
        assert_eq!(observed, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn mark_done_does_not_advance() {
        let cp = with_phases(2);
        cp.increment();
        cp.mark_done();
        assert!(cp.is_done());
        assert_eq!(cp.val(), 0);
    }

    #[test]
    fn gap_of_fresh_points_is_zero() {
        assert_eq!(modular_gap(3, u32::MAX, u32::MAX), 0);
    }

    #[test]
    fn gap_counts_increments_ahead() {
        let a = with_phases(3);
        let b = with_phases(3);
        b.increment();
        assert_eq!(modular_gap(3, a.val(), b.val()), 1);
        assert_eq!(modular_gap(3, b.val(), a.val()), 2);
        b.increment();
        b.increment();
        // Both sides wrapped a full cycle apart: gap 0 again.
        assert_eq!(modular_gap(3, a.val(), b.val()), 0);
    }

    #[test]
    fn wrap_scenario_gap_sequence() {
        // ncp = 3, both sides fresh: parent increments, the gap seen by
        // the trailing side becomes 1 and stays 1 until it catches up.
        let parent = with_phases(3);
        let child = with_phases(3);
        assert_eq!(modular_gap(3, child.val(), parent.val()), 0);
        parent.increment();
        assert_eq!(modular_gap(3, child.val(), parent.val()), 1);
        assert!(!parent.is_done());
        parent.mark_done();
        assert!(parent.is_done());
        child.increment();
        assert_eq!(modular_gap(3, child.val(), parent.val()), 0);
    }
}
